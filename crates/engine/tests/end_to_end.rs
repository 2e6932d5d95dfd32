//! Black-box scenarios exercised only through the public `Store` surface.

use std::sync::Arc;

use vkv_core::{MatchType, VectorClock, Versioned};
use vkv_engine::{InMemoryEngine, StatTrackingStore, Store, StringKeySerializer};
use vkv_stats::StatsRegistry;

fn vc(node: u32, count: u64) -> VectorClock {
    VectorClock::from_entries([(node, count)])
}

#[test]
fn obsolete_put_rejected_end_to_end() {
    let engine: InMemoryEngine<String, VectorClock, String> = InMemoryEngine::new();
    let stats = Arc::new(StatsRegistry::new(16, 30_000));
    let store = StatTrackingStore::new(engine, stats.clone());

    store
        .put("a".to_string(), Versioned::new("x".to_string(), vc(1, 1)))
        .expect("first write establishes the version");

    let err = store
        .put("a".to_string(), Versioned::new("y".to_string(), vc(1, 0)))
        .expect_err("a causally-older version must be rejected");
    assert!(err.is_obsolete_version());

    let records = store.get(&"a".to_string()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value(), "x");
    assert_eq!(*records[0].version(), vc(1, 1));

    use vkv_core::OperationKind;
    assert_eq!(stats.total_count(OperationKind::Obsolete), 1);
}

#[test]
fn expression_delete_end_to_end() {
    let engine: InMemoryEngine<String, VectorClock, String> =
        InMemoryEngine::new().with_key_serializer(Arc::new(StringKeySerializer));
    let stats = Arc::new(StatsRegistry::new(16, 30_000));
    let store = StatTrackingStore::new(engine, stats);

    for k in ["foo", "foobar", "bar"] {
        store
            .put(k.to_string(), Versioned::new(k.to_string(), vc(1, 1)))
            .unwrap();
    }

    let removed = store
        .delete_all_matching(MatchType::StartsWith, "foo")
        .unwrap();
    assert!(removed);

    assert!(store.get(&"foo".to_string()).unwrap().is_empty());
    assert!(store.get(&"foobar".to_string()).unwrap().is_empty());
    assert!(!store.get(&"bar".to_string()).unwrap().is_empty());
}

#[test]
fn version_scoped_delete_end_to_end() {
    let engine: InMemoryEngine<String, VectorClock, String> = InMemoryEngine::new();
    let store = StatTrackingStore::new(engine, Arc::new(StatsRegistry::new(16, 30_000)));

    store
        .put("k".to_string(), Versioned::new("v1".to_string(), vc(1, 1)))
        .unwrap();
    store
        .put("k".to_string(), Versioned::new("v2".to_string(), vc(2, 1)))
        .unwrap();
    assert_eq!(store.get(&"k".to_string()).unwrap().len(), 2);

    let dominating = vc(1, 1).merged(&vc(2, 1));
    assert!(store.delete(&"k".to_string(), Some(&dominating)).unwrap());
    assert!(store.get(&"k".to_string()).unwrap().is_empty());
}
