//! Stat-tracking wrapper: times a wrapped [`Store`] and feeds a
//! [`StatsRegistry`].

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use vkv_core::{Clock, MatchType, OperationKind, StoreResult, Versioned};
use vkv_stats::StatsRegistry;

use crate::store::Store;

/// Wraps any [`Store`], timing each of `get` / `get_all` / `put` /
/// `delete` / `delete_all` (map- and expression-driven) and recording the
/// elapsed nanoseconds into a [`StatsRegistry`].
///
/// On success the duration is recorded under the operation's own kind. On
/// error, [`OperationKind::Exception`] is recorded instead (and
/// additionally [`OperationKind::Obsolete`] if the error is specifically
/// an obsolete-version rejection). Errors are always propagated unchanged.
pub struct StatTrackingStore<K, C: Clock, V, S: Store<K, C, V>> {
    inner: S,
    stats: Arc<StatsRegistry>,
    _marker: PhantomData<fn() -> (K, C, V)>,
}

impl<K, C: Clock, V, S: Store<K, C, V>> StatTrackingStore<K, C, V, S> {
    /// Wrap `inner`, recording timings into `stats`.
    pub fn new(inner: S, stats: Arc<StatsRegistry>) -> Self {
        Self {
            inner,
            stats,
            _marker: PhantomData,
        }
    }

    /// Borrow the stats registry this wrapper records into.
    pub fn stats(&self) -> &Arc<StatsRegistry> {
        &self.stats
    }

    /// Borrow the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn timed<T>(&self, kind: OperationKind, f: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        let start = Instant::now();
        let result = f();
        let elapsed_ns = start.elapsed().as_nanos() as u64;
        match &result {
            Ok(_) => self.stats.record_time(kind, elapsed_ns),
            Err(e) => {
                self.stats.record_time(OperationKind::Exception, elapsed_ns);
                if e.is_obsolete_version() {
                    self.stats.record_time(OperationKind::Obsolete, elapsed_ns);
                }
            }
        }
        result
    }
}

impl<K, C, V, S> Store<K, C, V> for StatTrackingStore<K, C, V, S>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    C: Clock,
    V: Clone + Send + Sync + 'static,
    S: Store<K, C, V>,
{
    fn get(&self, key: &K) -> StoreResult<Vec<Versioned<C, V>>> {
        self.timed(OperationKind::Get, || self.inner.get(key))
    }

    fn get_all(&self, keys: &[K]) -> StoreResult<HashMap<K, Vec<Versioned<C, V>>>>
    where
        K: Eq + Hash + Clone,
    {
        self.timed(OperationKind::GetAll, || self.inner.get_all(keys))
    }

    fn put(&self, key: K, record: Versioned<C, V>) -> StoreResult<()> {
        self.timed(OperationKind::Put, || self.inner.put(key, record))
    }

    fn delete(&self, key: &K, version: Option<&C>) -> StoreResult<bool> {
        self.timed(OperationKind::Delete, || self.inner.delete(key, version))
    }

    fn delete_all(&self, versions: &HashMap<K, C>) -> StoreResult<bool>
    where
        K: Eq + Hash + Clone,
    {
        self.timed(OperationKind::DeleteAll, || self.inner.delete_all(versions))
    }

    fn delete_all_matching(&self, match_type: MatchType, expression: &str) -> StoreResult<bool> {
        self.timed(OperationKind::DeleteAll, || {
            self.inner.delete_all_matching(match_type, expression)
        })
    }

    fn entries(&self) -> StoreResult<Box<dyn Iterator<Item = (K, Versioned<C, V>)> + '_>> {
        self.inner.entries()
    }

    fn keys(&self) -> StoreResult<Box<dyn Iterator<Item = K> + '_>> {
        self.inner.keys()
    }

    fn get_capability(&self, tag: &str) -> StoreResult<&(dyn std::any::Any + Send + Sync)> {
        self.inner.get_capability(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryEngine;
    use vkv_core::VectorClock;

    fn vc(node: u32, count: u64) -> VectorClock {
        VectorClock::from_entries([(node, count)])
    }

    #[test]
    fn successful_put_is_recorded_under_put() {
        let engine: InMemoryEngine<String, VectorClock, String> = InMemoryEngine::new();
        let stats = Arc::new(StatsRegistry::new(16, 30_000));
        let wrapped = StatTrackingStore::new(engine, stats.clone());

        wrapped
            .put("a".to_string(), Versioned::new("x".to_string(), vc(1, 1)))
            .unwrap();

        assert_eq!(stats.total_count(OperationKind::Put), 1);
        assert_eq!(stats.total_count(OperationKind::Exception), 0);
    }

    #[test]
    fn obsolete_put_bumps_exception_and_obsolete() {
        let engine: InMemoryEngine<String, VectorClock, String> = InMemoryEngine::new();
        let stats = Arc::new(StatsRegistry::new(16, 30_000));
        let wrapped = StatTrackingStore::new(engine, stats.clone());

        wrapped
            .put("a".to_string(), Versioned::new("x".to_string(), vc(1, 1)))
            .unwrap();
        let err = wrapped
            .put("a".to_string(), Versioned::new("y".to_string(), vc(1, 0)))
            .unwrap_err();
        assert!(err.is_obsolete_version());

        assert_eq!(stats.total_count(OperationKind::Exception), 1);
        assert_eq!(stats.total_count(OperationKind::Obsolete), 1);
        // The failed put itself was not recorded under Put.
        assert_eq!(stats.total_count(OperationKind::Put), 1);
    }

    #[test]
    fn errors_propagate_unchanged() {
        let engine: InMemoryEngine<String, VectorClock, String> = InMemoryEngine::new();
        let stats = Arc::new(StatsRegistry::new(16, 30_000));
        let wrapped = StatTrackingStore::new(engine, stats);

        let err = wrapped
            .delete_all_matching(vkv_core::MatchType::StartsWith, "foo")
            .unwrap_err();
        assert!(err.is_unsupported());
    }
}
