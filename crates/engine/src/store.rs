//! The `Store` capability-set interface: the seven engine operations every
//! wrapper (stat-tracking, and whatever a caller layers on top) composes
//! over by plain delegation. No inheritance hierarchy — a wrapper holds an
//! inner `S: Store<K, C, V>` and forwards.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;

use vkv_core::{Clock, MatchType, StoreError, StoreResult, Versioned};

/// The engine's capability-set interface.
///
/// Implemented by [`crate::InMemoryEngine`] and by wrappers such as
/// [`crate::StatTrackingStore`] that hold an inner `Store` and delegate.
pub trait Store<K, C: Clock, V>: Send + Sync {
    /// Snapshot copy of `key`'s version list. Never `None` — an absent key
    /// returns an empty list.
    fn get(&self, key: &K) -> StoreResult<Vec<Versioned<C, V>>>;

    /// Snapshot copy of each of `keys`' version lists.
    ///
    /// Default implementation loops `get`; implementations with a cheaper
    /// batch path (or that want batch-level instrumentation) may override.
    fn get_all(&self, keys: &[K]) -> StoreResult<HashMap<K, Vec<Versioned<C, V>>>>
    where
        K: Eq + Hash + Clone,
    {
        let mut out = HashMap::with_capacity(keys.len());
        for key in keys {
            out.insert(key.clone(), self.get(key)?);
        }
        Ok(out)
    }

    /// Optimistic put: may fail with [`StoreError::ObsoleteVersion`] if
    /// `record`'s version is dominated by an existing version of `key`.
    fn put(&self, key: K, record: Versioned<C, V>) -> StoreResult<()>;

    /// Version-scoped delete. `version = None` unconditionally removes the
    /// mapping. Returns whether anything was removed.
    fn delete(&self, key: &K, version: Option<&C>) -> StoreResult<bool>;

    /// Apply [`Store::delete`]'s semantics to every `(key, version)` pair.
    /// Returns whether any key had something removed.
    fn delete_all(&self, versions: &HashMap<K, C>) -> StoreResult<bool>
    where
        K: Eq + Hash + Clone;

    /// Delete every key whose serialized form matches `match_type` against
    /// `expression`. Fails with [`StoreError::Unsupported`] if no key
    /// serializer is registered, or if `match_type` is
    /// [`MatchType::ElExpression`] and no expression evaluator is wired in.
    fn delete_all_matching(&self, match_type: MatchType, expression: &str) -> StoreResult<bool>;

    /// A forward-only, non-removing iterator over every `(key, record)`
    /// pair. Dropping the iterator releases any resources it held — Rust's
    /// `Drop` makes an explicit `close()` call unnecessary.
    fn entries(&self) -> StoreResult<Box<dyn Iterator<Item = (K, Versioned<C, V>)> + '_>>;

    /// A forward-only iterator over every present key.
    fn keys(&self) -> StoreResult<Box<dyn Iterator<Item = K> + '_>>;

    /// Tagged capability lookup. Unknown tags fail with
    /// [`StoreError::NoSuchCapability`].
    fn get_capability(&self, tag: &str) -> StoreResult<&(dyn Any + Send + Sync)> {
        Err(StoreError::NoSuchCapability(tag.to_string()))
    }
}
