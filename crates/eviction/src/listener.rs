//! Eviction listener: a side-channel notification hook.

/// Notified after a node has been evicted from the map.
///
/// Called outside the link lock, once the node has already been removed
/// from both the index and the ring. Implementations must be fast and
/// non-reentrant — they must not call back into the eviction map that
/// invoked them.
pub trait EvictionListener<K, V>: Send + Sync {
    /// `key`/`value` are the entry that was just evicted.
    fn on_evict(&self, key: &K, value: &V);
}

impl<K, V, F> EvictionListener<K, V> for F
where
    F: Fn(&K, &V) + Send + Sync,
{
    fn on_evict(&self, key: &K, value: &V) {
        self(key, value)
    }
}
