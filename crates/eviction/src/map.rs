//! Heap-pressure-driven eviction map: a concurrent hash table threaded
//! with a protected doubly-linked ring.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::heap::{HeapSampler, SysinfoHeapSampler};
use crate::listener::EvictionListener;
use crate::policy::EvictionPolicy;
use crate::ring::{NodeId, Ring};

/// Any overflow check occurring within this long of the previous probe
/// returns "not overflowing" without sampling memory again.
const PROBE_THROTTLE: Duration = Duration::from_millis(500);

/// A concurrent map whose capacity is not an entry count but a live
/// reading of process heap utilisation.
///
/// `get` and `put_if_absent` both opportunistically call [`evict`], which
/// is a no-op unless the map is both non-empty and currently overflowing
/// its configured heap-pressure threshold.
pub struct EvictionMap<K, V, S = SysinfoHeapSampler>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: HeapSampler,
{
    index: DashMap<K, (NodeId, u64)>,
    ring: Mutex<Ring<K, V>>,
    len: AtomicUsize,
    policy: EvictionPolicy,
    sampler: S,
    threshold: f64,
    last_probe: Mutex<Option<Instant>>,
    evicting: AtomicBool,
    listener: Option<Arc<dyn EvictionListener<K, V>>>,
}

impl<K, V> EvictionMap<K, V, SysinfoHeapSampler>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Build a map backed by the default process-level heap sampler.
    ///
    /// `max_heap_bytes` is the heap budget the `threshold` (a fraction in
    /// `[0, 1]`) is measured against.
    pub fn new(policy: EvictionPolicy, max_heap_bytes: u64, threshold: f64) -> Self {
        Self::with_sampler(policy, SysinfoHeapSampler::new(max_heap_bytes), threshold)
    }
}

impl<K, V, S> EvictionMap<K, V, S>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: HeapSampler,
{
    /// Build a map with an explicit, pluggable heap sampler — the seam a
    /// platform without runtime heap introspection substitutes its own
    /// `(max, used)` source through.
    pub fn with_sampler(policy: EvictionPolicy, sampler: S, threshold: f64) -> Self {
        Self {
            index: DashMap::new(),
            ring: Mutex::new(Ring::new()),
            len: AtomicUsize::new(0),
            policy,
            sampler,
            threshold,
            last_probe: Mutex::new(None),
            evicting: AtomicBool::new(false),
            listener: None,
        }
    }

    /// Attach an eviction listener, notified (outside any lock) whenever
    /// this map evicts an entry.
    pub fn with_listener(mut self, listener: Arc<dyn EvictionListener<K, V>>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Current entry count.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// True iff the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rate-limited heap-pressure check. Any call within [`PROBE_THROTTLE`]
    /// of the previous one is answered "not overflowing" without sampling
    /// memory, damping probe cost under bursty access.
    fn is_overflowing(&self) -> bool {
        {
            let mut last = self.last_probe.lock();
            let now = Instant::now();
            if let Some(prev) = *last {
                if now.duration_since(prev) < PROBE_THROTTLE {
                    return false;
                }
            }
            *last = Some(now);
        }
        self.sampler.sample().used_fraction() >= self.threshold
    }

    /// Read `key`, firing the policy's access hook (FIFO ignores, second
    /// chance marks, LRU moves to tail), then opportunistically evicts.
    pub fn get(&self, key: &K) -> Option<V> {
        let (node_id, generation) = *self.index.get(key)?.value();
        let value = {
            let mut ring = self.ring.lock();
            if ring.generation(node_id) != generation {
                // Slot was evicted and recycled between the index read
                // above and taking the ring lock; treat as a miss rather
                // than touching the unrelated node now living there.
                None
            } else {
                self.policy.on_access(&mut ring, node_id);
                ring_value(&ring, node_id)
            }
        };
        self.evict();
        value
    }

    /// True iff some entry holds a value equal to `needle`. Fires the
    /// same access hook as `get` for the matching entry.
    pub fn contains_value(&self, needle: &V) -> bool
    where
        V: PartialEq,
    {
        let hit = self
            .index
            .iter()
            .find(|entry| {
                let (node_id, generation) = *entry.value();
                let ring = self.ring.lock();
                ring.generation(node_id) == generation && ring_value(&ring, node_id).as_ref() == Some(needle)
            })
            .map(|entry| *entry.value());

        if let Some((node_id, generation)) = hit {
            let mut ring = self.ring.lock();
            if ring.generation(node_id) == generation {
                self.policy.on_access(&mut ring, node_id);
            }
            true
        } else {
            false
        }
    }

    /// Insert `(key, value)` if `key` is absent. Returns `true` if
    /// inserted, `false` if the key was already present (in which case
    /// the existing value is left untouched). Always opportunistically
    /// evicts afterward.
    pub fn put_if_absent(&self, key: K, value: V) -> bool {
        let inserted = match self.index.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let handle = {
                    let mut ring = self.ring.lock();
                    ring.append_new(key, value)
                };
                slot.insert(handle);
                self.len.fetch_add(1, Ordering::Relaxed);
                true
            }
        };
        self.evict();
        inserted
    }

    /// Remove `key` unconditionally, returning its value if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        let (_, (node_id, _generation)) = self.index.remove(key)?;
        let value = {
            let mut ring = self.ring.lock();
            ring.unlink(node_id)
        };
        self.len.fetch_sub(1, Ordering::Relaxed);
        value
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.index.clear();
        self.ring.lock().clear();
        self.len.store(0, Ordering::Relaxed);
    }

    /// Evict entries down to 90% of the size observed on entry to the
    /// loop, or until the ring is empty. A no-op if the map isn't
    /// overflowing its heap-pressure threshold, or is empty. Only one
    /// thread runs the loop at a time; concurrent callers skip it.
    pub fn evict(&self) {
        if self.is_empty() {
            return;
        }
        if !self.is_overflowing() {
            return;
        }
        if self
            .evicting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let peak = self.len();
        let target = ((peak as f64) * 0.9).floor() as usize;
        // Defends against a pathological run of identity-mismatched heads
        // (key remapped between inspection and removal) looping forever;
        // a real workload never exhausts this budget.
        let mut budget = peak.saturating_mul(4) + 16;

        while self.len() > target && budget > 0 {
            budget -= 1;
            // head, key, and the policy's evict decision must be read
            // under one critical section: releasing the lock between
            // them would let a concurrent `remove` unlink this exact
            // node first, leaving `key` reading a freed slab slot.
            let decision = {
                let mut ring = self.ring.lock();
                ring.head().map(|node_id| {
                    let key = ring.key(node_id).clone();
                    let generation = ring.generation(node_id);
                    let should_evict = self.policy.on_evict(&mut ring, node_id);
                    (node_id, generation, key, should_evict)
                })
            };
            let Some((node_id, generation, key, should_evict)) = decision else {
                break;
            };
            if should_evict {
                self.remove_if_identity(&key, node_id, generation);
            }
        }

        self.evicting.store(false, Ordering::Release);
    }

    /// Removes `key` from the index only if it still maps to the exact
    /// `(node_id, generation)` handle observed under the ring lock —
    /// guards against the key having been removed and the slab slot
    /// recycled for a different insert in between.
    fn remove_if_identity(&self, key: &K, node_id: NodeId, generation: u64) {
        let removed = self.index.remove_if(key, |_, v| *v == (node_id, generation));
        if removed.is_none() {
            return;
        }
        let value = {
            let mut ring = self.ring.lock();
            ring.unlink(node_id)
        };
        self.len.fetch_sub(1, Ordering::Relaxed);
        if let (Some(listener), Some(value)) = (&self.listener, value) {
            listener.on_evict(key, &value);
        }
    }
}

fn ring_value<K, V: Clone>(ring: &Ring<K, V>, id: NodeId) -> Option<V> {
    ring.value(id)
}
