//! Stats registry: one sliding-window counter per operation kind, with
//! optional parent aggregation.

use std::sync::Arc;

use vkv_core::OperationKind;

use crate::sliding_window::SlidingWindowCounter;

fn kind_index(kind: OperationKind) -> usize {
    OperationKind::ALL
        .iter()
        .position(|k| *k == kind)
        .expect("OperationKind::ALL is exhaustive")
}

/// One sliding-window counter per [`OperationKind`], with an optional
/// parent registry that every recorded sample is also forwarded to
/// (recursive aggregation, e.g. a per-store registry feeding a
/// process-wide one).
pub struct StatsRegistry {
    counters: Vec<SlidingWindowCounter>,
    parent: Option<Arc<StatsRegistry>>,
}

impl StatsRegistry {
    /// Create a registry with no parent. Each of the 7 operation kinds
    /// gets its own counter with the given ring size and window.
    pub fn new(max_samples: usize, window_ms: u64) -> Self {
        let counters = OperationKind::ALL
            .iter()
            .map(|_| SlidingWindowCounter::new(max_samples, window_ms))
            .collect();
        Self {
            counters,
            parent: None,
        }
    }

    /// Create a registry that forwards every recorded sample to `parent`
    /// in addition to recording it locally.
    pub fn with_parent(max_samples: usize, window_ms: u64, parent: Arc<StatsRegistry>) -> Self {
        let mut registry = Self::new(max_samples, window_ms);
        registry.parent = Some(parent);
        registry
    }

    /// Record `duration_ns` for `kind`, forwarding to the parent registry
    /// (if any) as well. No cross-kind locking: independent kinds never
    /// contend with each other.
    pub fn record_time(&self, kind: OperationKind, duration_ns: u64) {
        self.counters[kind_index(kind)].record(duration_ns);
        if let Some(parent) = &self.parent {
            parent.record_time(kind, duration_ns);
        }
    }

    /// In-window sample count for `kind`.
    pub fn count(&self, kind: OperationKind) -> u64 {
        self.counters[kind_index(kind)].count()
    }

    /// Total samples recorded for `kind` since construction.
    pub fn total_count(&self, kind: OperationKind) -> u64 {
        self.counters[kind_index(kind)].total_count()
    }

    /// Samples per second for `kind` over its effective window.
    pub fn throughput(&self, kind: OperationKind) -> f64 {
        self.counters[kind_index(kind)].throughput()
    }

    /// Mean latency in milliseconds for `kind` over its effective window.
    pub fn average_latency_ms(&self, kind: OperationKind) -> f64 {
        self.counters[kind_index(kind)].average_latency_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_tracks_independently() {
        let r = StatsRegistry::new(16, 30_000);
        r.record_time(OperationKind::Get, 1_000_000);
        r.record_time(OperationKind::Put, 2_000_000);

        assert_eq!(r.total_count(OperationKind::Get), 1);
        assert_eq!(r.total_count(OperationKind::Put), 1);
        assert_eq!(r.total_count(OperationKind::Delete), 0);
    }

    #[test]
    fn parent_aggregates_child_samples() {
        let parent = Arc::new(StatsRegistry::new(16, 30_000));
        let child = StatsRegistry::with_parent(16, 30_000, parent.clone());

        child.record_time(OperationKind::Put, 500_000);

        assert_eq!(child.total_count(OperationKind::Put), 1);
        assert_eq!(parent.total_count(OperationKind::Put), 1);
    }

    #[test]
    fn two_children_aggregate_into_same_parent() {
        let parent = Arc::new(StatsRegistry::new(16, 30_000));
        let a = StatsRegistry::with_parent(16, 30_000, parent.clone());
        let b = StatsRegistry::with_parent(16, 30_000, parent.clone());

        a.record_time(OperationKind::Get, 1);
        b.record_time(OperationKind::Get, 1);

        assert_eq!(parent.total_count(OperationKind::Get), 2);
        assert_eq!(a.total_count(OperationKind::Get), 1);
        assert_eq!(b.total_count(OperationKind::Get), 1);
    }
}
