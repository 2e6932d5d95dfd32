//! Version comparator contract
//!
//! This module expresses the one invariant the whole engine is built on:
//! every version carries causal-order information, and two versions of the
//! same key compare to one of four verdicts. The engine itself never
//! interprets a version beyond this contract — see [`Clock`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict of comparing two versions of the same key.
///
/// - `Before` / `After`: one version causally dominates the other.
/// - `Concurrent`: neither dominates; both are retained side by side.
/// - `Equal`: the two versions are identical.
///
/// Invariants: reflexive (`a.compare(&a) == Equal`), antisymmetric
/// (`a.compare(&b) == Before` iff `b.compare(&a) == After`), and
/// `Concurrent` is symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockOrdering {
    /// This version happened causally before the other.
    Before,
    /// This version happened causally after the other.
    After,
    /// Neither version dominates the other.
    Concurrent,
    /// The two versions are identical.
    Equal,
}

impl ClockOrdering {
    /// True for `Before`.
    #[inline]
    pub fn is_before(&self) -> bool {
        matches!(self, ClockOrdering::Before)
    }

    /// True for `After`.
    #[inline]
    pub fn is_after(&self) -> bool {
        matches!(self, ClockOrdering::After)
    }

    /// True for `Concurrent`.
    #[inline]
    pub fn is_concurrent(&self) -> bool {
        matches!(self, ClockOrdering::Concurrent)
    }

    /// True for `Equal`.
    #[inline]
    pub fn is_equal(&self) -> bool {
        matches!(self, ClockOrdering::Equal)
    }
}

/// A version token supporting a total comparison operation.
///
/// The canonical implementation is [`VectorClock`], but every operation in
/// `vkv-engine` and `vkv-eviction` depends only on this contract — any type
/// implementing `Clock` can stand in for a version.
pub trait Clock: Clone + fmt::Debug + Send + Sync + 'static {
    /// Compare `self` against `other`, returning the four-valued verdict.
    fn compare(&self, other: &Self) -> ClockOrdering;

    /// True iff `self` dominates `other` (`compare` returns `After`).
    #[inline]
    fn dominates(&self, other: &Self) -> bool {
        self.compare(other).is_after()
    }

    /// True iff `self` is dominated by `other` (`compare` returns `Before`).
    #[inline]
    fn is_obsolete_against(&self, other: &Self) -> bool {
        self.compare(other).is_before()
    }
}

/// Node identifier used by [`VectorClock`] entries.
pub type NodeId = u32;

/// A vector clock: per-node monotonic counters used to detect causality.
///
/// Two clocks are compared entry-wise. `a` dominates `b` iff every entry of
/// `a` is `>=` the corresponding entry of `b` (missing entries count as 0)
/// and at least one entry of `a` is strictly greater. Neither dominating
/// the other means the clocks are concurrent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock {
    entries: BTreeMap<NodeId, u64>,
}

impl VectorClock {
    /// An empty clock (dominated by every non-empty clock).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clock from explicit (node, counter) pairs.
    pub fn from_entries<I: IntoIterator<Item = (NodeId, u64)>>(entries: I) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Increment this clock's entry for `node`, returning a new clock.
    pub fn incremented(&self, node: NodeId) -> Self {
        let mut entries = self.entries.clone();
        *entries.entry(node).or_insert(0) += 1;
        Self { entries }
    }

    /// Merge two clocks by taking the entry-wise maximum (used after
    /// observing a conflict to construct a version that dominates both).
    pub fn merged(&self, other: &Self) -> Self {
        let mut entries = self.entries.clone();
        for (&node, &counter) in &other.entries {
            let slot = entries.entry(node).or_insert(0);
            *slot = (*slot).max(counter);
        }
        Self { entries }
    }

    /// Counter for `node`, or 0 if absent.
    #[inline]
    pub fn counter(&self, node: NodeId) -> u64 {
        self.entries.get(&node).copied().unwrap_or(0)
    }
}

impl fmt::Display for VectorClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (node, counter)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", node, counter)?;
        }
        write!(f, "}}")
    }
}

impl Clock for VectorClock {
    fn compare(&self, other: &Self) -> ClockOrdering {
        if self == other {
            return ClockOrdering::Equal;
        }

        let mut self_greater = false;
        let mut other_greater = false;

        let mut nodes: Vec<NodeId> = self.entries.keys().chain(other.entries.keys()).copied().collect();
        nodes.sort_unstable();
        nodes.dedup();

        for node in nodes {
            match self.counter(node).cmp(&other.counter(node)) {
                Ordering::Greater => self_greater = true,
                Ordering::Less => other_greater = true,
                Ordering::Equal => {}
            }
        }

        match (self_greater, other_greater) {
            (true, false) => ClockOrdering::After,
            (false, true) => ClockOrdering::Before,
            _ => ClockOrdering::Concurrent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clocks_are_equal() {
        assert!(VectorClock::new().compare(&VectorClock::new()).is_equal());
    }

    #[test]
    fn increment_dominates_origin() {
        let a = VectorClock::new();
        let b = a.incremented(1);
        assert!(b.compare(&a).is_after());
        assert!(a.compare(&b).is_before());
    }

    #[test]
    fn disjoint_nodes_are_concurrent() {
        let a = VectorClock::from_entries([(1, 1)]);
        let b = VectorClock::from_entries([(2, 1)]);
        assert!(a.compare(&b).is_concurrent());
        assert!(b.compare(&a).is_concurrent());
    }

    #[test]
    fn antisymmetry_holds() {
        let a = VectorClock::from_entries([(1, 2), (2, 1)]);
        let b = VectorClock::from_entries([(1, 1), (2, 1)]);
        assert!(a.compare(&b).is_after());
        assert!(b.compare(&a).is_before());
    }

    #[test]
    fn merge_dominates_both_inputs() {
        let a = VectorClock::from_entries([(1, 3), (2, 0)]);
        let b = VectorClock::from_entries([(1, 0), (2, 5)]);
        let merged = a.merged(&b);
        assert!(merged.compare(&a).is_after());
        assert!(merged.compare(&b).is_after());
    }

    #[test]
    fn reflexive_equal() {
        let a = VectorClock::from_entries([(1, 4), (3, 2)]);
        assert!(a.compare(&a).is_equal());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_clock() -> impl Strategy<Value = VectorClock> {
        prop::collection::vec((0u32..4, 0u64..8), 0..4)
            .prop_map(VectorClock::from_entries)
    }

    proptest! {
        #[test]
        fn compare_is_reflexive(a in arb_clock()) {
            prop_assert!(a.compare(&a).is_equal());
        }

        #[test]
        fn compare_is_antisymmetric(a in arb_clock(), b in arb_clock()) {
            let forward = a.compare(&b);
            let backward = b.compare(&a);
            prop_assert_eq!(forward.is_before(), backward.is_after());
            prop_assert_eq!(forward.is_after(), backward.is_before());
            prop_assert_eq!(forward.is_concurrent(), backward.is_concurrent());
        }

        #[test]
        fn merge_always_dominates_or_equals_both_inputs(a in arb_clock(), b in arb_clock()) {
            let merged = a.merged(&b);
            prop_assert!(!merged.compare(&a).is_before());
            prop_assert!(!merged.compare(&b).is_before());
        }
    }
}
