//! # vkv
//!
//! The storage-engine core of a distributed, versioned key-value store:
//! an in-memory, version-aware engine with optimistic vector-clock
//! conflict detection, a heap-pressure-driven eviction cache, and a
//! sliding-window request-statistics core.
//!
//! This crate is the local, single-node building block — network
//! transport, replication, on-disk persistence, and cluster membership
//! are out of scope for this crate.
//!
//! # Quick start
//!
//! ```
//! use vkv::{InMemoryEngine, Store, Versioned, VectorClock};
//!
//! let engine: InMemoryEngine<String, VectorClock, String> = InMemoryEngine::new();
//!
//! let version = VectorClock::new().incremented(1);
//! engine.put("user:1".to_string(), Versioned::new("alice".to_string(), version)).unwrap();
//!
//! let records = engine.get(&"user:1".to_string()).unwrap();
//! assert_eq!(records[0].value().as_str(), "alice");
//! ```
//!
//! # Components
//!
//! | Component | Crate | Responsibility |
//! |---|---|---|
//! | [`Clock`] / [`VectorClock`] | `vkv-core` | Four-valued version comparison contract |
//! | [`Versioned`] | `vkv-core` | Immutable (value, version) pair |
//! | [`StoreError`] | `vkv-core` | Shared error taxonomy |
//! | [`SlidingWindowCounter`] / [`StatsRegistry`] | `vkv-stats` | Per-operation count, throughput, mean latency |
//! | [`EvictionMap`] | `vkv-eviction` | Heap-pressure-triggered FIFO / second-chance / LRU cache |
//! | [`InMemoryEngine`] / [`Store`] | `vkv-engine` | The versioned engine and its capability-set interface |
//! | [`StatTrackingStore`] | `vkv-engine` | Times any `Store` into a `StatsRegistry` |
//!
//! Internal crates are path dependencies of this facade; only the names
//! re-exported here are part of the stable public surface.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use vkv_core::{Clock, ClockOrdering, MatchType, NodeId, OperationKind, StoreError, StoreResult, VectorClock, Versioned};
pub use vkv_engine::{InMemoryEngine, KeySerializer, StatTrackingStore, Store, StringKeySerializer};
pub use vkv_eviction::{testing, EvictionListener, EvictionMap, EvictionPolicy, HeapReading, HeapSampler, SysinfoHeapSampler};
pub use vkv_stats::{SlidingWindowCounter, StatsRegistry, THROUGHPUT_SENTINEL};
