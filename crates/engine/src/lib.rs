//! Versioned in-memory storage engine.
//!
//! [`InMemoryEngine`] implements [`Store`], the seven-operation
//! capability-set interface every wrapper composes over. Optimistic put
//! resolves conflicting writes via [`vkv_core::Clock`] comparison; version-
//! scoped delete and expression-driven bulk delete follow the same
//! comparison contract. [`StatTrackingStore`] wraps any `Store` to time
//! operations into a [`vkv_stats::StatsRegistry`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod serializer;
mod stat_tracking;
mod store;

pub use engine::InMemoryEngine;
pub use serializer::{KeySerializer, StringKeySerializer};
pub use stat_tracking::StatTrackingStore;
pub use store::Store;
