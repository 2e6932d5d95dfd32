//! Core contract types for the versioned storage-engine.
//!
//! This crate defines the types every other `vkv-*` crate builds on:
//! - [`Clock`] / [`ClockOrdering`]: the version-comparison contract
//! - [`VectorClock`]: the canonical `Clock` implementation
//! - [`Versioned`]: an immutable (value, version) pair
//! - [`StoreError`] / [`StoreResult`]: the shared error taxonomy
//! - [`OperationKind`]: the stats enumeration
//! - [`MatchType`]: the expression-delete predicate enumeration

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clock;
mod error;
mod match_type;
mod op;
mod versioned;

pub use clock::{Clock, ClockOrdering, NodeId, VectorClock};
pub use error::{StoreError, StoreResult};
pub use match_type::MatchType;
pub use op::OperationKind;
pub use versioned::Versioned;
