//! Request-statistics core: a sliding-window counter per operation kind,
//! aggregated by a [`StatsRegistry`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod registry;
mod sliding_window;

pub use registry::StatsRegistry;
pub use sliding_window::{SlidingWindowCounter, THROUGHPUT_SENTINEL};
