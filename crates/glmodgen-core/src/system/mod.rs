//! # System Module
//!
//! Summary metrics over a finished module graph.
//!
//! The metrics are pure and integer-only; they describe a run without
//! influencing it.

mod metrics;

pub use metrics::*;
