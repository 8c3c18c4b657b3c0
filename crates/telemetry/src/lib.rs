//! Internal telemetry for the circuit sync worker.
//!
//! No external metrics system; counters live in memory and surface through
//! the per-run summary log.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
