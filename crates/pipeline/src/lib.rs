//! Enrichment pipeline for the circuit sync worker.
//!
//! - `enrich`: the per-circuit three-step workflow
//! - `pool`: bounded fan-out across N concurrent workers
//! - `writer`: fixed-size batch writeback with run statistics
//! - `runner`: one run end to end (fetch → pool → writer)

pub mod enrich;
pub mod pool;
pub mod runner;
pub mod writer;


pub use enrich::Enricher;
pub use pool::WorkerPool;
pub use runner::SyncRunner;
pub use writer::{BatchWriter, RunStats, WriterConfig};
