//! Single-run orchestration: fetch, fan out, write back.

use std::sync::Arc;

use tracing::info;

use sync_core::{CircuitStore, Result};

use crate::pool::WorkerPool;
use crate::writer::{BatchWriter, RunStats};

/// Executes one synchronization run end to end.
///
/// A fetch failure aborts the run (nothing to enrich); everything past the
/// fetch is best-effort and recorded in the returned stats.
pub struct SyncRunner {
    store: Arc<dyn CircuitStore>,
    pool: WorkerPool,
    writer: BatchWriter,
}

impl SyncRunner {
    pub fn new(store: Arc<dyn CircuitStore>, pool: WorkerPool, writer: BatchWriter) -> Self {
        Self {
            store,
            pool,
            writer,
        }
    }

    pub async fn run_once(&self) -> Result<RunStats> {
        let circuits = self.store.fetch_pending_circuits().await?;

        if circuits.is_empty() {
            info!("no pending circuits");
            return Ok(RunStats::default());
        }

        info!(
            count = circuits.len(),
            workers = self.pool.worker_count(),
            "processing circuits"
        );

        let results = self.pool.run(circuits);
        let stats = self.writer.drain(results).await;

        info!(
            total = stats.total,
            succeeded = stats.succeeded,
            failed = stats.failed,
            batches = stats.batches_written,
            batch_failures = stats.batch_failures,
            "run complete"
        );

        Ok(stats)
    }
}
