//! Batch writer: drains the result stream into fixed-size store updates.

use std::sync::Arc;

use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info, warn};

use sync_core::{CircuitStore, EnrichedResult};
use telemetry::metrics;

/// Batch writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Results accumulated before a flush.
    pub batch_size: usize,
    /// Log would-be updates instead of writing them.
    pub dry_run: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            dry_run: false,
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Results consumed from the stream.
    pub total: usize,
    /// Results with no accumulated lookup errors.
    pub succeeded: usize,
    /// Results carrying at least one lookup error.
    pub failed: usize,
    /// Batches flushed to the store (or logged, in dry-run).
    pub batches_written: usize,
    /// Batch updates the store rejected. Their data is not retried.
    pub batch_failures: usize,
}

/// Consumes the pool's result stream and writes batches to the store.
///
/// A failed batch update is logged as critical and its data dropped;
/// consumption of the remaining stream continues. At-most-once by design.
pub struct BatchWriter {
    store: Arc<dyn CircuitStore>,
    config: WriterConfig,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn CircuitStore>, config: WriterConfig) -> Self {
        Self { store, config }
    }

    /// Drains the stream to exhaustion, flushing full batches as they fill
    /// and any partial batch at the end.
    pub async fn drain(&self, mut results: Receiver<EnrichedResult>) -> RunStats {
        let batch_size = self.config.batch_size.max(1);
        let mut batch: Vec<EnrichedResult> = Vec::with_capacity(batch_size);
        let mut stats = RunStats::default();

        while let Some(result) = results.recv().await {
            stats.total += 1;
            metrics().circuits_processed.inc();

            if result.is_ok() {
                stats.succeeded += 1;
                metrics().circuits_succeeded.inc();
                info!(
                    cid = %result.circuit_id,
                    status = result.optical_status.as_deref().unwrap_or(""),
                    rx_power = result.rx_power.as_deref().unwrap_or(""),
                    pppoe_user = result.pppoe_username.as_deref().unwrap_or(""),
                    "circuit enriched"
                );
            } else {
                stats.failed += 1;
                metrics().circuits_failed.inc();
                warn!(
                    cid = %result.circuit_id,
                    status = result.optical_status.as_deref().unwrap_or(""),
                    rx_power = result.rx_power.as_deref().unwrap_or(""),
                    pppoe_user = result.pppoe_username.as_deref().unwrap_or(""),
                    errors = %result.errors,
                    "circuit enriched with errors"
                );
            }

            batch.push(result);
            if batch.len() >= batch_size {
                self.flush(&mut batch, &mut stats).await;
            }
        }

        // Final partial batch.
        if !batch.is_empty() {
            self.flush(&mut batch, &mut stats).await;
        }

        stats
    }

    async fn flush(&self, batch: &mut Vec<EnrichedResult>, stats: &mut RunStats) {
        if self.config.dry_run {
            info!(count = batch.len(), "dry-run: batch not written");
            for item in batch.iter() {
                debug!(
                    cid = %item.circuit_id,
                    rx_power = item.rx_power.as_deref().unwrap_or(""),
                    status = item.optical_status.as_deref().unwrap_or(""),
                    pppoe_user = item.pppoe_username.as_deref().unwrap_or(""),
                    "dry-run row"
                );
            }
            stats.batches_written += 1;
            metrics().batches_written.inc();
            batch.clear();
            return;
        }

        match self.store.update_batch(batch).await {
            Ok(()) => {
                stats.batches_written += 1;
                metrics().batches_written.inc();
                info!(count = batch.len(), "batch written");
            }
            Err(err) => {
                stats.batch_failures += 1;
                metrics().batch_write_failures.inc();
                error!(count = batch.len(), error = %err, "CRITICAL: batch update failed, data dropped");
            }
        }
        batch.clear();
    }
}
