//! Bounded worker pool over a pre-materialized circuit queue.
//!
//! Every circuit is enqueued up front; N workers pull from the shared queue
//! as they free up, so slow circuits do not stall a static partition. The
//! result stream yields results in completion order and closes only after
//! the last worker has finished its in-flight item.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, Receiver};
use tracing::debug;

use sync_core::{Circuit, EnrichedResult};

use crate::enrich::Enricher;

/// Fans circuits out across a fixed number of concurrent workers.
pub struct WorkerPool {
    workers: NonZeroUsize,
    enricher: Arc<Enricher>,
}

impl WorkerPool {
    /// A zero worker count is unrepresentable here; the config layer rejects
    /// it before construction.
    pub fn new(workers: NonZeroUsize, enricher: Arc<Enricher>) -> Self {
        Self { workers, enricher }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.get()
    }

    /// Starts the workers and returns the result stream.
    ///
    /// Yields exactly one `EnrichedResult` per input circuit, in completion
    /// order. A circuit that fails every lookup still produces a result;
    /// nothing is dropped and nothing aborts the pool. The channel holds one
    /// slot per circuit, so workers never block on a slow consumer.
    pub fn run(&self, circuits: Vec<Circuit>) -> Receiver<EnrichedResult> {
        let (tx, rx) = mpsc::channel(circuits.len().max(1));
        let queue = Arc::new(Mutex::new(VecDeque::from(circuits)));

        for worker_id in 0..self.workers.get() {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let enricher = Arc::clone(&self.enricher);

            tokio::spawn(async move {
                loop {
                    // The lock is only held for the pop, never across an await.
                    let circuit = queue.lock().pop_front();
                    let Some(circuit) = circuit else { break };

                    let result = enricher.enrich(&circuit).await;

                    // A dropped receiver means the run was abandoned.
                    if tx.send(result).await.is_err() {
                        break;
                    }
                }
                debug!(worker_id, "worker drained");
            });
        }

        // The stream closes once the last worker drops its sender clone.
        rx
    }
}
