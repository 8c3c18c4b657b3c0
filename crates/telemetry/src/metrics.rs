//! In-memory run metrics.
//!
//! Counters accumulate across a run and are snapshotted (and reset) by the
//! run controller when it logs the run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Collected metrics for the sync worker.
#[derive(Debug, Default)]
pub struct Metrics {
    // Per-circuit outcomes
    pub circuits_processed: Counter,
    pub circuits_succeeded: Counter,
    pub circuits_failed: Counter,

    // Upstream lookup failures by port
    pub network_lookup_failures: Counter,
    pub service_lookup_failures: Counter,
    pub optical_lookup_failures: Counter,

    // Writeback
    pub batches_written: Counter,
    pub batch_write_failures: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            circuits_processed: self.circuits_processed.get(),
            circuits_succeeded: self.circuits_succeeded.get(),
            circuits_failed: self.circuits_failed.get(),
            network_lookup_failures: self.network_lookup_failures.get(),
            service_lookup_failures: self.service_lookup_failures.get(),
            optical_lookup_failures: self.optical_lookup_failures.get(),
            batches_written: self.batches_written.get(),
            batch_write_failures: self.batch_write_failures.get(),
        }
    }

    /// Resets every counter to zero, returning the pre-reset snapshot.
    pub fn take_snapshot(&self) -> MetricsSnapshot {
        let snapshot = self.snapshot();
        self.circuits_processed.reset();
        self.circuits_succeeded.reset();
        self.circuits_failed.reset();
        self.network_lookup_failures.reset();
        self.service_lookup_failures.reset();
        self.optical_lookup_failures.reset();
        self.batches_written.reset();
        self.batch_write_failures.reset();
        snapshot
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub circuits_processed: u64,
    pub circuits_succeeded: u64,
    pub circuits_failed: u64,
    pub network_lookup_failures: u64,
    pub service_lookup_failures: u64,
    pub optical_lookup_failures: u64,
    pub batches_written: u64,
    pub batch_write_failures: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
