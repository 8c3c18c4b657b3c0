//! Capability ports consumed by the enrichment pipeline.
//!
//! One shared instance of each source serves all pool workers concurrently,
//! so implementations must be safe for concurrent callers. Each owns its own
//! request timeout and session lifecycle; the pipeline performs no retries.

use async_trait::async_trait;

use crate::circuit::{Circuit, EnrichedResult, OntLocation, OpticalReading, ServiceDetail};
use crate::error::Result;

/// Supplies the circuits for a run and accepts enriched results in batches.
#[async_trait]
pub trait CircuitStore: Send + Sync {
    async fn fetch_pending_circuits(&self) -> Result<Vec<Circuit>>;

    async fn update_batch(&self, batch: &[EnrichedResult]) -> Result<()>;
}

/// Resolves a circuit identifier to its OLT host and ONT address.
#[async_trait]
pub trait NetworkInfoSource: Send + Sync {
    async fn resolve(&self, circuit_id: &str) -> Result<OntLocation>;
}

/// Resolves a terminal location to link status and receive power.
#[async_trait]
pub trait OpticalInfoSource: Send + Sync {
    async fn resolve(&self, location: &OntLocation) -> Result<OpticalReading>;
}

/// Resolves a circuit identifier to PPPoE credentials and, where the billing
/// system tracks it, a VLAN.
#[async_trait]
pub trait ServiceDetailSource: Send + Sync {
    async fn resolve(&self, circuit_id: &str) -> Result<ServiceDetail>;
}
