//! Mock implementations for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use sync_core::{
    Circuit, CircuitStore, EnrichedResult, Error, NetworkInfoSource, OntLocation, OpticalInfoSource,
    OpticalReading, Port, Result, ServiceDetail, ServiceDetailSource,
};

/// Mock store that captures written batches in memory.
///
/// This implements the same `CircuitStore` trait as the real MySQL store,
/// allowing tests to verify the exact rows that would be written without a
/// database connection.
#[derive(Clone, Default)]
pub struct MockStore {
    /// Circuits returned by the next fetch.
    circuits: Arc<Mutex<Vec<Circuit>>>,
    /// All batches written through this store.
    batches: Arc<Mutex<Vec<Vec<EnrichedResult>>>>,
    /// Fail the next fetch if set.
    fail_fetch: Arc<Mutex<bool>>,
    /// Fail this many upcoming writes.
    fail_writes: Arc<Mutex<usize>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_circuits(circuits: Vec<Circuit>) -> Self {
        let store = Self::new();
        *store.circuits.lock() = circuits;
        store
    }

    /// Get all captured batches.
    pub fn captured_batches(&self) -> Vec<Vec<EnrichedResult>> {
        self.batches.lock().clone()
    }

    /// Get the sizes of captured batches, in write order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().iter().map(Vec::len).collect()
    }

    /// Get every written result, flattened across batches.
    pub fn written_results(&self) -> Vec<EnrichedResult> {
        self.batches.lock().iter().flatten().cloned().collect()
    }

    /// Set failure mode for the next fetch.
    pub fn set_fail_fetch(&self, fail: bool) {
        *self.fail_fetch.lock() = fail;
    }

    /// Fail the next `n` write calls, then recover.
    pub fn fail_next_writes(&self, n: usize) {
        *self.fail_writes.lock() = n;
    }
}

#[async_trait]
impl CircuitStore for MockStore {
    async fn fetch_pending_circuits(&self) -> Result<Vec<Circuit>> {
        if *self.fail_fetch.lock() {
            return Err(Error::store("mock fetch failure"));
        }
        Ok(self.circuits.lock().clone())
    }

    async fn update_batch(&self, batch: &[EnrichedResult]) -> Result<()> {
        {
            let mut remaining = self.fail_writes.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::store("mock write failure"));
            }
        }
        self.batches.lock().push(batch.to_vec());
        Ok(())
    }
}

/// Mock upstream sources with per-CID failure injection.
///
/// One instance backs all three source traits, mirroring how a single
/// deployment wires one client per port. Calls are counted so tests can
/// assert which lookups ran.
#[derive(Default)]
pub struct MockSources {
    /// CIDs whose network-info lookup fails.
    fail_network: Mutex<Vec<String>>,
    /// CIDs whose service-detail lookup fails.
    fail_service: Mutex<Vec<String>>,
    /// OLT hosts whose optical lookup fails.
    fail_optical: Mutex<Vec<String>>,
    /// Canned service details keyed by CID, when the default is not enough.
    details: Mutex<HashMap<String, ServiceDetail>>,
    network_calls: Mutex<u64>,
    service_calls: Mutex<u64>,
    optical_calls: Mutex<u64>,
}

impl MockSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_network_for(&self, cid: &str) {
        self.fail_network.lock().push(cid.to_string());
    }

    pub fn fail_service_for(&self, cid: &str) {
        self.fail_service.lock().push(cid.to_string());
    }

    pub fn fail_optical_for(&self, olt_host: &str) {
        self.fail_optical.lock().push(olt_host.to_string());
    }

    pub fn set_detail(&self, cid: &str, detail: ServiceDetail) {
        self.details.lock().insert(cid.to_string(), detail);
    }

    pub fn network_calls(&self) -> u64 {
        *self.network_calls.lock()
    }

    pub fn service_calls(&self) -> u64 {
        *self.service_calls.lock()
    }

    pub fn optical_calls(&self) -> u64 {
        *self.optical_calls.lock()
    }
}

#[async_trait]
impl NetworkInfoSource for MockSources {
    async fn resolve(&self, circuit_id: &str) -> Result<OntLocation> {
        *self.network_calls.lock() += 1;
        if self.fail_network.lock().iter().any(|c| c == circuit_id) {
            return Err(Error::lookup(Port::NetworkInfo, "circuit not found"));
        }
        Ok(OntLocation {
            olt_host: "olt-mock-01".to_string(),
            ont_address: "1/4/7".to_string(),
        })
    }
}

#[async_trait]
impl ServiceDetailSource for MockSources {
    async fn resolve(&self, circuit_id: &str) -> Result<ServiceDetail> {
        *self.service_calls.lock() += 1;
        if self.fail_service.lock().iter().any(|c| c == circuit_id) {
            return Err(Error::lookup(Port::ServiceDetail, "service not found"));
        }
        if let Some(detail) = self.details.lock().get(circuit_id) {
            return Ok(detail.clone());
        }
        Ok(ServiceDetail {
            username: Some(format!("{circuit_id}@isp.example")),
            password: Some("hunter2".to_string()),
            vlan: Some("120".to_string()),
        })
    }
}

#[async_trait]
impl OpticalInfoSource for MockSources {
    async fn resolve(&self, location: &OntLocation) -> Result<OpticalReading> {
        *self.optical_calls.lock() += 1;
        if self
            .fail_optical
            .lock()
            .iter()
            .any(|h| h == &location.olt_host)
        {
            return Err(Error::lookup(Port::OpticalInfo, "host unreachable"));
        }
        Ok(OpticalReading {
            status: Some("1".to_string()),
            rx_power: Some("-21.3 dBm".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_store_captures_batches() {
        let store = MockStore::new();

        let batch = vec![EnrichedResult::new("cid-1"), EnrichedResult::new("cid-2")];
        store.update_batch(&batch).await.unwrap();

        assert_eq!(store.batch_sizes(), vec![2]);
        assert_eq!(store.written_results()[0].circuit_id, "cid-1");
    }

    #[tokio::test]
    async fn mock_store_write_failures_are_consumed() {
        let store = MockStore::new();
        store.fail_next_writes(1);

        let batch = vec![EnrichedResult::new("cid-1")];
        assert!(store.update_batch(&batch).await.is_err());
        assert!(store.update_batch(&batch).await.is_ok());
        assert_eq!(store.batch_sizes(), vec![1]);
    }

    #[tokio::test]
    async fn mock_sources_fail_per_cid() {
        let sources = MockSources::new();
        sources.fail_network_for("cid-bad");

        assert!(NetworkInfoSource::resolve(&sources, "cid-bad")
            .await
            .is_err());
        assert!(NetworkInfoSource::resolve(&sources, "cid-ok").await.is_ok());
        assert_eq!(sources.network_calls(), 2);
    }
}
