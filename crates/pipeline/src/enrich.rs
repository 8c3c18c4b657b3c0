//! Per-circuit enrichment workflow.
//!
//! Three lookups in fixed order with partial-failure tolerance:
//! 1. Network-info: CID → OLT host + ONT address (skipped when the store
//!    already supplied both as routing hints).
//! 2. Service-detail: CID → PPPoE credentials, independent of step 1.
//! 3. Optical-info: location → link status + rx power, only attempted when
//!    step 1 produced a location.
//!
//! Every failure is recorded under its port's tag on the result; the
//! workflow never aborts early and always yields exactly one result.

use std::sync::Arc;

use sync_core::{
    Circuit, EnrichedResult, NetworkInfoSource, OpticalInfoSource, Port, ServiceDetailSource,
};
use telemetry::metrics;
use tracing::warn;

/// Runs the enrichment workflow against the three source ports.
///
/// One instance is shared by all pool workers; the ports it holds must be
/// safe for concurrent callers.
pub struct Enricher {
    network: Arc<dyn NetworkInfoSource>,
    service: Arc<dyn ServiceDetailSource>,
    optical: Arc<dyn OpticalInfoSource>,
}

impl Enricher {
    pub fn new(
        network: Arc<dyn NetworkInfoSource>,
        service: Arc<dyn ServiceDetailSource>,
        optical: Arc<dyn OpticalInfoSource>,
    ) -> Self {
        Self {
            network,
            service,
            optical,
        }
    }

    /// Produces the one result for this circuit. Never fails; failures end
    /// up on `result.errors` with partial data retained.
    pub async fn enrich(&self, circuit: &Circuit) -> EnrichedResult {
        let mut result = EnrichedResult::new(&circuit.cid);

        // Step 1: where does this circuit terminate?
        let location = match circuit.routing_hints() {
            Some(hints) => Some(hints),
            None => match self.network.resolve(&circuit.cid).await {
                Ok(location) => Some(location),
                Err(err) => {
                    let err = err.into_lookup(Port::NetworkInfo);
                    warn!(cid = %circuit.cid, error = %err, "network-info lookup failed");
                    metrics().network_lookup_failures.inc();
                    result.errors.push(err);
                    None
                }
            },
        };

        // Step 2: credentials, regardless of step 1's outcome.
        match self.service.resolve(&circuit.cid).await {
            Ok(detail) => {
                result.pppoe_username = detail.username;
                result.pppoe_password = detail.password;
                result.vlan = detail.vlan;
            }
            Err(err) => {
                let err = err.into_lookup(Port::ServiceDetail);
                warn!(cid = %circuit.cid, error = %err, "service-detail lookup failed, continuing");
                metrics().service_lookup_failures.inc();
                result.errors.push(err);
            }
        }

        // Step 3: optical telemetry needs the location from step 1.
        if let Some(location) = location {
            match self.optical.resolve(&location).await {
                Ok(reading) => {
                    result.optical_status = reading.status;
                    result.rx_power = reading.rx_power;
                }
                Err(err) => {
                    let err = err.into_lookup(Port::OpticalInfo);
                    warn!(
                        cid = %circuit.cid,
                        olt = %location.olt_host,
                        ont = %location.ont_address,
                        error = %err,
                        "optical-info lookup failed"
                    );
                    metrics().optical_lookup_failures.inc();
                    result.errors.push(err);
                }
            }
        }

        result
    }
}
