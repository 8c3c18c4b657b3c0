//! Domain entities for circuit enrichment.

use serde::{Deserialize, Serialize};

use crate::error::EnrichErrors;

/// A network circuit pending enrichment.
///
/// The store only guarantees the CID; OLT host and ONT address may be
/// pre-populated for deployments whose inventory carries them, in which case
/// the network-info lookup is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    /// Customer circuit identifier, the join key for writeback.
    pub cid: String,
    /// OLT hostname, if the store already knows it.
    pub olt_host: Option<String>,
    /// ONT address in `a/b/c` form, if the store already knows it.
    pub ont_address: Option<String>,
}

impl Circuit {
    pub fn new(cid: impl Into<String>) -> Self {
        Self {
            cid: cid.into(),
            olt_host: None,
            ont_address: None,
        }
    }

    /// Returns the pre-supplied routing hints, when both halves are present.
    pub fn routing_hints(&self) -> Option<OntLocation> {
        match (&self.olt_host, &self.ont_address) {
            (Some(olt), Some(ont)) if !olt.is_empty() && !ont.is_empty() => Some(OntLocation {
                olt_host: olt.clone(),
                ont_address: ont.clone(),
            }),
            _ => None,
        }
    }
}

/// Where a subscriber terminal lives: an OLT hostname plus an `a/b/c`
/// port/index address under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntLocation {
    pub olt_host: String,
    pub ont_address: String,
}

/// Optical telemetry for one terminal. Either half may be missing when the
/// monitoring system has no recent reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpticalReading {
    /// GPON link status as reported by the monitoring system.
    pub status: Option<String>,
    /// Receive power, unit-suffixed (e.g. `-21.3 dBm`).
    pub rx_power: Option<String>,
}

/// PPPoE credentials (and, where the billing system tracks it, a VLAN) for
/// one circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDetail {
    pub username: Option<String>,
    pub password: Option<String>,
    pub vlan: Option<String>,
}

impl ServiceDetail {
    /// True when no field was resolved.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.vlan.is_none()
    }
}

/// The outcome of one enrichment workflow execution.
///
/// Produced exactly once per circuit. A result with accumulated errors may
/// still carry partial data from the steps that succeeded.
#[derive(Debug, Clone, Default)]
pub struct EnrichedResult {
    pub circuit_id: String,
    pub vlan: Option<String>,
    pub pppoe_username: Option<String>,
    pub pppoe_password: Option<String>,
    pub optical_status: Option<String>,
    pub rx_power: Option<String>,
    /// Tagged failures from the upstream lookups. Empty means full success.
    pub errors: EnrichErrors,
}

impl EnrichedResult {
    pub fn new(circuit_id: impl Into<String>) -> Self {
        Self {
            circuit_id: circuit_id.into(),
            ..Self::default()
        }
    }

    /// True when every attempted lookup succeeded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
