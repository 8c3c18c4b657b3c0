//! Test fixtures and circuit generators.

use sync_core::Circuit;

/// Generate a circuit with only the CID populated.
pub fn circuit(cid: &str) -> Circuit {
    Circuit::new(cid)
}

/// Generate a circuit with routing hints already present, so the
/// network-info lookup is skipped.
pub fn circuit_with_hints(cid: &str, olt_host: &str, ont_address: &str) -> Circuit {
    Circuit {
        cid: cid.to_string(),
        olt_host: Some(olt_host.to_string()),
        ont_address: Some(ont_address.to_string()),
    }
}

/// Generate N circuits with sequential CIDs (`cid-0001` and so on).
pub fn circuits(n: usize) -> Vec<Circuit> {
    (0..n).map(|i| circuit(&format!("cid-{:04}", i))).collect()
}
