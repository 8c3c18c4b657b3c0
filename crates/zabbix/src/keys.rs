//! Item key construction and receive-power extraction.
//!
//! An ONT address `a/b/c` maps onto two monitored item keys on the OLT
//! host: `rx power:b/c` for receive power and `gpon_b_status` for link
//! status. Some OLT templates do not expose per-terminal `rx power` items
//! and instead publish one `ms_item_ont_rx_power*` item whose last value is
//! a JSON array of per-interface readings in tenths of a dBm.

use std::collections::BTreeMap;

use serde_json::Value;

use sync_core::{Error, Port, Result};

use crate::client::Item;

/// The Zabbix item keys addressing one terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKeys {
    pub power_key: String,
    pub status_key: String,
    /// `b/c` pattern used by the aggregated rx-power fallback.
    pub interface: String,
}

impl ItemKeys {
    pub fn parse(ont_address: &str) -> Result<Self> {
        let parts: Vec<&str> = ont_address.split('/').collect();
        if parts.len() < 3 {
            return Err(Error::lookup(
                Port::OpticalInfo,
                format!("invalid ONT address format: {ont_address}"),
            ));
        }

        let port = parts[1];
        let index = parts[2];

        Ok(Self {
            power_key: format!("rx power:{port}/{index}"),
            status_key: format!("gpon_{port}_status"),
            interface: format!("{port}/{index}"),
        })
    }
}

/// Finds the receive power for a terminal among a host's items.
///
/// Exact key first; a reading of `0` means no live signal and yields
/// nothing. Otherwise falls back to the aggregated JSON item.
pub fn find_rx_power(items: &[Item], keys: &ItemKeys) -> Option<String> {
    if let Some(item) = items.iter().find(|i| i.key == keys.power_key) {
        let value = item.last_value.trim();
        if value.is_empty() || value == "0" {
            return None;
        }
        return Some(format!("{value} dBm"));
    }

    items
        .iter()
        .filter(|i| i.key.to_lowercase().contains("ms_item_ont_rx_power"))
        .find_map(|item| rx_from_aggregate(&item.last_value, &keys.interface))
}

/// Pulls this interface's reading out of an aggregated rx-power JSON value,
/// e.g. `[{"interface":"2/3","potencia":"-158"}, …]` → `-15.8 dBm`.
fn rx_from_aggregate(raw: &str, interface: &str) -> Option<String> {
    let entries: Vec<BTreeMap<String, Value>> = serde_json::from_str(raw).ok()?;

    for entry in &entries {
        let matches = entry
            .get("interface")
            .and_then(Value::as_str)
            .map(|i| i == interface)
            .unwrap_or(false);
        if !matches {
            continue;
        }

        for (key, value) in entry {
            if matches!(key.as_str(), "interface" | "onustatus" | "indice" | "contador") {
                continue;
            }
            let Some(text) = value.as_str() else { continue };
            let Ok(parsed) = text.parse::<f64>() else { continue };
            if parsed == 0.0 {
                // Zero reading means no signal on this interface.
                continue;
            }
            // Values arrive in tenths: -158 is -15.8 dBm.
            return Some(format!("{:.1} dBm", parsed / 10.0));
        }
    }

    None
}
