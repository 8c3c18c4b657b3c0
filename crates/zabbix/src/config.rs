//! Zabbix adapter configuration.

use serde::{Deserialize, Serialize};

/// Zabbix API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZabbixConfig {
    /// JSON-RPC endpoint (…/api_jsonrpc.php)
    pub url: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ZabbixConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
