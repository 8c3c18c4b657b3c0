//! Ubersmith adapter configuration.

use serde::{Deserialize, Serialize};

/// Ubersmith API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UbersmithConfig {
    /// API endpoint (…/api/2.0/)
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for UbersmithConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
