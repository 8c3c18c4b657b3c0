//! Notion adapter configuration.

use serde::{Deserialize, Serialize};

/// Notion client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Integration API key
    pub api_key: String,
    /// Database holding the circuit inventory
    pub database_id: String,
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Minimum spacing between requests; Notion allows roughly 3/s
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
    /// Attempts per query when rate limited
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://api.notion.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_request_interval_ms() -> u64 {
    350
}

fn default_max_retries() -> u32 {
    3
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            database_id: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            min_request_interval_ms: default_min_request_interval_ms(),
            max_retries: default_max_retries(),
        }
    }
}
