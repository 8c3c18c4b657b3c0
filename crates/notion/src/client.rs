//! Notion database query client.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use sync_core::{Error, NetworkInfoSource, OntLocation, Port, Result};

use crate::config::NotionConfig;
use crate::parse::{extract_location, Property};

const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    properties: HashMap<String, Property>,
}

/// Client for the circuit inventory database.
///
/// Safe to share across all pool workers; the rate limiter serializes
/// requests so the integration stays under Notion's ~3/s budget.
pub struct NotionClient {
    config: NotionConfig,
    http: reqwest::Client,
    last_request: Mutex<Option<Instant>>,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("notion http client: {e}")))?;

        Ok(Self {
            config,
            http,
            last_request: Mutex::new(None),
        })
    }

    /// Waits out the remainder of the minimum request interval. The lock is
    /// held across the sleep so callers queue up behind it.
    async fn rate_limit(&self) {
        let min_interval = Duration::from_millis(self.config.min_request_interval_ms);
        let mut last = self.last_request.lock().await;

        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Runs one database query, retrying 429s with the server's Retry-After
    /// or exponential backoff.
    async fn query(&self, filter: Value) -> Result<QueryResponse> {
        let url = format!(
            "{}/v1/databases/{}/query",
            self.config.base_url, self.config.database_id
        );
        let base_delay = Duration::from_secs(1);

        for attempt in 0..self.config.max_retries {
            self.rate_limit().await;

            let resp = self
                .http
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .header("Notion-Version", NOTION_VERSION)
                .json(&filter)
                .send()
                .await
                .map_err(|e| Error::lookup(Port::NetworkInfo, format!("request failed: {e}")))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                let delay = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| base_delay * 2u32.pow(attempt));

                if attempt + 1 < self.config.max_retries {
                    warn!(delay_ms = delay.as_millis() as u64, "notion rate limited, backing off");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(Error::lookup(
                    Port::NetworkInfo,
                    "api error 429 (max retries exceeded)",
                ));
            }

            if !resp.status().is_success() {
                return Err(Error::lookup(
                    Port::NetworkInfo,
                    format!("api error {}", resp.status().as_u16()),
                ));
            }

            return resp
                .json()
                .await
                .map_err(|e| Error::lookup(Port::NetworkInfo, format!("bad response: {e}")));
        }

        Err(Error::lookup(Port::NetworkInfo, "max retries exceeded"))
    }

    fn contains_filter(kind: &str, needle: &str) -> Value {
        json!({
            "filter": {
                "property": "Description",
                kind: { "contains": needle }
            }
        })
    }

    /// Finds the first page whose Description matches the circuit.
    ///
    /// Two-step search: the specific `fx`-prefixed naming conventions first,
    /// then the bare CID anywhere in the field. Each needle is tried as a
    /// title filter and again as rich text, since the column type differs
    /// between deployments.
    async fn find_page(&self, circuit_id: &str) -> Result<Option<Page>> {
        let formats = [
            format!("fx-{circuit_id}-"),
            format!("fx{circuit_id}"),
            format!("fx-{circuit_id}"),
            circuit_id.to_string(),
        ];

        for needle in &formats {
            for kind in ["title", "rich_text"] {
                let resp = self.query(Self::contains_filter(kind, needle)).await?;
                if let Some(page) = resp.results.into_iter().next() {
                    debug!(needle = %needle, kind, "matched circuit page");
                    return Ok(Some(page));
                }
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl NetworkInfoSource for NotionClient {
    async fn resolve(&self, circuit_id: &str) -> Result<OntLocation> {
        let page = self
            .find_page(circuit_id)
            .await?
            .ok_or_else(|| Error::lookup(Port::NetworkInfo, "circuit not found"))?;

        extract_location(&page.properties)
    }
}
