//! Zabbix JSON-RPC 2.0 client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use sync_core::{Error, OntLocation, OpticalInfoSource, OpticalReading, Port, Result};

use crate::config::ZabbixConfig;
use crate::keys::{find_rx_power, ItemKeys};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// One monitored item on a host.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    #[serde(rename = "key_", default)]
    pub key: String,
    #[serde(rename = "lastvalue", default)]
    pub last_value: String,
}

/// Client for the monitoring system's JSON-RPC API.
///
/// The session token lives behind a lock shared by all workers; the run
/// controller re-authenticates once at the start of every run in case the
/// previous token expired.
pub struct ZabbixClient {
    config: ZabbixConfig,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl ZabbixClient {
    pub fn new(config: ZabbixConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("zabbix http client: {e}")))?;

        Ok(Self {
            config,
            http,
            token: RwLock::new(None),
        })
    }

    /// Logs in and replaces the cached session token.
    pub async fn authenticate(&self) -> Result<()> {
        let result = self
            .rpc(
                "user.login",
                json!({
                    "username": self.config.username,
                    "password": self.config.password,
                }),
                None,
            )
            .await?;

        let token = result
            .as_str()
            .ok_or_else(|| Error::lookup(Port::OpticalInfo, "login returned no token"))?
            .to_string();

        *self.token.write().await = Some(token);
        info!("zabbix session established");
        Ok(())
    }

    async fn rpc(&self, method: &str, params: Value, auth: Option<&str>) -> Result<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
            auth,
        };

        let resp: RpcResponse = self
            .http
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::lookup(Port::OpticalInfo, format!("request failed: {e}")))?
            .json()
            .await
            .map_err(|e| Error::lookup(Port::OpticalInfo, format!("bad response: {e}")))?;

        if let Some(err) = resp.error {
            return Err(Error::lookup(
                Port::OpticalInfo,
                format!("api error {}: {}", err.code, err.message),
            ));
        }

        resp.result
            .ok_or_else(|| Error::lookup(Port::OpticalInfo, "empty result"))
    }

    async fn items(&self, params: Value, token: &str) -> Result<Vec<Item>> {
        let result = self.rpc("item.get", params, Some(token)).await?;
        serde_json::from_value(result)
            .map_err(|e| Error::lookup(Port::OpticalInfo, format!("bad item list: {e}")))
    }

    async fn session_token(&self) -> Result<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::lookup(Port::OpticalInfo, "not authenticated"))
    }
}

#[async_trait]
impl OpticalInfoSource for ZabbixClient {
    async fn resolve(&self, location: &OntLocation) -> Result<OpticalReading> {
        let keys = ItemKeys::parse(&location.ont_address)?;
        let token = self.session_token().await?;

        // Status lookup filters on the exact key server-side.
        let status_items = self
            .items(
                json!({
                    "output": ["lastvalue", "key_"],
                    "host": location.olt_host,
                    "filter": { "key_": keys.status_key },
                }),
                &token,
            )
            .await?;

        let status = status_items
            .iter()
            .find(|i| i.key == keys.status_key)
            .map(|i| i.last_value.clone())
            .filter(|s| !s.is_empty());

        // Receive power needs the host's full item list because the exact
        // key may not exist on hosts using the aggregated template. A
        // failure here degrades to a missing reading rather than an error.
        let rx_power = match self
            .items(
                json!({
                    "output": ["lastvalue", "key_"],
                    "host": location.olt_host,
                }),
                &token,
            )
            .await
        {
            Ok(items) => find_rx_power(&items, &keys),
            Err(err) => {
                debug!(olt = %location.olt_host, error = %err, "rx power query failed");
                None
            }
        };

        Ok(OpticalReading { status, rx_power })
    }
}
