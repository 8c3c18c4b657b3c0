//! Ubersmith API client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use sync_core::{Error, Port, Result, ServiceDetail, ServiceDetailSource};

use crate::config::UbersmithConfig;
use crate::sniff::{extract_detail, mask_password};

/// API methods tried in order; installs expose different subsets.
const METHODS: &[&str] = &[
    "client.service_get",
    "service.get",
    "uber.service_get",
    "client.service_list",
    "service.list",
];

/// Client for the billing system.
///
/// The CID doubles as the Ubersmith service ID. Stateless apart from the
/// connection pool, so freely shared across workers.
pub struct UbersmithClient {
    config: UbersmithConfig,
    http: reqwest::Client,
}

impl UbersmithClient {
    pub fn new(config: UbersmithConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("ubersmith http client: {e}")))?;

        Ok(Self { config, http })
    }

    /// One GET against a method, envelope check, field discovery. The
    /// returned detail may be empty; the caller decides whether to try the
    /// next method.
    async fn fetch(&self, method: &str, cid: &str, include_custom: bool) -> Result<ServiceDetail> {
        let mut url = format!(
            "{}?method={}&service_id={}",
            self.config.base_url, method, cid
        );
        if include_custom {
            url.push_str("&include_custom_fields=1");
        }

        let body: Value = self
            .http
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| Error::lookup(Port::ServiceDetail, format!("request failed: {e}")))?
            .json()
            .await
            .map_err(|e| Error::lookup(Port::ServiceDetail, format!("bad response: {e}")))?;

        if body.get("status").and_then(Value::as_bool) != Some(true) {
            let message = body
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or("status false");
            return Err(Error::lookup(
                Port::ServiceDetail,
                format!("{method}: {message}"),
            ));
        }

        let data = body
            .get("data")
            .ok_or_else(|| Error::lookup(Port::ServiceDetail, format!("{method}: no data field")))?;

        Ok(extract_detail(data))
    }
}

#[async_trait]
impl ServiceDetailSource for UbersmithClient {
    async fn resolve(&self, circuit_id: &str) -> Result<ServiceDetail> {
        let mut last_err = Error::lookup(
            Port::ServiceDetail,
            format!("service not found for CID {circuit_id}"),
        );

        for method in METHODS {
            // service_get can surface custom fields inline; try that first.
            if *method == "client.service_get" {
                if let Ok(detail) = self.fetch(method, circuit_id, true).await {
                    if !detail.is_empty() {
                        return Ok(detail);
                    }
                }
            }

            match self.fetch(method, circuit_id, false).await {
                Ok(detail) if !detail.is_empty() => {
                    debug!(
                        cid = circuit_id,
                        method,
                        user = detail.username.as_deref().unwrap_or(""),
                        pass = %mask_password(detail.password.as_deref().unwrap_or("")),
                        "service detail resolved"
                    );
                    return Ok(detail);
                }
                Ok(_) => {
                    last_err = Error::lookup(
                        Port::ServiceDetail,
                        format!("{method}: fields not present for CID {circuit_id}"),
                    );
                }
                Err(err) => last_err = err,
            }
        }

        Err(last_err)
    }
}
