//! MySQL-backed circuit store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{debug, info};

use sync_core::{Circuit, CircuitStore, EnrichedResult, Error, Result};

use crate::config::DbConfig;

/// Circuit store over a MySQL connection pool.
///
/// Shared by the run controller and the batch writer; the pool makes it safe
/// for concurrent callers.
pub struct MySqlCircuitStore {
    pool: MySqlPool,
}

impl MySqlCircuitStore {
    /// Connects the pool and verifies the database is reachable.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| Error::store(format!("connect failed: {e}")))?;

        info!(max_connections = config.max_connections, "connected to circuit database");

        Ok(Self { pool })
    }

    /// Round-trips a trivial query. Used as the startup health check.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store(format!("ping failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl CircuitStore for MySqlCircuitStore {
    /// Fetches every CID without filtering; stale rows are re-enriched each
    /// run rather than tracked.
    async fn fetch_pending_circuits(&self) -> Result<Vec<Circuit>> {
        let cids: Vec<String> = sqlx::query_scalar("SELECT `CID` FROM `circuitos`")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store(format!("fetch circuits failed: {e}")))?;

        debug!(count = cids.len(), "fetched pending circuits");

        Ok(cids.into_iter().map(Circuit::new).collect())
    }

    /// Writes one UPDATE per result inside a single transaction, keyed by
    /// CID. VLAN is deliberately not written back.
    async fn update_batch(&self, batch: &[EnrichedResult]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::store(format!("begin failed: {e}")))?;

        for result in batch {
            sqlx::query(
                "UPDATE `circuitos` \
                 SET `RxPower` = ?, `StatusGpon` = ?, `PPPoEUsername` = ?, `PPPoEPassword` = ? \
                 WHERE `CID` = ?",
            )
            .bind(result.rx_power.as_deref().unwrap_or(""))
            .bind(result.optical_status.as_deref().unwrap_or(""))
            .bind(result.pppoe_username.as_deref().unwrap_or(""))
            .bind(result.pppoe_password.as_deref().unwrap_or(""))
            .bind(&result.circuit_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                Error::store(format!("update for circuit {} failed: {e}", result.circuit_id))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::store(format!("commit failed: {e}")))?;

        debug!(count = batch.len(), "batch committed");
        Ok(())
    }
}
