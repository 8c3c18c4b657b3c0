//! GPON circuit synchronization worker.
//!
//! Periodically enriches the circuit inventory:
//! - Notion lookup for OLT host and ONT address
//! - Zabbix lookup for GPON status and optical rx power
//! - Ubersmith lookup for PPPoE credentials and VLAN
//! - Batched writeback into the MySQL circuit table

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use circuit_db::{DbConfig, MySqlCircuitStore};
use notion::{NotionClient, NotionConfig};
use pipeline::{BatchWriter, Enricher, SyncRunner, WorkerPool, WriterConfig};
use telemetry::{init_tracing_from_env, metrics};
use ubersmith::{UbersmithClient, UbersmithConfig};
use zabbix::{ZabbixClient, ZabbixConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    /// Concurrent enrichment workers
    #[serde(default = "default_worker_count")]
    worker_count: usize,

    /// Results per writeback batch
    #[serde(default = "default_batch_size")]
    batch_size: usize,

    /// Seconds between sync runs
    #[serde(default = "default_sync_interval_secs")]
    sync_interval_secs: u64,

    /// Log writes instead of performing them
    #[serde(default)]
    dry_run: bool,

    #[serde(default)]
    notion: NotionConfig,

    #[serde(default)]
    zabbix: ZabbixConfig,

    #[serde(default)]
    ubersmith: UbersmithConfig,

    #[serde(default)]
    db: DbConfig,
}

fn default_worker_count() -> usize {
    5
}

fn default_batch_size() -> usize {
    100
}

fn default_sync_interval_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            batch_size: default_batch_size(),
            sync_interval_secs: default_sync_interval_secs(),
            dry_run: false,
            notion: NotionConfig::default(),
            zabbix: ZabbixConfig::default(),
            ubersmith: UbersmithConfig::default(),
            db: DbConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting gpon-sync v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    let worker_count = NonZeroUsize::new(config.worker_count)
        .context("worker_count must be at least 1")?;
    if config.batch_size == 0 {
        anyhow::bail!("batch_size must be at least 1");
    }
    if config.sync_interval_secs == 0 {
        anyhow::bail!("sync_interval_secs must be at least 1");
    }

    info!(
        workers = worker_count.get(),
        batch_size = config.batch_size,
        interval_secs = config.sync_interval_secs,
        dry_run = config.dry_run,
        "Loaded configuration"
    );

    // Connect to MySQL and fail fast if it is unreachable
    let store = Arc::new(
        MySqlCircuitStore::connect(&config.db)
            .await
            .context("Failed to connect to MySQL")?,
    );
    store.ping().await.context("MySQL ping failed")?;
    info!("MySQL connection: healthy");

    // Upstream clients
    let notion = Arc::new(
        NotionClient::new(config.notion.clone()).context("Failed to create Notion client")?,
    );
    let zabbix = Arc::new(
        ZabbixClient::new(config.zabbix.clone()).context("Failed to create Zabbix client")?,
    );
    let ubersmith = Arc::new(
        UbersmithClient::new(config.ubersmith.clone())
            .context("Failed to create Ubersmith client")?,
    );

    // Pipeline
    let enricher = Arc::new(Enricher::new(notion, ubersmith, zabbix.clone()));
    let pool = WorkerPool::new(worker_count, enricher);
    let writer = BatchWriter::new(
        store.clone(),
        WriterConfig {
            batch_size: config.batch_size,
            dry_run: config.dry_run,
        },
    );
    let runner = SyncRunner::new(store, pool, writer);

    // Run immediately, then on the interval. The first tick of a tokio
    // interval fires at once, so a plain ticker gives us both.
    let mut ticker = tokio::time::interval(Duration::from_secs(config.sync_interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&runner, &zabbix).await;
            }
            _ = shutdown_signal() => {
                break;
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// One scheduled run. Errors are logged and swallowed so the loop survives
/// an unreachable upstream.
async fn run_cycle(runner: &SyncRunner, zabbix: &ZabbixClient) {
    // Sessions expire between runs; re-authenticate each time
    if let Err(e) = zabbix.authenticate().await {
        error!("Zabbix authentication failed, skipping run: {}", e);
        return;
    }

    match runner.run_once().await {
        Ok(_) => {
            let snapshot = metrics().take_snapshot();
            info!(
                processed = snapshot.circuits_processed,
                succeeded = snapshot.circuits_succeeded,
                failed = snapshot.circuits_failed,
                network_failures = snapshot.network_lookup_failures,
                service_failures = snapshot.service_lookup_failures,
                optical_failures = snapshot.optical_lookup_failures,
                batches = snapshot.batches_written,
                batch_failures = snapshot.batch_write_failures,
                "sync run metrics"
            );
        }
        Err(e) => {
            metrics().take_snapshot();
            error!("Sync run failed: {}", e);
        }
    }
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("GPON")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested sections. The config crate's nested
    // parsing doesn't work reliably with underscored field names.
    if let Ok(key) = std::env::var("GPON_NOTION_API_KEY") {
        config.notion.api_key = key;
    }
    if let Ok(id) = std::env::var("GPON_NOTION_DATABASE_ID") {
        config.notion.database_id = id;
    }
    if let Ok(url) = std::env::var("GPON_ZABBIX_URL") {
        config.zabbix.url = url;
    }
    if let Ok(user) = std::env::var("GPON_ZABBIX_USERNAME") {
        config.zabbix.username = user;
    }
    if let Ok(pass) = std::env::var("GPON_ZABBIX_PASSWORD") {
        config.zabbix.password = pass;
    }
    if let Ok(url) = std::env::var("GPON_UBERSMITH_BASE_URL") {
        config.ubersmith.base_url = url;
    }
    if let Ok(user) = std::env::var("GPON_UBERSMITH_USERNAME") {
        config.ubersmith.username = user;
    }
    if let Ok(pass) = std::env::var("GPON_UBERSMITH_PASSWORD") {
        config.ubersmith.password = pass;
    }
    if let Ok(url) = std::env::var("GPON_DB_URL") {
        config.db.url = url;
    }

    if config.notion.api_key.is_empty() {
        warn!("Notion API key is empty, network-info lookups will fail");
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
