//! Zabbix adapter for the optical-info port.
//!
//! Resolves an OLT host + ONT address to GPON link status and receive
//! power via the Zabbix JSON-RPC API.

pub mod client;
pub mod config;
mod keys;

pub use client::ZabbixClient;
pub use config::ZabbixConfig;
