//! Ubersmith billing adapter: resolves PPPoE credentials and VLAN for a CID.

pub mod client;
pub mod config;
pub mod sniff;

pub use client::UbersmithClient;
pub use config::UbersmithConfig;
