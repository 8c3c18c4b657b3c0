//! Notion adapter for the network-info port.
//!
//! The circuit inventory lives in a hand-maintained Notion database; this
//! adapter resolves a CID to the OLT host and ONT address recorded there.

pub mod client;
pub mod config;
mod parse;

pub use client::NotionClient;
pub use config::NotionConfig;
