//! MySQL adapter for the circuit store port.

pub mod config;
pub mod store;

pub use config::DbConfig;
pub use store::MySqlCircuitStore;
