//! Domain types, ports, and error model for the circuit sync worker.

pub mod circuit;
pub mod error;
pub mod ports;

pub use circuit::*;
pub use error::{EnrichErrors, Error, LookupError, Port, Result};
pub use ports::*;
