//! Error model for the sync worker.
//!
//! Three kinds of failure, matching how the run treats them:
//! - `LookupError`: one upstream lookup failed; recovered per circuit and
//!   accumulated on the result, never fatal.
//! - `Error::Store`: the circuit store failed; fatal when fetching the run's
//!   input, logged-and-continue when writing a batch.
//! - `Error::Config`: bad or missing settings; fatal at startup.

use std::fmt;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// The upstream capability a lookup failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    NetworkInfo,
    ServiceDetail,
    OpticalInfo,
}

impl Port {
    /// Provenance tag used in accumulated error lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NetworkInfo => "network-info",
            Self::ServiceDetail => "service-detail",
            Self::OpticalInfo => "optical-info",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A failed upstream lookup, tagged with the port that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{port} error: {message}")]
pub struct LookupError {
    pub port: Port,
    pub message: String,
}

impl LookupError {
    pub fn new(port: Port, message: impl Into<String>) -> Self {
        Self {
            port,
            message: message.into(),
        }
    }
}

/// Lookup failures accumulated for a single circuit.
///
/// Keeps every tagged cause, not just the first, so one log line shows the
/// full failure picture for the circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichErrors(Vec<LookupError>);

impl EnrichErrors {
    pub fn push(&mut self, err: LookupError) {
        self.0.push(err);
    }

    /// Records a failure under the given port's tag.
    pub fn record(&mut self, port: Port, err: impl fmt::Display) {
        self.0.push(LookupError::new(port, err.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LookupError> {
        self.0.iter()
    }

    /// True when a failure from the given port was recorded.
    pub fn from_port(&self, port: Port) -> bool {
        self.0.iter().any(|e| e.port == port)
    }
}

impl fmt::Display for EnrichErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// Unified error type for the sync worker.
#[derive(Debug, Error)]
pub enum Error {
    /// An upstream lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The circuit store failed to fetch or write.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration is missing or invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a tagged lookup error.
    pub fn lookup(port: Port, msg: impl Into<String>) -> Self {
        Self::Lookup(LookupError::new(port, msg))
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Flattens into a tagged lookup failure, tagging untagged causes with
    /// the given port.
    pub fn into_lookup(self, fallback_port: Port) -> LookupError {
        match self {
            Self::Lookup(err) => err,
            other => LookupError::new(fallback_port, other.to_string()),
        }
    }
}
