//! Error types for the IPv6 probe engine
//!
//! Only registry-level failures are errors. Probe failures are data and
//! never travel through this type.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the IPv6 probe engine
#[derive(Error, Debug)]
pub enum Error {
    /// Registry store errors (unreadable or unwritable backing store)
    #[error("Registry store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a registry store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the backing store could not be read or written
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
