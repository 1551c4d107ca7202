//! # Plinth Kernel Errors
//!
//! Top-level error type aggregating the subsystem errors a host can see
//! during bootstrap and boot.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::plugin_system::error::PluginSystemError;

/// Custom error type for the plinth host
#[derive(Debug, ThisError)]
pub enum Error {
    /// Typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// I/O error with operation context
    #[error("I/O error during '{operation}' on '{}': {source}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Helper to create an Io error with context
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::Io {
            operation: operation.into(),
            path,
            source,
        }
    }
}
