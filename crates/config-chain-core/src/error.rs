//! Error types for configuration resolution
//!
//! Only two things can go wrong from a caller's point of view: a source
//! cannot be set up, or a value the caller required is absent. Failures of
//! the remote secret store never show up here; they degrade to absence
//! inside the source itself.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by sources and the configuration facade
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required key was absent from every source in the chain
    #[error("{key} not found in configuration")]
    Missing {
        key: String,
    },

    /// A properties file could not be opened or read
    #[error("Failed to read properties file {path}: {source}")]
    PropertiesIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A properties file contained an invalid escape sequence
    #[error("Malformed properties in {path} at line {line}: {reason}")]
    PropertiesSyntax {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Any other construction-time failure of a source
    #[error("Failed to set up {source_name} source: {reason}")]
    Setup {
        source_name: String,
        reason: String,
    },
}

impl ConfigError {
    /// Create a missing-value error for `key`
    pub fn missing(key: impl Into<String>) -> Self {
        ConfigError::Missing { key: key.into() }
    }

    /// Create a setup error
    pub fn setup(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Setup {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Returns the key for a missing-value error
    pub fn missing_key(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { key } => Some(key),
            _ => None,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
