//! Error types for jsonlog-extras

use jsonlog_core::ConfigError;
use thiserror::Error;

/// Result type for jsonlog-extras operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while setting up loggers and layers
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration was read but is not valid
    #[error("invalid logging configuration: {0}")]
    Invalid(#[from] ConfigError),

    /// Environment variables could not be deserialized
    #[cfg(feature = "config")]
    #[error("logging configuration error: {0}")]
    Env(#[from] envy::Error),

    /// A `.env` file could not be loaded
    #[cfg(feature = "config")]
    #[error("failed to load {path}: {source}")]
    Dotenv {
        /// File that failed to load
        path: String,
        /// Underlying error
        #[source]
        source: dotenvy::Error,
    },
}
