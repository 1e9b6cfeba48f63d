//! Error types for geocluster.
//!
//! The hot path (insert, materialize, pick) is infallible by contract;
//! errors only surface from configuration handling.

use thiserror::Error;

/// Errors returned by geocluster operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input value outside its documented domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

/// Result type alias using [`ClusterError`].
pub type Result<T> = std::result::Result<T, ClusterError>;

impl From<serde_json::Error> for ClusterError {
    fn from(err: serde_json::Error) -> Self {
        ClusterError::ConfigParse(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ClusterError {
    fn from(err: toml::de::Error) -> Self {
        ClusterError::ConfigParse(err.to_string())
    }
}
