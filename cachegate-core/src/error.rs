//! # cachegate Error Types
//!
//! Centralized error handling for the cachegate core library.

use thiserror::Error;

/// Result type alias for cachegate operations
pub type Result<T> = std::result::Result<T, CacheGateError>;

/// Core error types for cachegate
#[derive(Error, Debug)]
pub enum CacheGateError {
    /// Malformed request or configuration, detected before any I/O
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Store read/write failure, propagated from the hash store
    #[error("Store error: {0}")]
    Store(String),

    /// Backing source load failure; the in-flight query is aborted
    /// without any cache write-back
    #[error("Source error: {0}")]
    Source(String),

    /// Encode/decode failure on a cached or loaded value
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CacheGateError {
    /// Create a new configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a new source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a new generic/other error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CacheGateError::configuration("namespace is empty");
        assert_eq!(err.to_string(), "Configuration error: namespace is empty");

        let err = CacheGateError::source("db offline");
        assert_eq!(err.to_string(), "Source error: db offline");
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_slice::<u64>(b"not-json").unwrap_err();
        let err: CacheGateError = parse_err.into();
        assert!(matches!(err, CacheGateError::Serialization(_)));
    }
}
