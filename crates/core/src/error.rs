//! Error types for Arkaios.

use thiserror::Error;

/// Result type alias using Arkaios' Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Arkaios.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Backend Errors (recovered by falling through to the next tier)
    // =========================================================================
    #[error("Backend {backend} unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    #[error("Malformed response from {backend}: {reason}")]
    MalformedResponse { backend: String, reason: String },

    // =========================================================================
    // Caller Errors
    // =========================================================================
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    #[error("All backends failed: {0}")]
    AllBackendsFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Gateway / Identity Errors
    // =========================================================================
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a backend-unavailable error.
    pub fn backend_unavailable(backend: impl ToString, reason: impl ToString) -> Self {
        Self::BackendUnavailable {
            backend: backend.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(backend: impl ToString, reason: impl ToString) -> Self {
        Self::MalformedResponse {
            backend: backend.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a gateway error.
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Create an identity error.
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether a tiered read/write should log this and move on to the next backend.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable { .. } | Self::MalformedResponse { .. } | Self::Storage(_)
        )
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::backend_unavailable("redis", "connection refused").is_recoverable());
        assert!(Error::malformed("rest-kv", "expected object").is_recoverable());
        assert!(!Error::validation("Missing userId").is_recoverable());
        assert!(!Error::AllBackendsFailed("k".into()).is_recoverable());
    }

    #[test]
    fn test_display_includes_backend() {
        let err = Error::backend_unavailable("rest-kv", "HTTP 503");
        assert_eq!(err.to_string(), "Backend rest-kv unavailable: HTTP 503");
    }
}
