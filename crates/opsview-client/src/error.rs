//! Opsview client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Opsview API
#[derive(Debug, Error)]
pub enum OpsviewError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Opsview API returned an error
    #[error("Opsview API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (bad credentials, expired token, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client could not be configured (bad endpoint, unreadable CA bundle)
    #[error("Client configuration error: {0}")]
    Configuration(String),
}
