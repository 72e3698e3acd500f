//! Error types for health-submit

use crate::status::Stage;
use thiserror::Error;

/// Errors that abort a run
///
/// Business-level rejections (identity already bound, form already submitted)
/// are not errors; they are recorded in [`crate::status::SubmitStatus`].
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure: connection, timeout, TLS
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload was not valid base64
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Response parsed but lacks a field the workflow needs
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Endpoint path that produced the response
        endpoint: String,
        /// What was missing or wrong
        reason: String,
    },

    /// Status advanced out of step order
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Stage the status was in
        from: Stage,
        /// Stage that was requested
        to: Stage,
    },

    /// Configuration file missing or invalid
    #[error("config error: {0}")]
    Config(String),

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for health-submit
pub type Result<T> = std::result::Result<T, Error>;
