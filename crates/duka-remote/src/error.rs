//! # Remote Error Types
//!
//! Error types for classifier and webhook operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  MalformedResponse      │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  SchemaViolation        │ │
//! │  │  NotConfigured  │  │  HttpStatus     │  │  SerializationFailed    │ │
//! │  │  Load/Save      │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are retried. The classifier folds every variant into the
//! generic fallback notice; the sink turns them into a "saved locally only"
//! warning.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::url_host;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Every way a call to an external collaborator can fail.
#[derive(Debug, Error)]
pub enum RemoteError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid remote configuration.
    #[error("Invalid remote configuration: {0}")]
    InvalidConfig(String),

    /// Invalid endpoint or webhook URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// The collaborator has no endpoint or credentials configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the remote host.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// No answer within the configured window.
    #[error("Request timed out after {} seconds", .0.as_secs_f64())]
    Timeout(Duration),

    /// The remote answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// The response could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The response decoded but does not match the expected shape.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Failed to serialize a request body.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            RemoteError::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            RemoteError::InvalidUrl(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::HttpStatus {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            RemoteError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for RemoteError {
    fn from(err: url::ParseError) -> Self {
        RemoteError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(err: std::io::Error) -> Self {
        RemoteError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for RemoteError {
    fn from(err: toml::de::Error) -> Self {
        RemoteError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for RemoteError {
    fn from(err: toml::ser::Error) -> Self {
        RemoteError::ConfigSaveFailed(err.to_string())
    }
}

/// Maps a failed request to an error naming the endpoint's host.
pub(crate) fn request_error(endpoint: &Url, timeout: Duration, err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::Timeout(timeout);
    }
    if err.is_connect() {
        return RemoteError::ConnectionFailed(format!("cannot reach {}", url_host(endpoint)));
    }
    RemoteError::from(err)
}

// =============================================================================
// Error Categorization
// =============================================================================

impl RemoteError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RemoteError::InvalidConfig(_)
                | RemoteError::InvalidUrl(_)
                | RemoteError::ConfigLoadFailed(_)
                | RemoteError::ConfigSaveFailed(_)
                | RemoteError::NotConfigured(_)
        )
    }

    /// Returns true if the request never produced a usable HTTP exchange.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            RemoteError::ConnectionFailed(_) | RemoteError::Timeout(_) | RemoteError::HttpStatus { .. }
        )
    }

    /// Returns true if the remote answered with something we cannot use.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            RemoteError::MalformedResponse(_)
                | RemoteError::SchemaViolation(_)
                | RemoteError::SerializationFailed(_)
        )
    }
}
