//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Duka POS                               │
//! │                                                                         │
//! │  Shell                       Commands                                   │
//! │  ─────                       ────────                                   │
//! │                                                                         │
//! │  > set 4 qty 2                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Core Error? ─── CoreError::LineNotFound ─────────┐             │  │
//! │  │         │                                         │             │  │
//! │  │         ▼                                         ▼             │  │
//! │  │  Remote Error? ─── RemoteError::InvalidUrl ──── ApiError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  ! No draft line at position 4 (draft has 3 lines)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Classifier and webhook failures normally never reach this type: the
//! classifier folds them into a fallback reply and the sink reports them as
//! a "saved locally only" outcome.

use rustyline::error::ReadlineError;
use serde::Serialize;
use thiserror::Error;

use duka_core::{CoreError, ValidationError};
use duka_remote::RemoteError;

/// Error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CREDIT_DUE",
///   "message": "Customer still owes KES 20.00"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Draft line does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// A classifier or record call is already in flight
    Busy,

    /// Sale refused while the customer still owes money
    CreditDue,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a busy error naming the operation in flight.
    pub fn busy(operation: &str) -> Self {
        ApiError::new(
            ErrorCode::Busy,
            format!("{operation} is already in progress, please wait"),
        )
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            e @ CoreError::LineNotFound { .. } => ApiError::new(ErrorCode::NotFound, e.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts remote errors to API errors.
impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        if err.is_config_error() {
            ApiError::validation(err.to_string())
        } else {
            tracing::error!("Remote call failed: {}", err);
            ApiError::internal(err.to_string())
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Errors that end the shell itself, as opposed to a single command.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Terminal error: {0}")]
    Readline(#[from] ReadlineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote setup failed: {0}")]
    Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::LineNotFound { position: 4, len: 3 }.into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.contains("position 4"));

        let err: ApiError = ValidationError::Required {
            field: "text".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_remote_error_mapping() {
        let err: ApiError = RemoteError::InvalidUrl("nope".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err: ApiError = RemoteError::ConnectionFailed("down".into()).into();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(ApiError::busy("Recording")).unwrap();
        assert_eq!(json["code"], "BUSY");
        assert_eq!(json["message"], "Recording is already in progress, please wait");
    }
}
