//! # Error Types
//!
//! Domain-specific error types for duka-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  duka-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  duka-remote errors (separate crate)                                   │
//! │  └── RemoteError      - Classifier / webhook failures                  │
//! │                                                                         │
//! │  Terminal app errors                                                   │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Shell                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT An Error Here
//! Unparsable quantities and prices typed into a draft line are coerced to
//! zero (see [`crate::validation::parse_lenient_number`]). Committing an
//! empty draft records nothing and returns no sales. Neither path produces
//! an error value.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No draft line exists at the given position.
    ///
    /// ## When This Occurs
    /// - The operator refers to line 4 of a three-line draft
    /// - The draft was cleared between listing and editing
    #[error("No draft line at position {position} (draft has {len} lines)")]
    LineNotFound { position: usize, len: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These only guard structural inputs (dates, month keys, field names).
/// Business values such as quantities are never rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., invalid date, invalid month key).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
