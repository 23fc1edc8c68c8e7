//! # duka-core: Pure Business Logic for Duka POS
//!
//! This crate holds the transaction ledger and settlement calculator as pure
//! functions and plain data. It performs no I/O and never reads the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    duka-terminal (apps/terminal)                │   │
//! │  │    shell ──► commands ──► state (Checkout, Ledger, Busy)        │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼────────────────────┐  │
//! │  │  ★ duka-core (THIS CRATE) ★     │  │  duka-remote                │  │
//! │  │                                 │  │  IntentClassifier (LLM)     │  │
//! │  │  arithmetic  draft  ledger      │  │  PersistenceSink (webhook)  │  │
//! │  │  types       validation  error  │◄─┤  builds on core types       │  │
//! │  │                                 │  └─────────────────────────────┘  │
//! │  │  NO I/O • NO NETWORK • NO CLOCK │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (TransactionLine, Sale, Intent, ...)
//! - [`arithmetic`] - Line totals and settlement
//! - [`draft`] - The editable transaction
//! - [`ledger`] - Append-only committed sales and queries
//! - [`validation`] - Lenient number parsing, strict date parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use duka_core::{settle, Draft, Ledger};
//!
//! let mut draft = Draft::new();
//! draft.add_line(Some("Bread"), 2.0, 50.0);
//! draft.add_line(Some("Milk"), 1.0, 120.0);
//!
//! let now = NaiveDate::from_ymd_opt(2024, 5, 10)
//!     .unwrap()
//!     .and_hms_opt(9, 30, 0)
//!     .unwrap();
//!
//! let mut ledger = Ledger::new();
//! let sales = ledger.commit(&draft, now);
//!
//! assert_eq!(sales.len(), 2);
//! assert_eq!(ledger.total_on(now.date()), 220.0);
//! assert_eq!(settle(220.0, 200.0).credit_due, 20.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod arithmetic;
pub mod draft;
pub mod error;
pub mod ledger;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use arithmetic::{line_total, round_for_display, settle, transaction_total, LineAmount};
pub use draft::{Draft, DraftField};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::Ledger;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Notice shown when the intent classifier cannot produce a usable answer.
pub const CLASSIFIER_FALLBACK_TEXT: &str =
    "Sorry, I'm having trouble understanding. Could you please try rephrasing?";
