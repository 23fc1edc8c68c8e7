//! # Commands Module
//!
//! Everything the shell can ask of the application.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── draft.rs      ◄─── Line edits, buyer details, cash tendered
//! ├── sale.rs       ◄─── Commit to ledger, forward to sink, today's log
//! ├── summary.rs    ◄─── Daily / monthly totals
//! └── assistant.rs  ◄─── Free text through the intent classifier
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the checkout
//! fn get_draft(draft: &DraftState) -> DraftResponse
//!
//! // Reads the ledger, dated by the clock
//! fn summary(ledger: &LedgerState, config: &ConfigState, clock: &dyn Clock, period: SummaryPeriod)
//!
//! // Touches everything, gated by its own busy flag
//! async fn record_sale(draft, ledger, config, remote, clock, busy)
//! ```
//!
//! Responses derive `Serialize` (camelCase) so a non-terminal front end can
//! reuse them as-is.

pub mod assistant;
pub mod draft;
pub mod sale;
pub mod summary;
