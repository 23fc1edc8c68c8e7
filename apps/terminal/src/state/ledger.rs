//! # Ledger State
//!
//! Shared handle to the in-memory sales ledger.
//!
//! Reads (summaries, today's log) are far more common than commits, so the
//! ledger sits behind an `RwLock` rather than the `Mutex` used for the
//! checkout.

use std::sync::{Arc, PoisonError, RwLock};

use duka_core::Ledger;

#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    ledger: Arc<RwLock<Ledger>>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the ledger.
    pub fn with_ledger<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Ledger) -> R,
    {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        f(&ledger)
    }

    /// Executes a function with write access to the ledger.
    pub fn with_ledger_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Ledger) -> R,
    {
        let mut ledger = self.ledger.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut ledger)
    }
}
