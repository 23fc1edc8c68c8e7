//! # Checkout State
//!
//! Holds the draft being built at the counter together with the cash the
//! customer handed over.
//!
//! ## Thread Safety
//! The checkout is wrapped in `Arc<Mutex<T>>`: the shell and the assistant
//! both edit it, and every edit is short. The lock is never held across an
//! `.await`.
//!
//! ## Checkout Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Operations                                  │
//! │                                                                         │
//! │  Shell Input              Command                 Checkout Change       │
//! │  ───────────              ───────                 ───────────────       │
//! │                                                                         │
//! │  add Bread 2 50 ─────────► add_line() ──────────► draft.lines.push     │
//! │                                                                         │
//! │  set 1 qty 3 ────────────► update_line() ───────► lines[0].qty = 3     │
//! │                                                                         │
//! │  rm 1 ───────────────────► remove_line() ───────► lines.remove(0)      │
//! │                                                                         │
//! │  tender 250 ─────────────► set_tendered() ──────► tendered = 250       │
//! │                                                                         │
//! │  record ─────────────────► record_sale() ───────► clear()              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use duka_core::{settle, Draft, Settlement};

/// A draft plus the amount tendered against it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub draft: Draft,

    /// Cash handed over, already leniently parsed
    pub tendered: f64,
}

impl Checkout {
    pub fn new() -> Self {
        Checkout::default()
    }

    /// Sum of the draft's line totals.
    pub fn total(&self) -> f64 {
        self.draft.total()
    }

    /// Change or credit for the current total and tendered amount.
    pub fn settlement(&self) -> Settlement {
        settle(self.total(), self.tendered)
    }

    /// Empties the draft, forgets the buyer and resets the tendered cash.
    pub fn clear(&mut self) {
        self.draft.clear();
        self.tendered = 0.0;
    }
}

/// Shared checkout state.
#[derive(Debug, Clone, Default)]
pub struct DraftState {
    checkout: Arc<Mutex<Checkout>>,
}

impl DraftState {
    /// Creates a state with an empty checkout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the checkout.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = draft_state.with_checkout(|checkout| checkout.total());
    /// ```
    pub fn with_checkout<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Checkout) -> R,
    {
        let checkout = self.checkout.lock().unwrap_or_else(PoisonError::into_inner);
        f(&checkout)
    }

    /// Executes a function with write access to the checkout.
    pub fn with_checkout_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Checkout) -> R,
    {
        let mut checkout = self.checkout.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut checkout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_settlement() {
        let mut checkout = Checkout::new();
        checkout.draft.add_line(Some("Bread"), 2.0, 50.0);
        checkout.draft.add_line(Some("Milk"), 1.0, 120.0);

        checkout.tendered = 200.0;
        assert_eq!(checkout.total(), 220.0);
        assert_eq!(checkout.settlement().credit_due, 20.0);

        checkout.tendered = 250.0;
        assert_eq!(checkout.settlement().change_given, 30.0);
        assert!(checkout.settlement().is_fully_paid());
    }

    #[test]
    fn test_clear_resets_tendered_and_buyer() {
        let mut checkout = Checkout::new();
        checkout.draft.add_line(Some("Sugar"), 1.0, 180.0);
        checkout.draft.set_customer_name("Otieno");
        checkout.tendered = 500.0;

        checkout.clear();

        assert!(checkout.draft.is_empty());
        assert!(checkout.draft.buyer().is_empty());
        assert_eq!(checkout.tendered, 0.0);
    }

    #[test]
    fn test_state_is_shared_between_clones() {
        let state = DraftState::new();
        let other = state.clone();

        state.with_checkout_mut(|c| {
            c.draft.add_blank_line();
        });

        assert_eq!(other.with_checkout(|c| c.draft.len()), 1);
    }
}
