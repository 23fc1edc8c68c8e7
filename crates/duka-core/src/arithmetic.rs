//! # Arithmetic Module
//!
//! Line totals, transaction totals and settlement against cash tendered.
//!
//! ## Plain Floating Point
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AMOUNTS ARE f64                                                        │
//! │                                                                         │
//! │  Quantities may be fractional (1.5 kg of sugar) and prices are typed   │
//! │  by the operator, so every amount is a plain f64:                       │
//! │                                                                         │
//! │    0.1 × 3 = 0.30000000000000004   ← accepted                          │
//! │                                                                         │
//! │  Rounding happens ONLY for display (2 decimals). Stored totals keep    │
//! │  the full f64 value.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Settlement
//! ```text
//!   total 220, tendered 250  ──►  change 30, credit  0
//!   total 220, tendered 200  ──►  change  0, credit 20
//!   total 220, tendered 220  ──►  change  0, credit  0
//! ```
//!
//! ## Usage
//! ```rust
//! use duka_core::arithmetic::{line_total, settle};
//!
//! assert_eq!(line_total(2.0, 50.0), 100.0);
//! assert_eq!(settle(220.0, 200.0).credit_due, 20.0);
//! ```

use crate::types::Settlement;

/// Anything with a quantity and a unit price.
///
/// Implemented by draft lines so that totals are always derived, never
/// stored.
pub trait LineAmount {
    fn quantity(&self) -> f64;
    fn unit_price(&self) -> f64;

    /// quantity × unit_price
    fn line_total(&self) -> f64 {
        line_total(self.quantity(), self.unit_price())
    }
}

/// Total of one line. No validation of sign or zero.
#[inline]
pub fn line_total(quantity: f64, unit_price: f64) -> f64 {
    quantity * unit_price
}

/// Sum of every line's total; `0.0` for no lines.
pub fn transaction_total<'a, L, I>(lines: I) -> f64
where
    L: LineAmount + 'a,
    I: IntoIterator<Item = &'a L>,
{
    lines.into_iter().map(LineAmount::line_total).sum()
}

/// Settles `total` against the amount tendered.
///
/// At most one of `change_given` / `credit_due` is positive.
pub fn settle(total: f64, tendered: f64) -> Settlement {
    if tendered > total {
        Settlement {
            change_given: tendered - total,
            credit_due: 0.0,
        }
    } else if total > tendered {
        Settlement {
            change_given: 0.0,
            credit_due: total - tendered,
        }
    } else {
        Settlement::default()
    }
}

/// Rounds to two decimals for display.
pub fn round_for_display(amount: f64) -> f64 {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionLine;

    #[test]
    fn test_line_total_is_plain_product() {
        assert_eq!(line_total(2.0, 50.0), 100.0);
        assert_eq!(line_total(0.0, 50.0), 0.0);
        assert_eq!(line_total(-1.0, 50.0), -50.0);
        assert_eq!(line_total(1.5, -2.0), -3.0);
    }

    #[test]
    fn test_transaction_total() {
        let empty: Vec<TransactionLine> = Vec::new();
        assert_eq!(transaction_total(&empty), 0.0);

        let lines = vec![
            TransactionLine::new("Bread", 2.0, 50.0),
            TransactionLine::new("Milk", 1.0, 120.0),
        ];
        assert_eq!(transaction_total(&lines), 220.0);
    }

    #[test]
    fn test_settle_credit_due() {
        let s = settle(220.0, 200.0);
        assert_eq!(s.change_given, 0.0);
        assert_eq!(s.credit_due, 20.0);
    }

    #[test]
    fn test_settle_change_given() {
        let s = settle(220.0, 250.0);
        assert_eq!(s.change_given, 30.0);
        assert_eq!(s.credit_due, 0.0);
    }

    #[test]
    fn test_settle_exact_and_never_both_positive() {
        assert_eq!(settle(220.0, 220.0), Settlement::default());

        for (total, tendered) in [(0.0, 5.0), (5.0, 0.0), (-3.0, 1.0), (10.5, 10.25)] {
            let s = settle(total, tendered);
            assert!(!(s.change_given > 0.0 && s.credit_due > 0.0));
            assert!(s.change_given >= 0.0 && s.credit_due >= 0.0);
        }
    }

    #[test]
    fn test_round_for_display() {
        assert_eq!(round_for_display(0.1 * 3.0), 0.3);
        assert_eq!(round_for_display(1234.5), 1234.5);
        assert_eq!(round_for_display(2.675_1), 2.68);
        assert!(round_for_display(-0.001).is_sign_positive());
    }
}
