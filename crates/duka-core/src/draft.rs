//! # Transaction Draft
//!
//! The mutable, not-yet-committed set of lines plus buyer details.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Draft Lifecycle                                  │
//! │                                                                         │
//! │  1. ADD            2. EDIT              3. COMMIT          4. RESET     │
//! │  ┌─────────┐      ┌─────────────┐      ┌───────────┐      ┌─────────┐  │
//! │  │ blank   │ ───► │ name / qty  │ ───► │ Ledger::  │ ───► │ clear() │  │
//! │  │ or from │      │ / price     │      │ commit()  │      │         │  │
//! │  │ text    │      │ (lenient)   │      └───────────┘      └─────────┘  │
//! │  └─────────┘      └─────────────┘                                      │
//! │                                                                         │
//! │  The draft never touches the ledger itself; the caller commits it.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Leniency
//! Nothing typed into a draft is ever rejected. Numeric fields that fail to
//! parse become `0`; item names are stored verbatim, empty included.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::arithmetic;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{BuyerDetails, LineId, ParsedSaleLine, TransactionLine};
use crate::validation::parse_lenient_number;

// =============================================================================
// Editable Fields
// =============================================================================

/// A field of a draft line that the operator can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    ItemName,
    Quantity,
    UnitPrice,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftField::ItemName => write!(f, "itemName"),
            DraftField::Quantity => write!(f, "quantity"),
            DraftField::UnitPrice => write!(f, "unitPrice"),
        }
    }
}

impl FromStr for DraftField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "itemName" | "item_name" | "name" | "item" => Ok(DraftField::ItemName),
            "quantity" | "qty" => Ok(DraftField::Quantity),
            "unitPrice" | "unit_price" | "price" => Ok(DraftField::UnitPrice),
            _ => Err(ValidationError::NotAllowed {
                field: "field".to_string(),
                allowed: vec![
                    "itemName".to_string(),
                    "quantity".to_string(),
                    "unitPrice".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Draft
// =============================================================================

/// The transaction currently being entered.
///
/// ## Invariants
/// - Line ids are unique within the draft
/// - Insertion order is preserved; it becomes commit order
/// - No line stores a total
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    lines: Vec<TransactionLine>,
    buyer: BuyerDetails,
}

impl Draft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Draft::default()
    }

    /// Appends a line and returns its id.
    ///
    /// `None` for the name gives an empty name; callers wanting the blank
    /// "add item" line pass `(None, 1.0, 0.0)`.
    pub fn add_line(&mut self, item_name: Option<&str>, quantity: f64, unit_price: f64) -> LineId {
        let line = TransactionLine::new(item_name.unwrap_or_default(), quantity, unit_price);
        let id = line.id;
        self.lines.push(line);
        id
    }

    /// Appends the blank line: empty name, quantity 1, price 0.
    pub fn add_blank_line(&mut self) -> LineId {
        let line = TransactionLine::blank();
        let id = line.id;
        self.lines.push(line);
        id
    }

    /// Appends a fully populated line from classifier-extracted sale data.
    ///
    /// The parsed date is not kept: a sale is always dated by its commit.
    pub fn add_parsed_line(&mut self, parsed: &ParsedSaleLine) -> LineId {
        self.add_line(Some(&parsed.item_name), parsed.quantity, parsed.unit_price)
    }

    /// Edits one field of a line.
    ///
    /// Returns `false` (and changes nothing) when no line has this id.
    pub fn update_line(&mut self, id: &LineId, field: DraftField, raw_value: &str) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == *id) else {
            return false;
        };

        match field {
            DraftField::ItemName => line.item_name = raw_value.to_string(),
            DraftField::Quantity => line.quantity = parse_lenient_number(raw_value),
            DraftField::UnitPrice => line.unit_price = parse_lenient_number(raw_value),
        }
        true
    }

    /// Removes a line. Returns `false` when no line has this id.
    pub fn remove_line(&mut self, id: &LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != *id);
        self.lines.len() != before
    }

    /// Empties lines and buyer details.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.buyer = BuyerDetails::default();
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) {
        self.buyer.customer_name = name.into();
    }

    pub fn set_customer_email(&mut self, email: impl Into<String>) {
        self.buyer.customer_email = email.into();
    }

    pub fn buyer(&self) -> &BuyerDetails {
        &self.buyer
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[TransactionLine] {
        &self.lines
    }

    pub fn line(&self, id: &LineId) -> Option<&TransactionLine> {
        self.lines.iter().find(|l| l.id == *id)
    }

    /// Resolves a 1-based display position to a line id.
    pub fn line_id_at(&self, position: usize) -> CoreResult<LineId> {
        position
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(|line| line.id)
            .ok_or(CoreError::LineNotFound {
                position,
                len: self.lines.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Derived total of all lines.
    pub fn total(&self) -> f64 {
        arithmetic::transaction_total(&self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_add_blank_line() {
        let mut draft = Draft::new();
        let id = draft.add_blank_line();

        let line = draft.line(&id).unwrap();
        assert_eq!(line.item_name, "");
        assert_eq!(line.quantity, 1.0);
        assert_eq!(line.unit_price, 0.0);
        assert_eq!(draft.total(), 0.0);
    }

    #[test]
    fn test_add_line_and_total() {
        let mut draft = Draft::new();
        draft.add_line(Some("Bread"), 2.0, 50.0);
        draft.add_line(Some("Milk"), 1.0, 120.0);

        assert_eq!(draft.len(), 2);
        assert_eq!(draft.total(), 220.0);
        assert_eq!(draft.lines()[0].item_name, "Bread");
    }

    #[test]
    fn test_add_parsed_line() {
        let mut draft = Draft::new();
        let parsed = ParsedSaleLine {
            date: NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
            item_name: "Sugar".to_string(),
            quantity: 1.5,
            unit_price: 200.0,
        };
        let id = draft.add_parsed_line(&parsed);

        let line = draft.line(&id).unwrap();
        assert_eq!(line.item_name, "Sugar");
        assert_eq!(line.quantity, 1.5);
        assert_eq!(draft.total(), 300.0);
    }

    #[test]
    fn test_update_quantity_garbage_becomes_zero() {
        let mut draft = Draft::new();
        let id = draft.add_line(Some("Bread"), 2.0, 50.0);

        assert!(draft.update_line(&id, DraftField::Quantity, "abc"));
        assert_eq!(draft.line(&id).unwrap().quantity, 0.0);
        assert_eq!(draft.total(), 0.0);
    }

    #[test]
    fn test_update_fields() {
        let mut draft = Draft::new();
        let id = draft.add_blank_line();

        draft.update_line(&id, DraftField::ItemName, "  Eggs ");
        draft.update_line(&id, DraftField::Quantity, "12");
        draft.update_line(&id, DraftField::UnitPrice, "15.5/=");

        let line = draft.line(&id).unwrap();
        assert_eq!(line.item_name, "  Eggs ");
        assert_eq!(line.quantity, 12.0);
        assert_eq!(line.unit_price, 15.5);
    }

    #[test]
    fn test_update_unknown_line_is_noop() {
        let mut draft = Draft::new();
        let id = draft.add_line(Some("Bread"), 2.0, 50.0);
        let before = draft.lines().to_vec();

        assert!(!draft.update_line(&LineId::new(), DraftField::Quantity, "9"));
        assert_eq!(draft.lines(), before.as_slice());
        assert_eq!(draft.line(&id).unwrap().quantity, 2.0);
    }

    #[test]
    fn test_remove_line() {
        let mut draft = Draft::new();
        let bread = draft.add_line(Some("Bread"), 2.0, 50.0);
        draft.add_line(Some("Milk"), 1.0, 120.0);

        assert!(draft.remove_line(&bread));
        assert!(!draft.remove_line(&bread));
        assert_eq!(draft.len(), 1);
        assert_eq!(draft.total(), 120.0);
    }

    #[test]
    fn test_clear_resets_lines_and_buyer() {
        let mut draft = Draft::new();
        draft.add_blank_line();
        draft.set_customer_name("Wanjiku");
        draft.set_customer_email("wanjiku@example.com");

        draft.clear();
        assert!(draft.is_empty());
        assert!(draft.buyer().is_empty());
    }

    #[test]
    fn test_line_id_at_position() {
        let mut draft = Draft::new();
        let first = draft.add_blank_line();
        let second = draft.add_blank_line();

        assert_eq!(draft.line_id_at(1).unwrap(), first);
        assert_eq!(draft.line_id_at(2).unwrap(), second);
        assert!(matches!(
            draft.line_id_at(3),
            Err(CoreError::LineNotFound { position: 3, len: 2 })
        ));
        assert!(draft.line_id_at(0).is_err());
    }

    #[test]
    fn test_draft_field_parsing() {
        assert_eq!("itemName".parse::<DraftField>().unwrap(), DraftField::ItemName);
        assert_eq!("unit_price".parse::<DraftField>().unwrap(), DraftField::UnitPrice);
        assert_eq!("qty".parse::<DraftField>().unwrap(), DraftField::Quantity);
        assert!("colour".parse::<DraftField>().is_err());
    }
}
