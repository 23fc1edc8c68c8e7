//! # Domain Types
//!
//! Core domain types used throughout Duka POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   commit   ┌─────────────────┐                     │
//! │  │ TransactionLine │ ─────────► │      Sale       │                     │
//! │  │  ─────────────  │            │  ─────────────  │                     │
//! │  │  id (LineId)    │            │  id (SaleId)    │                     │
//! │  │  item_name      │            │  date           │                     │
//! │  │  quantity       │            │  item_name      │                     │
//! │  │  unit_price     │            │  quantity       │                     │
//! │  │  (no total!)    │            │  unit_price     │                     │
//! │  └─────────────────┘            │  total (frozen) │                     │
//! │        mutable                  └─────────────────┘                     │
//! │                                       immutable                         │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Intent      │   │   Settlement    │   │   YearMonth     │       │
//! │  │  NewSaleLine    │   │  change_given   │   │   2024-05       │       │
//! │  │  SummaryRequest │   │  credit_due     │   │                 │       │
//! │  │  Informational  │   └─────────────────┘   └─────────────────┘       │
//! │  │  Classification │                                                   │
//! │  │    Error        │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `Sale` copies every value out of its draft line at commit time. Nothing
//! in a `Sale` is ever recomputed.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::arithmetic::{self, LineAmount};
use crate::error::ValidationError;
use crate::validation::{parse_year_month, ValidationResult};

// =============================================================================
// Line Identity
// =============================================================================

/// Ephemeral identifier of a draft line.
///
/// Unique within a draft; only meaningful until the line is committed, at
/// which point it becomes part of the [`SaleId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    /// Generates a fresh line id (UUID v4).
    pub fn new() -> Self {
        LineId(Uuid::new_v4())
    }
}

impl Default for LineId {
    fn default() -> Self {
        LineId::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LineId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(LineId)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "line id".to_string(),
                reason: "must be a valid UUID".to_string(),
            })
    }
}

// =============================================================================
// Transaction Line (draft)
// =============================================================================

/// A line of the transaction currently being entered.
///
/// ## Invariants
/// - No stored total: `line_total()` always derives from quantity × price
/// - Any field may hold a "bad" value (empty name, zero or negative
///   quantity); the draft never rejects input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLine {
    pub id: LineId,
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl TransactionLine {
    /// Creates a line with a fresh id.
    pub fn new(item_name: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        TransactionLine {
            id: LineId::new(),
            item_name: item_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Creates a blank line as added by the "add item" button:
    /// empty name, quantity 1, price 0.
    pub fn blank() -> Self {
        TransactionLine::new(String::new(), 1.0, 0.0)
    }
}

impl LineAmount for TransactionLine {
    fn quantity(&self) -> f64 {
        self.quantity
    }

    fn unit_price(&self) -> f64 {
        self.unit_price
    }
}

// =============================================================================
// Buyer Details
// =============================================================================

/// Free-text buyer metadata attached to a draft. Never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDetails {
    pub customer_name: String,
    pub customer_email: String,
}

impl BuyerDetails {
    /// True when neither field has been filled in.
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_empty() && self.customer_email.is_empty()
    }
}

// =============================================================================
// Sale Identity
// =============================================================================

/// Identifier of a committed sale: commit time (ms) plus source line id.
///
/// ## Wire Form
/// `"<millis>-<line uuid>"`, e.g. `1715337000000-67e55044-10b1-426f-9247-bb680e5fe0c8`
///
/// ## Ordering
/// Orders by commit time first, so "most recent" can be read straight off
/// the id without a separate timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SaleId {
    committed_at_ms: i64,
    line_id: LineId,
}

impl SaleId {
    pub fn new(committed_at_ms: i64, line_id: LineId) -> Self {
        SaleId {
            committed_at_ms,
            line_id,
        }
    }

    /// Commit time in milliseconds since the Unix epoch.
    #[inline]
    pub fn committed_at_ms(&self) -> i64 {
        self.committed_at_ms
    }

    /// The draft line this sale was frozen from.
    #[inline]
    pub fn line_id(&self) -> LineId {
        self.line_id
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.committed_at_ms, self.line_id)
    }
}

impl FromStr for SaleId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "sale id".to_string(),
            reason: "expected <millis>-<uuid>".to_string(),
        };

        // a leading '-' belongs to a pre-epoch stamp
        let split = s.get(1..).and_then(|rest| rest.find('-')).map(|i| i + 1);
        let (millis, line) = split.map(|i| (&s[..i], &s[i + 1..])).ok_or_else(invalid)?;
        let committed_at_ms = millis.parse::<i64>().map_err(|_| invalid())?;
        let line_id = line.parse::<LineId>().map_err(|_| invalid())?;

        Ok(SaleId::new(committed_at_ms, line_id))
    }
}

impl TryFrom<String> for SaleId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SaleId> for String {
    fn from(id: SaleId) -> Self {
        id.to_string()
    }
}

// =============================================================================
// Sale (committed)
// =============================================================================

/// A committed sale line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    /// Calendar date of the commit, serialized `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// quantity × unit_price at commit time (frozen).
    pub total: f64,
}

impl Sale {
    /// Freezes a draft line into a sale.
    pub fn freeze(line: &TransactionLine, date: NaiveDate, committed_at_ms: i64) -> Self {
        Sale {
            id: SaleId::new(committed_at_ms, line.id),
            date,
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total: arithmetic::line_total(line.quantity, line.unit_price),
        }
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// Outcome of settling a total against the cash tendered.
///
/// At most one field is non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub change_given: f64,
    pub credit_due: f64,
}

impl Settlement {
    /// True when nothing is owed by the customer.
    #[inline]
    pub fn is_fully_paid(&self) -> bool {
        self.credit_due == 0.0
    }
}

// =============================================================================
// Month Key
// =============================================================================

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month key; `None` when `month` is not in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12)
            .contains(&month)
            .then_some(YearMonth { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// True when `date` falls in this month, i.e. its `YYYY-MM-DD` form
    /// starts with this key.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        let (year, month) = parse_year_month(s)?;
        Ok(YearMonth { year, month })
    }
}

// =============================================================================
// Summary Period
// =============================================================================

/// Aggregation window for a sales summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPeriod {
    Daily,
    Monthly,
}

impl fmt::Display for SummaryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryPeriod::Daily => write!(f, "daily"),
            SummaryPeriod::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for SummaryPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "today" => Ok(SummaryPeriod::Daily),
            "monthly" | "month" => Ok(SummaryPeriod::Monthly),
            _ => Err(ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: vec!["daily".to_string(), "monthly".to_string()],
            }),
        }
    }
}

/// Aggregate answer to a summary request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub period: SummaryPeriod,
    pub total: f64,
    pub sale_count: usize,
}

// =============================================================================
// Intent (classifier output)
// =============================================================================

/// Sale data extracted from free text.
///
/// `date` is already absolute; relative phrasing ("yesterday") is resolved by
/// the classifier, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSaleLine {
    pub date: NaiveDate,
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

/// What the operator meant by a free-text input.
///
/// Exactly one variant is produced per input. Transport or parsing failures
/// are folded into `ClassificationError` by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Add a line to the draft.
    NewSaleLine(ParsedSaleLine),
    /// Report a daily or monthly total.
    SummaryRequest { period: SummaryPeriod },
    /// Friendly reply, no ledger effect.
    InformationalMessage { text: String },
    /// Missing/invalid data explanation, no ledger effect.
    ClassificationError { text: String },
}

impl Intent {
    /// Short tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::NewSaleLine(_) => "new_sale_line",
            Intent::SummaryRequest { .. } => "summary_request",
            Intent::InformationalMessage { .. } => "informational_message",
            Intent::ClassificationError { .. } => "classification_error",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_blank_line_defaults() {
        let line = TransactionLine::blank();
        assert_eq!(line.item_name, "");
        assert_eq!(line.quantity, 1.0);
        assert_eq!(line.unit_price, 0.0);
    }

    #[test]
    fn test_line_ids_are_unique() {
        let a = TransactionLine::blank();
        let b = TransactionLine::blank();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_sale_id_display_and_parse() {
        let line_id = LineId::new();
        let id = SaleId::new(1_715_337_000_000, line_id);
        let text = id.to_string();

        assert!(text.starts_with("1715337000000-"));
        let parsed: SaleId = text.parse().unwrap();
        assert_eq!(parsed, id);

        assert!("nonsense".parse::<SaleId>().is_err());
        assert!("123-not-a-uuid".parse::<SaleId>().is_err());
    }

    #[test]
    fn test_sale_id_with_pre_epoch_stamp() {
        let id = SaleId::new(-1_000, LineId::new());
        let text = id.to_string();
        assert!(text.starts_with("-1000-"));
        assert_eq!(text.parse::<SaleId>().unwrap(), id);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(serde_json::from_str::<SaleId>(&json).unwrap(), id);

        assert!("-".parse::<SaleId>().is_err());
        assert!("".parse::<SaleId>().is_err());
    }

    #[test]
    fn test_sale_id_orders_by_commit_time() {
        let early = SaleId::new(1_000, LineId::new());
        let late = SaleId::new(2_000, LineId::new());
        assert!(late > early);
    }

    #[test]
    fn test_sale_freeze_snapshots_values() {
        let mut line = TransactionLine::new("Bread", 2.0, 50.0);
        let sale = Sale::freeze(&line, date(2024, 5, 10), 42);

        line.quantity = 10.0;

        assert_eq!(sale.total, 100.0);
        assert_eq!(sale.quantity, 2.0);
        assert_eq!(sale.id.line_id(), line.id);
        assert_eq!(sale.id.committed_at_ms(), 42);
    }

    #[test]
    fn test_sale_serializes_camel_case() {
        let line = TransactionLine::new("Milk", 1.0, 120.0);
        let sale = Sale::freeze(&line, date(2024, 5, 10), 7);
        let json = serde_json::to_value(&sale).unwrap();

        assert_eq!(json["date"], "2024-05-10");
        assert_eq!(json["itemName"], "Milk");
        assert_eq!(json["unitPrice"], 120.0);
        assert_eq!(json["id"], format!("7-{}", line.id));
    }

    #[test]
    fn test_year_month_contains() {
        let may: YearMonth = "2024-05".parse().unwrap();
        assert!(may.contains(date(2024, 5, 1)));
        assert!(may.contains(date(2024, 5, 31)));
        assert!(!may.contains(date(2024, 4, 30)));
        assert!(!may.contains(date(2024, 6, 1)));
        assert!(!may.contains(date(2023, 5, 10)));
        assert_eq!(may.to_string(), "2024-05");
        assert_eq!(YearMonth::of(date(2024, 5, 10)), may);
    }

    #[test]
    fn test_year_month_new_rejects_bad_month() {
        assert!(YearMonth::new(2024, 0).is_none());
        assert!(YearMonth::new(2024, 13).is_none());
        assert!(YearMonth::new(2024, 12).is_some());
    }

    #[test]
    fn test_summary_period_parsing() {
        assert_eq!("daily".parse::<SummaryPeriod>().unwrap(), SummaryPeriod::Daily);
        assert_eq!("Month".parse::<SummaryPeriod>().unwrap(), SummaryPeriod::Monthly);
        assert!("weekly".parse::<SummaryPeriod>().is_err());
    }

    #[test]
    fn test_settlement_fully_paid() {
        assert!(Settlement::default().is_fully_paid());
        let short = Settlement {
            change_given: 0.0,
            credit_due: 20.0,
        };
        assert!(!short.is_fully_paid());
    }
}
