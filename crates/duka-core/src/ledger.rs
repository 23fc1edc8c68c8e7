//! # Sales Ledger
//!
//! The append-only, in-memory record of committed sales.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Draft (N lines)                        Ledger                         │
//! │   ┌──────────────┐   commit(now)   ┌────────────────────────────┐      │
//! │   │ Bread  2×50  │ ──────────────► │ ...older sales...          │      │
//! │   │ Milk   1×120 │                 │ <ms>-<bread id>  total 100 │      │
//! │   └──────────────┘                 │ <ms>-<milk id>   total 120 │      │
//! │                                    └────────────────────────────┘      │
//! │                                                                         │
//! │   • all N sales appended at once, same millisecond stamp               │
//! │   • date = commit date, total frozen                                   │
//! │   • empty draft: nothing appended, empty Vec returned                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Mutation
//! There is no update or delete. The ledger lives for the process lifetime.

use chrono::{NaiveDate, NaiveDateTime};

use crate::draft::Draft;
use crate::types::{PeriodSummary, Sale, SummaryPeriod, YearMonth};

/// Append-only list of committed sales.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    sales: Vec<Sale>,
    /// Millisecond stamp of the latest commit, used to keep ids unique when
    /// the clock does not move between commits.
    last_commit_ms: Option<i64>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Freezes every draft line into a sale dated `committed_at`.
    ///
    /// Returns the new sales in draft order. The draft itself is left
    /// untouched; clearing it is the caller's job.
    pub fn commit(&mut self, draft: &Draft, committed_at: NaiveDateTime) -> Vec<Sale> {
        if draft.is_empty() {
            return Vec::new();
        }

        let mut stamp = committed_at.and_utc().timestamp_millis();
        if let Some(last) = self.last_commit_ms {
            if stamp <= last {
                stamp = last + 1;
            }
        }
        self.last_commit_ms = Some(stamp);

        let date = committed_at.date();
        let new_sales: Vec<Sale> = draft
            .lines()
            .iter()
            .map(|line| Sale::freeze(line, date, stamp))
            .collect();

        self.sales.extend(new_sales.iter().cloned());
        new_sales
    }

    /// Sales dated `date`, most recent commit first.
    ///
    /// Within one commit the later line comes first.
    pub fn sales_on(&self, date: NaiveDate) -> Vec<&Sale> {
        let mut matches: Vec<&Sale> = self.sales.iter().rev().filter(|s| s.date == date).collect();
        // Stable: equal stamps keep the reversed insertion order.
        matches.sort_by(|a, b| b.id.committed_at_ms().cmp(&a.id.committed_at_ms()));
        matches
    }

    /// Sum of totals dated `date`.
    pub fn total_on(&self, date: NaiveDate) -> f64 {
        self.sales
            .iter()
            .filter(|s| s.date == date)
            .map(|s| s.total)
            .sum()
    }

    /// Sum of totals whose date falls in `month`.
    pub fn total_for_month(&self, month: YearMonth) -> f64 {
        self.sales
            .iter()
            .filter(|s| month.contains(s.date))
            .map(|s| s.total)
            .sum()
    }

    /// Aggregate for the day or month containing `today`.
    pub fn summary(&self, period: SummaryPeriod, today: NaiveDate) -> PeriodSummary {
        let (total, sale_count) = match period {
            SummaryPeriod::Daily => (
                self.total_on(today),
                self.sales.iter().filter(|s| s.date == today).count(),
            ),
            SummaryPeriod::Monthly => {
                let month = YearMonth::of(today);
                (
                    self.total_for_month(month),
                    self.sales.iter().filter(|s| month.contains(s.date)).count(),
                )
            }
        };

        PeriodSummary {
            period,
            total,
            sale_count,
        }
    }

    /// All sales in insertion order.
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}
