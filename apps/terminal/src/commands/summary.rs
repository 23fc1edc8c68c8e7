//! # Summary Commands
//!
//! Daily and monthly totals over the ledger, dated by the injected clock.

use serde::Serialize;
use tracing::debug;

use duka_core::{PeriodSummary, SummaryPeriod};

use crate::state::{Clock, ConfigState, LedgerState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub period: SummaryPeriod,
    pub total: f64,
    pub sale_count: usize,

    /// Ready-to-show sentence, e.g. "Today's total sales: KES 220.00"
    pub message: String,
}

impl SummaryResponse {
    fn new(summary: PeriodSummary, config: &ConfigState) -> Self {
        let label = match summary.period {
            SummaryPeriod::Daily => "Today's",
            SummaryPeriod::Monthly => "This month's",
        };

        SummaryResponse {
            period: summary.period,
            total: summary.total,
            sale_count: summary.sale_count,
            message: format!(
                "{label} total sales: {}",
                config.format_currency(summary.total)
            ),
        }
    }
}

/// Both headline totals at once, for the dashboard view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    pub today: SummaryResponse,
    pub month: SummaryResponse,
}

pub fn summary(
    ledger: &LedgerState,
    config: &ConfigState,
    clock: &dyn Clock,
    period: SummaryPeriod,
) -> SummaryResponse {
    let today = clock.today();
    debug!(%period, %today, "summary command");

    let summary = ledger.with_ledger(|ledger| ledger.summary(period, today));
    SummaryResponse::new(summary, config)
}

pub fn summary_cards(ledger: &LedgerState, config: &ConfigState, clock: &dyn Clock) -> SummaryCards {
    SummaryCards {
        today: summary(ledger, config, clock, SummaryPeriod::Daily),
        month: summary(ledger, config, clock, SummaryPeriod::Monthly),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FixedClock;
    use chrono::NaiveDate;
    use duka_core::Draft;

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn commit(ledger: &LedgerState, name: &str, qty: f64, price: f64, when: chrono::NaiveDateTime) {
        let mut draft = Draft::new();
        draft.add_line(Some(name), qty, price);
        ledger.with_ledger_mut(|l| l.commit(&draft, when));
    }

    #[test]
    fn test_daily_and_monthly_messages() {
        let ledger = LedgerState::new();
        let config = ConfigState::default();
        commit(&ledger, "Bread", 2.0, 50.0, at(10, 9));
        commit(&ledger, "Milk", 1.0, 120.0, at(10, 10));
        commit(&ledger, "Rice", 1.0, 1000.0, at(3, 12));

        let clock = FixedClock::new(at(10, 18));

        let daily = summary(&ledger, &config, &clock, SummaryPeriod::Daily);
        assert_eq!(daily.total, 220.0);
        assert_eq!(daily.sale_count, 2);
        assert_eq!(daily.message, "Today's total sales: KES 220.00");

        let cards = summary_cards(&ledger, &config, &clock);
        assert_eq!(cards.month.total, 1220.0);
        assert_eq!(cards.month.message, "This month's total sales: KES 1,220.00");
    }

    #[test]
    fn test_empty_ledger_reports_zero() {
        let clock = FixedClock::new(at(1, 8));
        let reply = summary(&LedgerState::new(), &ConfigState::default(), &clock, SummaryPeriod::Monthly);

        assert_eq!(reply.total, 0.0);
        assert_eq!(reply.message, "This month's total sales: KES 0.00");
    }
}
