//! # Sale Commands
//!
//! Commits the checkout to the ledger and forwards it to the sink.
//!
//! ## Record Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         record_sale                                     │
//! │                                                                         │
//! │  busy? ──yes──► Busy error                                              │
//! │    │no                                                                  │
//! │    ▼                                                                    │
//! │  draft empty? ──yes──► Ok(None), nothing happens                        │
//! │    │no                                                                  │
//! │    ▼                                                                    │
//! │  credit due && !allow_credit_sales? ──yes──► CreditDue error            │
//! │    │no                                                                  │
//! │    ▼                                                                    │
//! │  Ledger::commit(now) ──► checkout.clear()        (local, cannot fail)   │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  tokio::spawn(timeout(sink.persist(record)))                            │
//! │    │                                                                    │
//! │    ├── Ok ─────────────► RemoteOutcome::Saved                           │
//! │    ├── Err / timeout ──► RemoteOutcome::Failed(reason)  (no rollback)   │
//! │    └── no webhook ─────► RemoteOutcome::Skipped                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use duka_core::{Sale, Settlement};
use duka_remote::SinkRecord;

use crate::error::{ApiError, ErrorCode};
use crate::state::{BusyFlag, Clock, ConfigState, DraftState, LedgerState, RemoteState};

/// What happened to the remote copy of a recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum RemoteOutcome {
    Saved,
    Failed(String),
    /// No webhook configured
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub sales: Vec<Sale>,
    pub total: f64,
    pub tendered: f64,
    pub settlement: Settlement,
    pub remote: RemoteOutcome,
}

/// Commits the current checkout.
///
/// Returns `Ok(None)` when the draft has no lines.
pub async fn record_sale(
    draft: &DraftState,
    ledger: &LedgerState,
    config: &ConfigState,
    remote: &RemoteState,
    clock: &dyn Clock,
    busy: &BusyFlag,
) -> Result<Option<SaleReceipt>, ApiError> {
    debug!("record_sale command");

    let _guard = busy.try_acquire().ok_or_else(|| ApiError::busy("Recording"))?;

    let committed = draft.with_checkout_mut(|checkout| -> Result<_, ApiError> {
        if checkout.draft.is_empty() {
            return Ok(None);
        }

        let total = checkout.total();
        let settlement = checkout.settlement();
        if !settlement.is_fully_paid() && !config.allow_credit_sales {
            return Err(ApiError::new(
                ErrorCode::CreditDue,
                format!(
                    "Customer still owes {}",
                    config.format_currency(settlement.credit_due)
                ),
            ));
        }

        let sales = ledger.with_ledger_mut(|l| l.commit(&checkout.draft, clock.now()));
        let record = SinkRecord::from_sales(checkout.draft.buyer(), &sales);
        let tendered = checkout.tendered;
        checkout.clear();

        Ok(Some((sales, total, tendered, settlement, record)))
    })?;

    let Some((sales, total, tendered, settlement, record)) = committed else {
        debug!("Nothing to record, draft is empty");
        return Ok(None);
    };

    info!(
        sales = sales.len(),
        total,
        credit_due = settlement.credit_due,
        "Sale recorded locally"
    );

    let remote = forward(remote, record).await;

    Ok(Some(SaleReceipt {
        sales,
        total,
        tendered,
        settlement,
        remote,
    }))
}

/// Sends the record on its own task, bounded by the sink timeout.
async fn forward(remote: &RemoteState, record: SinkRecord) -> RemoteOutcome {
    let sink = remote.sink();
    if !sink.is_enabled() {
        return RemoteOutcome::Skipped;
    }

    let limit = sink.timeout();
    let task = tokio::spawn(async move { tokio::time::timeout(limit, sink.persist(&record)).await });

    match task.await {
        Ok(Ok(Ok(()))) => RemoteOutcome::Saved,
        Ok(Ok(Err(e))) => {
            warn!(error = %e, "Sale not saved remotely");
            RemoteOutcome::Failed(e.to_string())
        }
        Ok(Err(_)) => {
            warn!(timeout = ?limit, "Sale not saved remotely, sink timed out");
            RemoteOutcome::Failed(format!("timed out after {limit:?}"))
        }
        Err(e) => {
            warn!(error = %e, "Sink task did not finish");
            RemoteOutcome::Failed(e.to_string())
        }
    }
}

/// Today's sales, most recent first.
pub fn todays_sales(ledger: &LedgerState, clock: &dyn Clock) -> Vec<Sale> {
    let today = clock.today();
    ledger.with_ledger(|l| l.sales_on(today).into_iter().cloned().collect())
}
