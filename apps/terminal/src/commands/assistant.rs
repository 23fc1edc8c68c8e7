//! # Assistant Commands
//!
//! Free-text input from the operator, routed through the intent classifier.
//!
//! ```text
//!   "sold 2 bread at 50"  ──► classifier ──► NewSaleLine     ──► draft line added
//!   "how much today?"     ──► classifier ──► SummaryRequest  ──► formatted total
//!   "hello"               ──► classifier ──► Informational   ──► shown verbatim
//!   (timeout / garbage)   ──► fallback   ──► ClassificationError, draft untouched
//! ```

use serde::Serialize;
use tracing::{debug, info};

use duka_core::Intent;
use duka_remote::classify_or_fallback;

use crate::commands::draft::{DraftLineView, DraftResponse};
use crate::commands::summary::{summary, SummaryResponse};
use crate::error::ApiError;
use crate::state::{BusyFlag, Clock, ConfigState, DraftState, LedgerState, RemoteState};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AssistantReply {
    /// A line was appended to the draft
    SaleLineAdded { line: DraftLineView, draft_total: f64 },
    Summary(SummaryResponse),
    Message { text: String },
    /// Classifier could not make sense of the input; nothing changed
    Error { text: String },
}

/// Classifies one input and applies it.
///
/// Only one submission may be in flight; a second gets a `Busy` error.
pub async fn submit_text(
    draft: &DraftState,
    ledger: &LedgerState,
    config: &ConfigState,
    remote: &RemoteState,
    clock: &dyn Clock,
    busy: &BusyFlag,
    text: &str,
) -> Result<AssistantReply, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::validation("Type something for the assistant"));
    }

    let _guard = busy.try_acquire().ok_or_else(|| ApiError::busy("The assistant"))?;

    debug!(classifier = remote.classifier().name(), "submit_text command");
    let intent = classify_or_fallback(remote.classifier(), text, clock.today()).await;

    let reply = match intent {
        Intent::NewSaleLine(parsed) => {
            info!(item = %parsed.item_name, quantity = parsed.quantity, "Assistant added a sale line");
            let (line, draft_total) = draft.with_checkout_mut(|checkout| {
                checkout.draft.add_parsed_line(&parsed);
                let mut view = DraftResponse::from(&*checkout);
                (view.lines.pop(), view.total)
            });
            let line = line.ok_or_else(|| ApiError::internal("Draft line missing after insert"))?;
            AssistantReply::SaleLineAdded { line, draft_total }
        }
        Intent::SummaryRequest { period } => {
            AssistantReply::Summary(summary(ledger, config, clock, period))
        }
        Intent::InformationalMessage { text } => AssistantReply::Message { text },
        Intent::ClassificationError { text } => AssistantReply::Error { text },
    };

    Ok(reply)
}
