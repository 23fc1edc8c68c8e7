//! # Persistence Sink
//!
//! Forwards committed sales to a remote spreadsheet webhook.
//!
//! ## Fire-and-Forget
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Ledger::commit ──► SinkRecord::from_sales ──► WebhookSink::persist     │
//! │   (local, sync)       (camelCase JSON)          single POST             │
//! │                                                                         │
//! │   • one attempt, bounded by a timeout, never retried                   │
//! │   • response body is never read                                        │
//! │   • any HTTP status counts as delivered; it is only logged             │
//! │   • the local ledger is the record of truth either way                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Body
//! ```json
//! {
//!   "customerName": "Wanjiku",
//!   "customerEmail": "",
//!   "items": [
//!     { "id": "1715337000000-…", "itemName": "Bread", "quantity": 2,
//!       "unitPrice": 50, "total": 100 }
//!   ]
//! }
//! ```

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use duka_core::{BuyerDetails, Sale};

use crate::config::{url_host, validate_http_url, SinkSettings};
use crate::error::{request_error, RemoteError, RemoteResult};

// =============================================================================
// Record
// =============================================================================

/// One committed sale as sent to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkItem {
    pub id: String,
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

/// Body of a single webhook POST: buyer details plus the sales of one
/// commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkRecord {
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<SinkItem>,
}

impl SinkRecord {
    pub fn from_sales(buyer: &BuyerDetails, sales: &[Sale]) -> Self {
        SinkRecord {
            customer_name: buyer.customer_name.clone(),
            customer_email: buyer.customer_email.clone(),
            items: sales
                .iter()
                .map(|sale| SinkItem {
                    id: sale.id.to_string(),
                    item_name: sale.item_name.clone(),
                    quantity: sale.quantity,
                    unit_price: sale.unit_price,
                    total: sale.total,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Sink Trait
// =============================================================================

/// Somewhere committed sales can be forwarded to.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Sends one record. `Ok` means the transport accepted it.
    async fn persist(&self, record: &SinkRecord) -> RemoteResult<()>;

    /// False when forwarding is switched off and `persist` should not be
    /// attempted.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Upper bound the caller should allow for `persist`.
    fn timeout(&self) -> Duration;
}

/// Builds the sink described by `settings`: webhook when a URL is present,
/// disabled otherwise.
pub fn sink_from_settings(settings: &SinkSettings) -> RemoteResult<Arc<dyn PersistenceSink>> {
    match settings.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let sink = WebhookSink::new(url, settings.timeout())?;
            info!(host = %url_host(sink.url()), "Forwarding sales to webhook");
            Ok(Arc::new(sink))
        }
        None => {
            info!("No webhook configured, sales stay local");
            Ok(Arc::new(DisabledSink))
        }
    }
}

// =============================================================================
// Webhook Sink
// =============================================================================

/// POSTs each record as JSON to a spreadsheet web app.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl WebhookSink {
    pub fn new(url: &str, timeout: Duration) -> RemoteResult<Self> {
        let url = validate_http_url("webhook URL", url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(WebhookSink {
            client,
            url,
            timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl PersistenceSink for WebhookSink {
    async fn persist(&self, record: &SinkRecord) -> RemoteResult<()> {
        debug!(
            host = %url_host(&self.url),
            items = record.items.len(),
            "Posting sales to webhook"
        );

        let response = self
            .client
            .post(self.url.clone())
            .json(record)
            .send()
            .await
            .map_err(|e| request_error(&self.url, self.timeout, e))?;

        let status = response.status();
        if status.is_success() {
            info!(status = %status, items = record.items.len(), "Webhook accepted sales");
        } else {
            warn!(status = %status, "Webhook answered with non-success status");
        }

        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

// =============================================================================
// Disabled Sink
// =============================================================================

/// Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSink;

#[async_trait]
impl PersistenceSink for DisabledSink {
    async fn persist(&self, _record: &SinkRecord) -> RemoteResult<()> {
        Err(RemoteError::NotConfigured("Webhook"))
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn timeout(&self) -> Duration {
        Duration::ZERO
    }
}

// =============================================================================
// Memory Sink
// =============================================================================

#[derive(Debug, Default)]
struct MemorySinkState {
    records: Vec<SinkRecord>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

/// In-memory sink for tests and demos.
#[derive(Debug, Clone)]
pub struct MemorySink {
    state: Arc<RwLock<MemorySinkState>>,
    timeout: Duration,
}

impl Default for MemorySink {
    fn default() -> Self {
        MemorySink {
            state: Arc::default(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bound reported by [`PersistenceSink::timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Makes every following `persist` fail with a connection error.
    pub fn set_failure(&self, reason: Option<&str>) {
        self.write().fail_with = reason.map(str::to_string);
    }

    /// Makes every following `persist` wait first.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.write().delay = delay;
    }

    /// Records received so far.
    pub fn records(&self) -> Vec<SinkRecord> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .records
            .clone()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemorySinkState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn persist(&self, record: &SinkRecord) -> RemoteResult<()> {
        let delay = self.write().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.write();
        if let Some(reason) = state.fail_with.clone() {
            return Err(RemoteError::ConnectionFailed(reason));
        }
        state.records.push(record.clone());
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use duka_core::{Draft, Ledger};

    fn committed_sales() -> Vec<Sale> {
        let mut draft = Draft::new();
        draft.add_line(Some("Bread"), 2.0, 50.0);
        draft.add_line(Some("Milk"), 1.0, 120.0);
        let now = NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        Ledger::new().commit(&draft, now)
    }

    #[test]
    fn test_record_json_shape() {
        let buyer = BuyerDetails {
            customer_name: "Wanjiku".into(),
            customer_email: "w@example.com".into(),
        };
        let sales = committed_sales();
        let record = SinkRecord::from_sales(&buyer, &sales);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["customerName"], "Wanjiku");
        assert_eq!(json["customerEmail"], "w@example.com");
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
        assert_eq!(json["items"][0]["itemName"], "Bread");
        assert_eq!(json["items"][0]["unitPrice"], 50.0);
        assert_eq!(json["items"][0]["total"], 100.0);
        assert_eq!(json["items"][1]["id"], sales[1].id.to_string());

        let keys: Vec<&String> = json["items"][0].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
    }

    #[tokio::test]
    async fn test_memory_sink_records_and_fails() {
        let sink = MemorySink::new();
        let record = SinkRecord::from_sales(&BuyerDetails::default(), &committed_sales());

        sink.persist(&record).await.unwrap();
        assert_eq!(sink.records(), vec![record.clone()]);

        sink.set_failure(Some("offline"));
        let err = sink.persist(&record).await.unwrap_err();
        assert!(err.is_transport_error());
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_sink() {
        let sink = sink_from_settings(&SinkSettings::default()).unwrap();
        assert!(!sink.is_enabled());

        let record = SinkRecord::from_sales(&BuyerDetails::default(), &[]);
        assert!(sink.persist(&record).await.unwrap_err().is_config_error());
    }

    #[test]
    fn test_webhook_rejects_bad_url() {
        assert!(WebhookSink::new("mailto:someone", Duration::from_secs(1)).is_err());

        let sink = WebhookSink::new("https://script.google.com/macros/s/abc/exec", Duration::from_secs(1))
            .unwrap();
        assert!(sink.is_enabled());
        assert_eq!(sink.timeout(), Duration::from_secs(1));
    }
}
