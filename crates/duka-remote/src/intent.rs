//! # Intent Envelope
//!
//! The JSON shape the language model is asked to answer with, and its
//! validation into a [`duka_core::Intent`].
//!
//! ## Wire Format
//! ```text
//! { "type": "sale_entry",      "data": { "date", "itemName", "quantity", "unitPrice" } }
//! { "type": "summary_request", "data": { "period": "daily" | "monthly" } }
//! { "type": "error",           "data": { "text" } }
//! { "type": "message",         "data": { "text" } }
//! ```
//!
//! Anything else (bad JSON, unknown `type`, a missing or mistyped field) is
//! rejected here; the caller decides what the operator sees.

use serde::{Deserialize, Serialize};

use duka_core::validation::parse_iso_date;
use duka_core::{Intent, ParsedSaleLine, SummaryPeriod};

use crate::error::{RemoteError, RemoteResult};

/// Discriminator of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    SaleEntry,
    SummaryRequest,
    Error,
    Message,
}

impl EnvelopeKind {
    /// Wire names, in schema order.
    pub const ALL: [&'static str; 4] = ["sale_entry", "summary_request", "error", "message"];
}

/// Union of every field any envelope kind may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `{ "type": ..., "data": { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentEnvelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub data: EnvelopeData,
}

impl IntentEnvelope {
    /// Parses the model's raw text answer.
    pub fn parse(raw: &str) -> RemoteResult<Self> {
        serde_json::from_str(raw.trim()).map_err(|e| RemoteError::MalformedResponse(e.to_string()))
    }

    /// Checks the fields required by `kind` and builds the intent.
    pub fn into_intent(self) -> RemoteResult<Intent> {
        let data = self.data;
        match self.kind {
            EnvelopeKind::SaleEntry => {
                let raw_date = require(data.date, "date")?;
                let date = parse_iso_date(&raw_date)
                    .map_err(|e| RemoteError::SchemaViolation(e.to_string()))?;

                let item_name = require(data.item_name, "itemName")?;
                if item_name.trim().is_empty() {
                    return Err(RemoteError::SchemaViolation("itemName is empty".into()));
                }

                let quantity = require_finite(data.quantity, "quantity")?;
                let unit_price = require_finite(data.unit_price, "unitPrice")?;

                Ok(Intent::NewSaleLine(ParsedSaleLine {
                    date,
                    item_name,
                    quantity,
                    unit_price,
                }))
            }
            EnvelopeKind::SummaryRequest => {
                let raw_period = require(data.period, "period")?;
                let period = match raw_period.as_str() {
                    "daily" => SummaryPeriod::Daily,
                    "monthly" => SummaryPeriod::Monthly,
                    other => {
                        return Err(RemoteError::SchemaViolation(format!(
                            "period must be daily or monthly, got '{other}'"
                        )))
                    }
                };
                Ok(Intent::SummaryRequest { period })
            }
            EnvelopeKind::Message => Ok(Intent::InformationalMessage {
                text: require_text(data.text)?,
            }),
            EnvelopeKind::Error => Ok(Intent::ClassificationError {
                text: require_text(data.text)?,
            }),
        }
    }
}

/// Parses and validates in one step.
pub fn parse_intent(raw: &str) -> RemoteResult<Intent> {
    IntentEnvelope::parse(raw)?.into_intent()
}

fn require<T>(value: Option<T>, field: &str) -> RemoteResult<T> {
    value.ok_or_else(|| RemoteError::SchemaViolation(format!("missing {field}")))
}

fn require_finite(value: Option<f64>, field: &str) -> RemoteResult<f64> {
    let value = require(value, field)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RemoteError::SchemaViolation(format!("{field} is not a finite number")))
    }
}

fn require_text(value: Option<String>) -> RemoteResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(RemoteError::SchemaViolation("missing text".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_sale_entry() {
        let intent = parse_intent(
            r#"{"type":"sale_entry","data":{"date":"2024-05-09","itemName":"Sugar","quantity":2,"unitPrice":150.5}}"#,
        )
        .unwrap();

        assert_eq!(
            intent,
            Intent::NewSaleLine(ParsedSaleLine {
                date: NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
                item_name: "Sugar".to_string(),
                quantity: 2.0,
                unit_price: 150.5,
            })
        );
    }

    #[test]
    fn test_sale_entry_missing_fields() {
        let err = parse_intent(r#"{"type":"sale_entry","data":{"date":"2024-05-09","itemName":"Sugar"}}"#)
            .unwrap_err();
        assert!(matches!(err, RemoteError::SchemaViolation(_)));

        let err = parse_intent(
            r#"{"type":"sale_entry","data":{"date":"yesterday","itemName":"Sugar","quantity":1,"unitPrice":1}}"#,
        )
        .unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_summary_request() {
        assert_eq!(
            parse_intent(r#"{"type":"summary_request","data":{"period":"monthly"}}"#).unwrap(),
            Intent::SummaryRequest {
                period: SummaryPeriod::Monthly
            }
        );
        assert!(parse_intent(r#"{"type":"summary_request","data":{"period":"weekly"}}"#).is_err());
    }

    #[test]
    fn test_message_and_error() {
        assert_eq!(
            parse_intent(r#"{"type":"message","data":{"text":"Hello!"}}"#).unwrap(),
            Intent::InformationalMessage {
                text: "Hello!".to_string()
            }
        );
        assert_eq!(
            parse_intent(r#"  {"type":"error","data":{"text":"Missing the price."}}  "#).unwrap(),
            Intent::ClassificationError {
                text: "Missing the price.".to_string()
            }
        );
        assert!(parse_intent(r#"{"type":"message","data":{"text":"  "}}"#).is_err());
    }

    #[test]
    fn test_malformed_envelopes() {
        for raw in [
            "",
            "not json",
            r#"{"type":"sale_entry"}"#,
            r#"{"type":"refund","data":{}}"#,
            r#"{"data":{"text":"hi"}}"#,
            r#"{"type":"message","data":{"text":42}}"#,
        ] {
            let err = parse_intent(raw).unwrap_err();
            assert!(matches!(err, RemoteError::MalformedResponse(_)), "{raw}");
        }
    }
}
