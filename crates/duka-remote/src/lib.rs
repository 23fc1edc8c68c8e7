//! # duka-remote: External Collaborators for Duka POS
//!
//! This crate talks to the two services the POS depends on but does not
//! own: a hosted language model that reads operator text, and a spreadsheet
//! webhook that receives committed sales.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Remote Collaborators                             │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │  trait IntentClassifier      │   │  trait PersistenceSink       │   │
//! │  │                              │   │                              │   │
//! │  │  GeminiClassifier  (HTTP)    │   │  WebhookSink   (HTTP)        │   │
//! │  │  OfflineClassifier (no key)  │   │  DisabledSink  (no URL)      │   │
//! │  │  ScriptedClassifier (tests)  │   │  MemorySink    (tests)       │   │
//! │  └──────────────┬───────────────┘   └──────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │                 ▼                                  ▼                    │
//! │        duka_core::Intent                 SinkRecord (camelCase JSON)    │
//! │                                                                         │
//! │  RemoteConfig: [classifier] + [sink] from remote.toml and DUKA_* env   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! - No call is retried
//! - Every call has a timeout
//! - Classifier failures become [`duka_core::CLASSIFIER_FALLBACK_TEXT`] via
//!   [`classify_or_fallback`]
//! - Sink failures are reported to the caller, who keeps the local ledger

pub mod classifier;
pub mod config;
pub mod error;
pub mod intent;
pub mod sink;

pub use classifier::{
    classifier_from_settings, classify_or_fallback, GeminiClassifier, IntentClassifier,
    OfflineClassifier, ScriptedClassifier,
};
pub use config::{ClassifierSettings, RemoteConfig, SinkSettings};
pub use error::{RemoteError, RemoteResult};
pub use intent::{parse_intent, IntentEnvelope};
pub use sink::{
    sink_from_settings, DisabledSink, MemorySink, PersistenceSink, SinkItem, SinkRecord,
    WebhookSink,
};
