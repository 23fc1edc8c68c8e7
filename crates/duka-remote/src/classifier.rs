//! # Intent Classifier
//!
//! Turns free text typed by the operator into an [`Intent`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  "sold 2 bread at 50 yesterday"                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌──────────────────┐  POST {endpoint}/models/{model}:generateContent   │
//! │  │ GeminiClassifier │ ───────────────────────────────────────────────►  │
//! │  │                  │  system instruction (today's date embedded)       │
//! │  │                  │  + response schema (JSON only)                    │
//! │  │                  │ ◄───────────────────────────────────────────────  │
//! │  └────────┬─────────┘  candidates[0].content.parts[*].text              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  IntentEnvelope::parse ──► into_intent ──► Intent::NewSaleLine { .. }   │
//! │                                                                         │
//! │  Any failure on the way ──► classify_or_fallback ──►                    │
//! │        Intent::ClassificationError { CLASSIFIER_FALLBACK_TEXT }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Relative dates ("yesterday") are resolved by the model, which is why the
//! current date is part of every request.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use duka_core::{Intent, CLASSIFIER_FALLBACK_TEXT};

use crate::config::{url_host, validate_http_url, ClassifierSettings};
use crate::error::{request_error, RemoteError, RemoteResult};
use crate::intent::{parse_intent, EnvelopeKind};

// =============================================================================
// Classifier Trait
// =============================================================================

/// Something that can interpret operator text.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classifies `input`; `today` anchors relative dates.
    async fn classify(&self, input: &str, today: NaiveDate) -> RemoteResult<Intent>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Classifies, folding every failure into the generic fallback notice.
pub async fn classify_or_fallback(
    classifier: &dyn IntentClassifier,
    input: &str,
    today: NaiveDate,
) -> Intent {
    match classifier.classify(input, today).await {
        Ok(intent) => {
            debug!(classifier = classifier.name(), kind = intent.kind(), "Input classified");
            intent
        }
        Err(e) => {
            warn!(classifier = classifier.name(), error = %e, "Classification failed");
            Intent::ClassificationError {
                text: CLASSIFIER_FALLBACK_TEXT.to_string(),
            }
        }
    }
}

/// Builds the classifier described by `settings`: Gemini when an API key is
/// present, offline otherwise.
pub fn classifier_from_settings(settings: &ClassifierSettings) -> RemoteResult<Arc<dyn IntentClassifier>> {
    if settings.is_configured() {
        info!(model = %settings.model, "Using Gemini intent classifier");
        Ok(Arc::new(GeminiClassifier::new(settings)?))
    } else {
        info!("No classifier API key configured, assistant is offline");
        Ok(Arc::new(OfflineClassifier))
    }
}

// =============================================================================
// Gemini Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Content {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

/// Instruction describing the four answer shapes.
pub fn system_instruction(today: NaiveDate) -> String {
    format!(
        "You are an intelligent sales assistant for a small business. \
Your task is to process user input related to sales transactions.\n\
The current date is {today}.\n\n\
You must respond in a valid JSON format only. Do not include any text, notes, or markdown formatting outside of the JSON object.\n\
Based on the user's message, determine the user's intent and respond with one of the following JSON structures:\n\n\
1. For a new sale entry:\n\
   - Extract date, item name, quantity, and unit price.\n\
   - The date can be relative (e.g., \"today\", \"yesterday\"). Convert it to 'YYYY-MM-DD' format.\n\
   - If any information is missing or invalid (e.g., non-numeric quantity), respond with an 'error' type.\n\
   - JSON structure:\n\
     {{ \"type\": \"sale_entry\", \"data\": {{ \"date\": \"YYYY-MM-DD\", \"itemName\": \"string\", \"quantity\": number, \"unitPrice\": number }} }}\n\n\
2. For a request for a sales summary:\n\
   - Identify if the user wants a 'daily' or 'monthly' summary.\n\
   - JSON structure:\n\
     {{ \"type\": \"summary_request\", \"data\": {{ \"period\": \"daily\" | \"monthly\" }} }}\n\n\
3. If the input is invalid or a sale entry is incomplete:\n\
   - Provide a clear error message explaining what is wrong or missing.\n\
   - JSON structure:\n\
     {{ \"type\": \"error\", \"data\": {{ \"text\": \"Your helpful error message.\" }} }}\n\n\
4. For any other greeting or general question:\n\
   - Respond with a friendly, helpful message.\n\
   - JSON structure:\n\
     {{ \"type\": \"message\", \"data\": {{ \"text\": \"Your helpful response.\" }} }}\n",
        today = today.format("%Y-%m-%d"),
    )
}

/// Structured-output schema matching [`crate::intent::IntentEnvelope`].
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "type": { "type": "STRING", "enum": EnvelopeKind::ALL },
            "data": {
                "type": "OBJECT",
                "properties": {
                    "date": { "type": "STRING", "description": "Date of sale in YYYY-MM-DD format." },
                    "itemName": { "type": "STRING" },
                    "quantity": { "type": "NUMBER" },
                    "unitPrice": { "type": "NUMBER" },
                    "period": { "type": "STRING", "enum": ["daily", "monthly"] },
                    "text": { "type": "STRING" }
                }
            }
        },
        "required": ["type", "data"]
    })
}

// =============================================================================
// Gemini Classifier
// =============================================================================

/// Classifier backed by the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    client: Client,
    url: Url,
    api_key: String,
    timeout: Duration,
}

impl GeminiClassifier {
    /// Builds a client from settings. Fails without an API key or with a bad
    /// endpoint.
    pub fn new(settings: &ClassifierSettings) -> RemoteResult<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(RemoteError::NotConfigured("Intent classifier"))?;

        let base = validate_http_url("classifier endpoint", &settings.endpoint)?;
        let url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            base.as_str().trim_end_matches('/'),
            settings.model
        ))?;

        let timeout = settings.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(GeminiClassifier {
            client,
            url,
            api_key,
            timeout,
        })
    }

    /// Full request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request_body(input: &str, today: NaiveDate) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content::text(None, system_instruction(today)),
            contents: vec![Content::text(Some("user"), input.to_string())],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        }
    }
}

#[async_trait]
impl IntentClassifier for GeminiClassifier {
    async fn classify(&self, input: &str, today: NaiveDate) -> RemoteResult<Intent> {
        debug!(
            host = %url_host(&self.url),
            chars = input.len(),
            "Sending classification request"
        );

        let response = self
            .client
            .post(self.url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(input, today))
            .send()
            .await
            .map_err(|e| request_error(&self.url, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::HttpStatus {
                status: status.as_u16(),
                message: format!("classifier returned {status}"),
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| request_error(&self.url, self.timeout, e))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RemoteError::MalformedResponse("no candidate text".into()));
        }

        parse_intent(&text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// =============================================================================
// Offline Classifier
// =============================================================================

/// Used when no API key is configured. Every call fails, so the operator
/// sees the fallback notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClassifier;

#[async_trait]
impl IntentClassifier for OfflineClassifier {
    async fn classify(&self, _input: &str, _today: NaiveDate) -> RemoteResult<Intent> {
        Err(RemoteError::NotConfigured("Intent classifier"))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

// =============================================================================
// Scripted Classifier
// =============================================================================

#[derive(Debug)]
enum ScriptedReply {
    Intent(Intent),
    Raw(String),
    Fail(RemoteError),
}

#[derive(Debug, Default)]
struct ScriptedState {
    replies: VecDeque<ScriptedReply>,
    inputs: Vec<String>,
    delay: Option<Duration>,
}

/// In-memory classifier that answers from a queue of prepared replies.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClassifier {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a ready-made intent.
    pub fn push_intent(&self, intent: Intent) -> &Self {
        self.lock().replies.push_back(ScriptedReply::Intent(intent));
        self
    }

    /// Queues raw model text, validated like a real answer.
    pub fn push_raw(&self, raw: impl Into<String>) -> &Self {
        self.lock().replies.push_back(ScriptedReply::Raw(raw.into()));
        self
    }

    /// Queues a failure.
    pub fn push_error(&self, error: RemoteError) -> &Self {
        self.lock().replies.push_back(ScriptedReply::Fail(error));
        self
    }

    /// Makes every call wait before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Inputs received so far.
    pub fn inputs(&self) -> Vec<String> {
        self.lock().inputs.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IntentClassifier for ScriptedClassifier {
    async fn classify(&self, input: &str, _today: NaiveDate) -> RemoteResult<Intent> {
        let (reply, delay) = {
            let mut state = self.lock();
            state.inputs.push(input.to_string());
            (state.replies.pop_front(), state.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(ScriptedReply::Intent(intent)) => Ok(intent),
            Some(ScriptedReply::Raw(raw)) => parse_intent(&raw),
            Some(ScriptedReply::Fail(error)) => Err(error),
            None => Err(RemoteError::MalformedResponse("no scripted reply left".into())),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duka_core::SummaryPeriod;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn test_system_instruction_embeds_date() {
        let text = system_instruction(today());
        assert!(text.contains("The current date is 2024-05-10."));
        assert!(text.contains("\"type\": \"summary_request\""));
    }

    #[test]
    fn test_response_schema_enum() {
        let schema = response_schema();
        assert_eq!(
            schema["properties"]["type"]["enum"],
            json!(["sale_entry", "summary_request", "error", "message"])
        );
        assert_eq!(schema["required"], json!(["type", "data"]));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GeminiClassifier::request_body("hello", today())).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("2024-05-10"));
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let err = GeminiClassifier::new(&ClassifierSettings::default()).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_gemini_url() {
        let settings = ClassifierSettings {
            api_key: Some("k".into()),
            endpoint: "http://127.0.0.1:9999/v1beta/".into(),
            ..ClassifierSettings::default()
        };
        let classifier = GeminiClassifier::new(&settings).unwrap();
        assert_eq!(
            classifier.url().as_str(),
            "http://127.0.0.1:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_offline_falls_back() {
        let intent = classify_or_fallback(&OfflineClassifier, "hi", today()).await;
        assert_eq!(
            intent,
            Intent::ClassificationError {
                text: CLASSIFIER_FALLBACK_TEXT.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let scripted = ScriptedClassifier::new();
        scripted
            .push_intent(Intent::SummaryRequest {
                period: SummaryPeriod::Daily,
            })
            .push_raw("{ not json")
            .push_error(RemoteError::Timeout(Duration::from_secs(30)));

        let first = classify_or_fallback(&scripted, "today?", today()).await;
        assert_eq!(
            first,
            Intent::SummaryRequest {
                period: SummaryPeriod::Daily
            }
        );

        for input in ["garbled", "slow", "exhausted"] {
            let intent = classify_or_fallback(&scripted, input, today()).await;
            assert!(matches!(
                intent,
                Intent::ClassificationError { ref text } if text == CLASSIFIER_FALLBACK_TEXT
            ));
        }

        assert_eq!(scripted.inputs(), vec!["today?", "garbled", "slow", "exhausted"]);
    }

    #[test]
    fn test_classifier_from_settings() {
        let offline = classifier_from_settings(&ClassifierSettings::default()).unwrap();
        assert_eq!(offline.name(), "offline");

        let settings = ClassifierSettings {
            api_key: Some("key".into()),
            ..ClassifierSettings::default()
        };
        assert_eq!(classifier_from_settings(&settings).unwrap().name(), "gemini");
    }
}
