//! Integration tests for the HTTP collaborators against an in-process server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use duka_core::{BuyerDetails, Draft, Intent, Ledger, SummaryPeriod, CLASSIFIER_FALLBACK_TEXT};
use duka_remote::{
    classify_or_fallback, ClassifierSettings, GeminiClassifier, IntentClassifier,
    PersistenceSink, RemoteError, SinkRecord, WebhookSink,
};

const GEMINI_PATH: &str = "/v1beta/models/gemini-test:generateContent";

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<Value>>>,
    api_keys: Arc<Mutex<Vec<String>>>,
}

impl Captured {
    fn record(&self, headers: &HeaderMap, body: Value) {
        if let Some(key) = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) {
            self.api_keys.lock().unwrap().push(key.to_string());
        }
        self.bodies.lock().unwrap().push(body);
    }

    fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }
}

/// Serves `app` on an ephemeral local port.
async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

/// Route that records each request and answers with `status` + `reply`
/// after `delay`.
fn recording_app(path: &str, status: StatusCode, reply: Value, delay: Duration, captured: Captured) -> Router {
    Router::new()
        .route(
            path,
            post(
                move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        captured.record(&headers, body);
                        tokio::time::sleep(delay).await;
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(captured)
}

fn model_answer(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

fn settings_for(addr: SocketAddr, timeout_secs: u64) -> ClassifierSettings {
    ClassifierSettings {
        api_key: Some("test-key".to_string()),
        model: "gemini-test".to_string(),
        endpoint: format!("http://{addr}/v1beta"),
        timeout_secs,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

fn fallback() -> Intent {
    Intent::ClassificationError {
        text: CLASSIFIER_FALLBACK_TEXT.to_string(),
    }
}

// =============================================================================
// Classifier
// =============================================================================

#[tokio::test]
async fn test_gemini_sale_entry() {
    let captured = Captured::default();
    let answer = model_answer(
        r#"{"type":"sale_entry","data":{"date":"2024-05-09","itemName":"Bread","quantity":2,"unitPrice":50}}"#,
    );
    let addr = spawn(recording_app(GEMINI_PATH, StatusCode::OK, answer, Duration::ZERO, captured.clone())).await;

    let classifier = GeminiClassifier::new(&settings_for(addr, 5)).unwrap();
    let intent = classifier
        .classify("sold 2 bread at 50 yesterday", today())
        .await
        .unwrap();

    match intent {
        Intent::NewSaleLine(line) => {
            assert_eq!(line.item_name, "Bread");
            assert_eq!(line.quantity, 2.0);
            assert_eq!(line.unit_price, 50.0);
            assert_eq!(line.date, NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
        }
        other => panic!("unexpected intent: {other:?}"),
    }

    assert_eq!(*captured.api_keys.lock().unwrap(), vec!["test-key".to_string()]);

    let body = &captured.bodies()[0];
    assert_eq!(body["contents"][0]["parts"][0]["text"], "sold 2 bread at 50 yesterday");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(
        body["generationConfig"]["responseSchema"]["required"],
        json!(["type", "data"])
    );
    assert!(body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("The current date is 2024-05-10."));
}

#[tokio::test]
async fn test_gemini_summary_request() {
    let answer = model_answer(r#"{"type":"summary_request","data":{"period":"daily"}}"#);
    let addr = spawn(recording_app(GEMINI_PATH, StatusCode::OK, answer, Duration::ZERO, Captured::default())).await;

    let classifier = GeminiClassifier::new(&settings_for(addr, 5)).unwrap();
    let intent = classify_or_fallback(&classifier, "how much today?", today()).await;

    assert_eq!(
        intent,
        Intent::SummaryRequest {
            period: SummaryPeriod::Daily
        }
    );
}

#[tokio::test]
async fn test_gemini_malformed_payload_falls_back() {
    for answer in [
        model_answer("Sure! Two loaves of bread."),
        model_answer(r#"{"type":"sale_entry","data":{"itemName":"Bread"}}"#),
        json!({ "candidates": [] }),
        json!({ "unexpected": true }),
    ] {
        let addr = spawn(recording_app(GEMINI_PATH, StatusCode::OK, answer, Duration::ZERO, Captured::default())).await;
        let classifier = GeminiClassifier::new(&settings_for(addr, 5)).unwrap();

        let intent = classify_or_fallback(&classifier, "bread", today()).await;
        assert_eq!(intent, fallback());
    }
}

#[tokio::test]
async fn test_gemini_http_error() {
    let addr = spawn(recording_app(
        GEMINI_PATH,
        StatusCode::FORBIDDEN,
        json!({ "error": { "message": "API key not valid" } }),
        Duration::ZERO,
        Captured::default(),
    ))
    .await;

    let classifier = GeminiClassifier::new(&settings_for(addr, 5)).unwrap();
    let err = classifier.classify("hi", today()).await.unwrap_err();
    assert!(matches!(err, RemoteError::HttpStatus { status: 403, .. }));

    assert_eq!(classify_or_fallback(&classifier, "hi", today()).await, fallback());
}

#[tokio::test]
async fn test_gemini_timeout_falls_back() {
    let answer = model_answer(r#"{"type":"message","data":{"text":"Hello!"}}"#);
    let addr = spawn(recording_app(GEMINI_PATH, StatusCode::OK, answer, Duration::from_secs(3), Captured::default())).await;

    let classifier = GeminiClassifier::new(&settings_for(addr, 1)).unwrap();
    let err = classifier.classify("hello", today()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout(_)), "{err:?}");

    assert_eq!(classify_or_fallback(&classifier, "hello", today()).await, fallback());
}

// =============================================================================
// Webhook
// =============================================================================

fn record() -> SinkRecord {
    let mut draft = Draft::new();
    draft.add_line(Some("Bread"), 2.0, 50.0);
    draft.add_line(Some("Milk"), 1.0, 120.0);
    let sales = Ledger::new().commit(&draft, today().and_hms_opt(9, 30, 0).unwrap());

    let buyer = BuyerDetails {
        customer_name: "Wanjiku".to_string(),
        customer_email: "wanjiku@example.com".to_string(),
    };
    SinkRecord::from_sales(&buyer, &sales)
}

#[tokio::test]
async fn test_webhook_posts_record() {
    let captured = Captured::default();
    let addr = spawn(recording_app("/exec", StatusCode::OK, json!({ "ok": true }), Duration::ZERO, captured.clone())).await;

    let sink = WebhookSink::new(&format!("http://{addr}/exec"), Duration::from_secs(5)).unwrap();
    let record = record();
    sink.persist(&record).await.unwrap();

    let bodies = captured.bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0], serde_json::to_value(&record).unwrap());
    assert_eq!(bodies[0]["customerName"], "Wanjiku");
    assert_eq!(bodies[0]["items"][1]["itemName"], "Milk");
    assert_eq!(bodies[0]["items"][1]["total"], 120.0);
}

#[tokio::test]
async fn test_webhook_non_success_status_still_sent() {
    let captured = Captured::default();
    let addr = spawn(recording_app(
        "/exec",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "script failed" }),
        Duration::ZERO,
        captured.clone(),
    ))
    .await;

    let sink = WebhookSink::new(&format!("http://{addr}/exec"), Duration::from_secs(5)).unwrap();
    assert!(sink.persist(&record()).await.is_ok());
    assert_eq!(captured.bodies().len(), 1);
}

#[tokio::test]
async fn test_webhook_timeout() {
    let addr = spawn(recording_app("/exec", StatusCode::OK, json!({}), Duration::from_secs(2), Captured::default())).await;

    let sink = WebhookSink::new(&format!("http://{addr}/exec"), Duration::from_millis(200)).unwrap();
    let err = sink.persist(&record()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout(_)), "{err:?}");
}

#[tokio::test]
async fn test_webhook_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = WebhookSink::new(
        &format!("http://{addr}/macros/s/sheet-secret/exec"),
        Duration::from_secs(2),
    )
    .unwrap();
    let err = sink.persist(&record()).await.unwrap_err();
    assert!(err.is_transport_error(), "{err:?}");
    assert!(!err.to_string().contains("sheet-secret"), "{err}");
}
