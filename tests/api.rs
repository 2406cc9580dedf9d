//! API endpoint integration tests

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use sahayak::api::{ApiState, router};
use sahayak::voice::WakeTrigger;
use sahayak::{Event, EventBus, EventKind, EventSink, PreferenceStore, SessionState, WakeSource};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::{mpsc, watch};
use tower::ServiceExt;

mod common;
use common::CountingWake;

/// Everything a test needs to drive and observe the router
struct Harness {
    app: axum::Router,
    inbox: mpsc::UnboundedReceiver<Event>,
    state_tx: watch::Sender<SessionState>,
    wake: Arc<CountingWake>,
    prefs: PreferenceStore,
    _dir: TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let prefs = PreferenceStore::new(dir.path().join("preferences.toml"));
    let (sink, inbox) = EventSink::channel();
    let (state_tx, state_rx) = watch::channel(SessionState::Idle);
    let wake = Arc::new(CountingWake::default());

    let state = ApiState {
        wake: Arc::new(WakeTrigger::new(wake.clone(), sink)),
        state: state_rx,
        bus: EventBus::new(),
        preferences: prefs.clone(),
    };

    Harness {
        app: router(Arc::new(state)),
        inbox,
        state_tx,
        wake,
        prefs,
        _dir: dir,
    }
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let (status, body) = send(&h.app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_defaults() {
    let h = harness();
    let (status, body) = send(&h.app, empty_request("GET", "/api/assistant/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");
    assert_eq!(body["enabled"], false);
    assert_eq!(body["wake_armed"], false);
}

#[tokio::test]
async fn test_wake_when_idle_is_accepted() {
    let mut h = harness();
    let (status, body) = send(&h.app, empty_request("POST", "/api/assistant/wake")).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["accepted"], true);

    let event = h.inbox.recv().await.unwrap();
    assert!(event.session_id.is_none());
    assert!(matches!(
        event.kind,
        EventKind::WakeDetected {
            source: WakeSource::Manual
        }
    ));
}

#[tokio::test]
async fn test_wake_during_session_conflicts() {
    let mut h = harness();
    h.state_tx.send(SessionState::Speaking).unwrap();

    let (status, body) = send(&h.app, empty_request("POST", "/api/assistant/wake")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["accepted"], false);
    assert_eq!(body["state"], "speaking");
    assert!(h.inbox.try_recv().is_err());
}

#[tokio::test]
async fn test_wake_after_error_is_accepted() {
    let h = harness();
    h.state_tx.send(SessionState::Error).unwrap();

    let (status, _) = send(&h.app, empty_request("POST", "/api/assistant/wake")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_classify() {
    let h = harness();
    let request = json_request(
        "POST",
        "/api/assistant/classify",
        &serde_json::json!({"text": "yaar main bahut udas hoon"}),
    );
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"]["value"], "hinglish");
    assert_eq!(body["language_code"], "hi-en");
    assert_eq!(body["emotion"]["value"], "sad");
    assert_eq!(body["emotion_description"], "Sad or upset");
    assert_eq!(body["emotion_color"], "#2196F3");
}

#[tokio::test]
async fn test_classify_devanagari() {
    let h = harness();
    let request = json_request(
        "POST",
        "/api/assistant/classify",
        &serde_json::json!({"text": "मुझे बहुत गुस्सा आ रहा है"}),
    );
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"]["value"], "hindi");
    assert_eq!(body["language_code"], "hi");
}

#[tokio::test]
async fn test_enable_persists_and_arms() {
    let h = harness();
    let request = json_request(
        "PUT",
        "/api/assistant/enabled",
        &serde_json::json!({"enabled": true}),
    );
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], true);
    assert_eq!(body["wake_armed"], true);
    assert!(h.prefs.load().enabled);
    assert_eq!(h.wake.starts.load(Ordering::SeqCst), 1);

    let request = json_request(
        "PUT",
        "/api/assistant/enabled",
        &serde_json::json!({"enabled": false}),
    );
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wake_armed"], false);
    assert!(!h.prefs.load().enabled);
    assert_eq!(h.wake.stops.load(Ordering::SeqCst), 1);
}
