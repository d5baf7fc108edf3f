#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use innkeep_api::config::ServerConfig;
use innkeep_api::router::build_app_router;
use innkeep_api::state::AppState;
use innkeep_core::clock::FixedClock;
use innkeep_core::config::BookingConfig;
use innkeep_core::memory::MemoryStore;
use innkeep_core::notify::RecordingNotifier;

/// Noon UTC on 2025-05-20. Test stays are in June 2025.
pub const NOW: &str = "2025-05-20T12:00:00Z";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        notification_queue_capacity: 16,
        booking: BookingConfig::default(),
    }
}

/// The router plus handles on the collaborators tests want to inspect.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Build the full application over a fresh `MemoryStore`, a fixed clock and
/// a recording notifier. Uses the same middleware stack as the binary.
pub fn build_test_app() -> TestApp {
    let clock = Arc::new(FixedClock::new(
        DateTime::parse_from_rfc3339(NOW)
            .unwrap()
            .with_timezone(&Utc),
    ));
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    let notifier = Arc::new(RecordingNotifier::new());

    let state = AppState::new(
        test_config(),
        store,
        notifier.clone(),
        clock.clone(),
        None,
    );

    TestApp {
        router: build_app_router(state),
        clock,
        notifier,
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, json: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(json)).await
}

/// POST with no body, for transitions like `/confirm`.
pub async fn post_empty(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: &Router, uri: &str, json: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(json)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a room and return its id.
pub async fn create_room(app: &Router, number: &str, capacity: i32, price: f64) -> i64 {
    let response = post_json(
        app,
        "/api/v1/rooms",
        serde_json::json!({
            "room_number": number,
            "room_type": "double",
            "capacity": capacity,
            "price_per_night": price,
            "amenities": ["wifi", "onsen access"],
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// POST a booking of `room_id` for a guest identified by contact details.
pub async fn create_booking(
    app: &Router,
    room_id: i64,
    email: &str,
    check_in: &str,
    check_out: &str,
) -> Response<Body> {
    post_json(
        app,
        "/api/v1/bookings",
        serde_json::json!({
            "guest": { "name": "Test Guest", "email": email, "phone": "090-0000-0000" },
            "room_id": room_id,
            "check_in": check_in,
            "check_out": check_out,
        }),
    )
    .await
}
