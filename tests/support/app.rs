//! In-process requests against the router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use bitcoin_hub::adapter::inbound::http::router;
use bitcoin_hub::application::AppState;
use bitcoin_hub::infrastructure::config::Config;
use bitcoin_hub::testkit::clock::ManualClock;
use bitcoin_hub::testkit::config::{at, DEAD_BASE};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Router over `config` with the manual clock and no completion providers.
pub fn app_for(config: &Config) -> Router {
    let state = AppState::from_config(config, Arc::new(ManualClock::default()));
    router(Arc::new(state), config.server.enable_cors)
}

/// Router whose every upstream refuses connections.
pub fn offline_app() -> Router {
    app_for(&at(DEAD_BASE))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request");
    send(app, request).await
}
