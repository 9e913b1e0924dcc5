//! Shared test utilities for Easel integration tests.
//!
//! Builders for provider configs pointing at mock HTTP servers, and helpers
//! for driving the axum router in-process.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use easel::api::{create_router, AppState};
use easel::config::{EaselConfig, FallbackStrategy, ProviderConfig};
use easel::dispatch::FallbackManager;
use easel::registry::ProviderKind;
use easel::storage::{ImageStore, MemoryImageStore};
use std::sync::Arc;
use tower::ServiceExt;

/// Endpoint id accepted by the Doubao adapter without warnings.
pub const TEST_ENDPOINT_ID: &str = "ep-20240101-test";

/// Fallback tuning that keeps real-clock tests fast.
pub fn fast_fallback() -> FallbackStrategy {
    FallbackStrategy {
        max_retries: 3,
        retry_delay_ms: 10,
        auto_fallback: true,
        deadline_seconds: 30,
    }
}

/// Doubao provider pointed at `endpoint`.
pub fn doubao(id: &str, endpoint: &str, priority: i32) -> ProviderConfig {
    let mut provider = ProviderConfig::new(id, ProviderKind::Doubao, priority);
    provider.endpoint = Some(endpoint.to_string());
    provider.model = Some(TEST_ENDPOINT_ID.to_string());
    provider.api_key = Some("sk-test-doubao".to_string());
    provider.timeout_ms = 2000;
    provider
}

/// OpenAI provider pointed at `endpoint`.
pub fn openai(id: &str, endpoint: &str, priority: i32) -> ProviderConfig {
    let mut provider = ProviderConfig::new(id, ProviderKind::OpenAI, priority);
    provider.endpoint = Some(endpoint.to_string());
    provider.api_key = Some("sk-test-openai".to_string());
    provider.timeout_ms = 2000;
    provider
}

/// Mock provider with near-zero latency.
pub fn mock(id: &str, priority: i32) -> ProviderConfig {
    let mut provider = ProviderConfig::new(id, ProviderKind::Mock, priority);
    provider.min_latency_ms = 0;
    provider.max_latency_ms = 5;
    provider.seed = Some(7);
    provider
}

pub fn placeholder(id: &str, priority: i32) -> ProviderConfig {
    ProviderConfig::new(id, ProviderKind::Placeholder, priority)
}

/// Config with exactly `providers` and fast fallback timing.
pub fn config_with(providers: Vec<ProviderConfig>) -> EaselConfig {
    EaselConfig {
        providers,
        fallback: fast_fallback(),
        ..EaselConfig::default()
    }
}

pub fn manager_for(config: &EaselConfig) -> Arc<FallbackManager> {
    Arc::new(
        FallbackManager::from_config(config, Arc::new(reqwest::Client::new()))
            .expect("manager should build"),
    )
}

/// Router plus handles on its state, backed by an in-memory gallery.
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryImageStore>,
}

pub fn app_for(config: EaselConfig) -> TestApp {
    let manager = manager_for(&config);
    let store = Arc::new(MemoryImageStore::new());
    let state = Arc::new(AppState::new(
        manager,
        Arc::clone(&store) as Arc<dyn ImageStore>,
        Arc::new(config),
    ));
    TestApp {
        router: create_router(Arc::clone(&state)),
        state,
        store,
    }
}

impl TestApp {
    /// Send one request through a clone of the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8_lossy(&bytes).to_string()
}

/// Doubao-style success payload.
pub fn image_payload(url: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "doubao-seedream-4-0",
        "created": 1_700_000_000,
        "data": [{ "url": url, "size": "1024x1024" }]
    })
}
