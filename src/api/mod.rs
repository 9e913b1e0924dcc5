//! # HTTP API
//!
//! JSON endpoints for image generation, provider status, and the gallery.
//!
//! ## Endpoints
//!
//! - `POST /v1/images/generations` - Generate images with fallback
//! - `GET /v1/services/status` - Provider metrics and recent fallbacks
//! - `POST /v1/services/reset` - Reset one or all providers
//! - `POST /v1/services/switch` - Pin dispatch to a provider
//! - `GET /v1/images` - Saved images, newest first
//! - `DELETE /v1/images/:id` - Remove a saved image
//! - `GET /health` - Aggregate provider health
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use easel::api::{create_router, AppState};
//! use easel::config::EaselConfig;
//! use easel::dispatch::FallbackManager;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(EaselConfig::default());
//! let client = Arc::new(reqwest::Client::new());
//! let manager = Arc::new(FallbackManager::from_config(&config, client)?);
//! let store = easel::storage::from_config(&config.storage)?;
//!
//! let app = create_router(Arc::new(AppState::new(manager, store, config)));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every error is a JSON envelope:
//! ```json
//! {
//!   "error": {
//!     "message": "Provider error 429 Too Many Requests: slow down",
//!     "type": "rate_limit",
//!     "code": "rate_limit",
//!     "suggestion": "Please wait a moment before making another request."
//!   }
//! }
//! ```

mod error;
mod generate;
pub mod headers;
mod health;
mod images;
mod services;
pub mod types;

pub use health::HealthResponse;
pub use types::*;

use crate::config::EaselConfig;
use crate::dispatch::FallbackManager;
use crate::metrics::MetricsCollector;
use crate::storage::ImageStore;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub manager: Arc<FallbackManager>,
    pub store: Arc<dyn ImageStore>,
    pub config: Arc<EaselConfig>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    pub fn new(
        manager: Arc<FallbackManager>,
        store: Arc<dyn ImageStore>,
        config: Arc<EaselConfig>,
    ) -> Self {
        let start_time = Instant::now();
        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&manager),
            start_time,
            crate::metrics::metrics_handle(),
        ));

        Self {
            manager,
            store,
            config,
            start_time,
            metrics_collector,
        }
    }
}

/// Create the API router with all endpoints and middleware configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let timeout = Duration::from_secs(server.request_timeout_seconds.max(1));
    let body_limit = server.max_body_bytes;

    Router::new()
        .route("/v1/images/generations", post(generate::handle))
        .route("/v1/images", get(images::list))
        .route("/v1/images/:id", delete(images::remove))
        .route("/v1/services/status", get(services::status))
        .route("/v1/services/reset", post(services::reset))
        .route("/v1/services/switch", post(services::switch))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
