//! Health check endpoint handler.

use crate::api::AppState;
use crate::health::{ServiceMetrics, ServiceStatus};
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub providers: ProviderCounts,
}

/// Enabled-provider counts by tracked status.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProviderCounts {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub unhealthy: usize,
    pub unknown: usize,
}

impl ProviderCounts {
    fn from_metrics<'a>(metrics: impl IntoIterator<Item = &'a ServiceMetrics>) -> Self {
        let mut counts = Self::default();
        for m in metrics {
            counts.total += 1;
            match m.status {
                ServiceStatus::Healthy => counts.healthy += 1,
                ServiceStatus::Degraded => counts.degraded += 1,
                ServiceStatus::Unhealthy => counts.unhealthy += 1,
                ServiceStatus::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    /// `healthy` when every enabled provider is healthy or degraded,
    /// `degraded` when only some are, `unhealthy` when none is.
    fn overall(&self) -> &'static str {
        let available = self.healthy + self.degraded;
        match (available, self.total) {
            (a, t) if a == t && t > 0 => "healthy",
            (a, _) if a > 0 => "degraded",
            _ => "unhealthy",
        }
    }
}

/// GET /health - Aggregate health of the enabled providers.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let enabled = state.manager.registry().list_enabled();
    let snapshot = state.manager.tracker().snapshot();
    let counts = ProviderCounts::from_metrics(
        snapshot
            .iter()
            .filter(|m| enabled.iter().any(|d| d.id == m.service_id)),
    );

    Json(HealthResponse {
        status: counts.overall().to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        providers: counts,
    })
}
