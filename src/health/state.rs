//! Per-provider health state.

use super::error::HealthCheckError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Advisory health classification of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    /// Reachable but slow; still selectable
    Degraded,
    Unhealthy,
    Unknown,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Unhealthy => "unhealthy",
            ServiceStatus::Unknown => "unknown",
        }
    }

    /// Whether dispatch should prefer this provider over unhealthy ones.
    pub fn is_selectable(self) -> bool {
        self != ServiceStatus::Unhealthy
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rolling metrics for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetrics {
    pub service_id: String,
    pub status: ServiceStatus,
    /// Last observed response time (dispatch or probe)
    pub response_time_ms: u64,
    /// successes / (successes + failures) * 100; 100 before any observation
    pub success_rate: f64,
    pub error_count: u64,
    pub total_successes: u64,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
}

impl ServiceMetrics {
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            status: ServiceStatus::Unknown,
            response_time_ms: 0,
            success_rate: 100.0,
            error_count: 0,
            total_successes: 0,
            last_error: None,
            last_error_at: None,
            last_success: None,
        }
    }

    pub(crate) fn recompute_success_rate(&mut self) {
        let total = self.total_successes + self.error_count;
        self.success_rate = if total == 0 {
            100.0
        } else {
            self.total_successes as f64 / total as f64 * 100.0
        };
    }
}

/// Outcome of one health probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    Healthy { latency_ms: u64 },
    /// Probe succeeded above the degraded threshold
    Degraded { latency_ms: u64 },
    Failure { error: HealthCheckError },
}

impl ProbeResult {
    pub fn status(&self) -> ServiceStatus {
        match self {
            ProbeResult::Healthy { .. } => ServiceStatus::Healthy,
            ProbeResult::Degraded { .. } => ServiceStatus::Degraded,
            ProbeResult::Failure { .. } => ServiceStatus::Unhealthy,
        }
    }
}
