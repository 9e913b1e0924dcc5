//! Shared per-provider metrics map.

use super::state::{ProbeResult, ServiceMetrics, ServiceStatus};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::{PoisonError, RwLock};

/// Concurrent store of `ServiceMetrics`, keyed by provider id.
///
/// Each entry is updated under its own shard lock; concurrent dispatches may
/// interleave updates to the same provider, which is acceptable because the
/// numbers are advisory.
pub struct MetricsTracker {
    metrics: DashMap<String, ServiceMetrics>,
    /// Registration order, for stable snapshots
    order: RwLock<Vec<String>>,
}

impl MetricsTracker {
    /// Create a tracker with an `unknown` entry for every id.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tracker = Self {
            metrics: DashMap::new(),
            order: RwLock::new(Vec::new()),
        };
        for id in ids {
            tracker.register(id);
        }
        tracker
    }

    /// Add an entry for `id` if it is not tracked yet.
    pub fn register(&self, id: impl Into<String>) {
        let id = id.into();
        if self.metrics.contains_key(&id) {
            return;
        }
        self.metrics
            .insert(id.clone(), ServiceMetrics::new(id.clone()));
        self.order
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
    }

    /// Record a successful generation.
    pub fn record_success(&self, id: &str, response_time_ms: u64) {
        self.update(id, |m| {
            m.status = ServiceStatus::Healthy;
            m.response_time_ms = response_time_ms;
            m.total_successes += 1;
            m.last_success = Some(Utc::now());
            m.recompute_success_rate();
        });
    }

    /// Record a failed generation attempt.
    pub fn record_failure(&self, id: &str, error: &str) {
        self.update(id, |m| {
            m.status = ServiceStatus::Unhealthy;
            m.error_count += 1;
            m.last_error = Some(error.to_string());
            m.last_error_at = Some(Utc::now());
            m.recompute_success_rate();
        });
    }

    /// Apply a health probe result. Probes set status and timing but do
    /// not move the success/error counters.
    pub fn record_probe(&self, id: &str, result: &ProbeResult) {
        self.update(id, |m| {
            m.status = result.status();
            match result {
                ProbeResult::Healthy { latency_ms } | ProbeResult::Degraded { latency_ms } => {
                    m.response_time_ms = *latency_ms;
                    m.last_success = Some(Utc::now());
                }
                ProbeResult::Failure { error } => {
                    m.last_error = Some(error.to_string());
                    m.last_error_at = Some(Utc::now());
                }
            }
        });
    }

    /// Current status; `Unknown` for ids never registered.
    pub fn status_of(&self, id: &str) -> ServiceStatus {
        self.metrics
            .get(id)
            .map(|m| m.status)
            .unwrap_or(ServiceStatus::Unknown)
    }

    pub fn get(&self, id: &str) -> Option<ServiceMetrics> {
        self.metrics.get(id).map(|m| m.clone())
    }

    /// Copy of every entry, in registration order.
    pub fn snapshot(&self) -> Vec<ServiceMetrics> {
        let order = self.order.read().unwrap_or_else(PoisonError::into_inner);
        order
            .iter()
            .filter_map(|id| self.metrics.get(id).map(|m| m.clone()))
            .collect()
    }

    /// Restore one provider's entry to its initial state.
    ///
    /// Returns false if the id is not tracked.
    pub fn reset(&self, id: &str) -> bool {
        match self.metrics.get_mut(id) {
            Some(mut entry) => {
                *entry = ServiceMetrics::new(id);
                true
            }
            None => false,
        }
    }

    /// Restore every entry to its initial state.
    pub fn reset_all(&self) {
        for mut entry in self.metrics.iter_mut() {
            let id = entry.key().clone();
            *entry.value_mut() = ServiceMetrics::new(id);
        }
    }

    /// Number of providers currently healthy or degraded.
    pub fn available_count(&self) -> usize {
        self.metrics
            .iter()
            .filter(|m| matches!(m.status, ServiceStatus::Healthy | ServiceStatus::Degraded))
            .count()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut ServiceMetrics)) {
        match self.metrics.get_mut(id) {
            Some(mut entry) => f(entry.value_mut()),
            None => tracing::warn!(provider_id = id, "Metrics update for untracked provider"),
        }
    }
}
