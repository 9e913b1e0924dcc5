//! Health tracking for image providers.
//!
//! `MetricsTracker` holds the rolling per-provider status that dispatch
//! consults and updates; `HealthProber` refreshes it on a timer,
//! independently of request traffic.

mod config;
mod error;
mod state;
mod tracker;


pub use config::*;
pub use error::*;
pub use state::*;
pub use tracker::MetricsTracker;

use crate::agent::{HealthStatus, ProviderMap};
use crate::registry::{ProviderCategory, ProviderDescriptor, ProviderRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Response time recorded for providers that are never probed.
pub const LOCAL_PROVIDER_LATENCY_MS: u64 = 100;

/// Background service that periodically probes enabled providers.
#[derive(Clone)]
pub struct HealthProber {
    registry: Arc<ProviderRegistry>,
    tracker: Arc<MetricsTracker>,
    providers: Arc<ProviderMap>,
    config: HealthCheckConfig,
}

impl HealthProber {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        tracker: Arc<MetricsTracker>,
        providers: Arc<ProviderMap>,
        config: HealthCheckConfig,
    ) -> Self {
        Self {
            registry,
            tracker,
            providers,
            config,
        }
    }

    /// Probe a single provider without recording the result.
    ///
    /// Mock and placeholder providers are healthy by definition.
    pub async fn probe(&self, descriptor: &ProviderDescriptor) -> ProbeResult {
        if descriptor.category() != ProviderCategory::Api {
            return ProbeResult::Healthy {
                latency_ms: LOCAL_PROVIDER_LATENCY_MS,
            };
        }

        let Some(provider) = self.providers.get(&descriptor.id) else {
            return ProbeResult::Failure {
                error: HealthCheckError::NotConfigured(
                    "missing credentials or endpoint".to_string(),
                ),
            };
        };

        let timeout_ms = self.config.timeout_seconds.saturating_mul(1000);
        let start = Instant::now();
        let outcome =
            tokio::time::timeout(Duration::from_millis(timeout_ms), provider.health_check()).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Err(_) => ProbeResult::Failure {
                error: HealthCheckError::Timeout(timeout_ms),
            },
            Ok(Ok(HealthStatus::Healthy { .. })) if latency_ms > self.config.degraded_threshold_ms => {
                ProbeResult::Degraded { latency_ms }
            }
            Ok(Ok(HealthStatus::Healthy { .. })) => ProbeResult::Healthy { latency_ms },
            Ok(Ok(HealthStatus::Unhealthy)) => ProbeResult::Failure {
                error: HealthCheckError::Unhealthy,
            },
            Ok(Err(e)) => ProbeResult::Failure {
                error: HealthCheckError::from_agent_error(e),
            },
        }
    }

    /// Probe every enabled provider once and record the results.
    pub async fn probe_all(&self) -> Vec<(String, ProbeResult)> {
        let enabled = self.registry.list_enabled();
        let mut results = Vec::with_capacity(enabled.len());

        for descriptor in enabled {
            let result = self.probe(&descriptor).await;
            let previous = self.tracker.status_of(&descriptor.id);
            self.tracker.record_probe(&descriptor.id, &result);

            let current = result.status();
            if previous != current {
                tracing::info!(
                    provider_id = %descriptor.id,
                    old_status = %previous,
                    new_status = %current,
                    "Provider status changed"
                );
            }
            if let ProbeResult::Failure { error } = &result {
                tracing::warn!(provider_id = %descriptor.id, error = %error, "Health probe failed");
            }

            results.push((descriptor.id, result));
        }

        results
    }

    /// Start the prober background task.
    /// Returns a JoinHandle that resolves when the prober stops.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = Duration::from_secs(self.config.interval_seconds.max(1));
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = self.config.interval_seconds,
                "Health prober started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Health prober shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let results = self.probe_all().await;
                        tracing::debug!(
                            providers_probed = results.len(),
                            "Health probe cycle completed"
                        );
                    }
                }
            }
        })
    }
}

/// Owns a running prober task. Dropping the guard cancels the task;
/// `stop` cancels it and waits for it to finish.
pub struct ProbeGuard {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProbeGuard {
    pub fn new(cancel: CancellationToken, handle: JoinHandle<()>) -> Self {
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Health prober task ended abnormally");
            }
        }
    }
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
