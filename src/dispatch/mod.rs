//! Dispatch loop.
//!
//! `FallbackManager` owns one request at a time per call: it selects a
//! provider, invokes it, retries on transient failure, and falls back to
//! lower-priority providers on disqualifying failure. Provider health is
//! shared across concurrent dispatches through `MetricsTracker`.

mod error;
mod strategy;


pub use error::*;
pub use strategy::*;

use crate::agent::{create_provider, AgentError, ImageProvider, ProviderMap};
use crate::api::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::config::EaselConfig;
use crate::fallback::{classify_reason, should_fallback, FallbackEvent, FallbackEventLog};
use crate::health::{
    HealthCheckConfig, HealthProber, MetricsTracker, ProbeGuard, ServiceMetrics, ServiceStatus,
};
use crate::logging::{generate_request_id, truncate_prompt};
use crate::registry::{ProviderDescriptor, ProviderRegistry};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A successful dispatch.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub response: ImageGenerationResponse,
    /// Provider that produced the response
    pub provider_id: String,
    /// Provider calls made, across all providers
    pub attempts: u32,
    pub request_id: String,
}

/// Observability view returned by `get_service_status`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatusReport {
    pub services: Vec<ServiceMetrics>,
    pub events: Vec<FallbackEvent>,
}

/// The dispatch engine.
///
/// Constructed explicitly and shared by reference (usually `Arc`); there is
/// no process-wide instance.
pub struct FallbackManager {
    registry: Arc<ProviderRegistry>,
    tracker: Arc<MetricsTracker>,
    events: FallbackEventLog,
    providers: Arc<ProviderMap>,
    /// Provider id -> why it cannot be used
    config_issues: BTreeMap<String, String>,
    strategy: FallbackStrategy,
    health_config: HealthCheckConfig,
    /// Start provider forced by `switch_to_service`
    pinned: RwLock<Option<String>>,
}

impl FallbackManager {
    /// Create a manager over `registry` using the given adapters.
    ///
    /// Any API provider without an adapter is recorded as a configuration
    /// issue.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        providers: ProviderMap,
        strategy: FallbackStrategy,
    ) -> Self {
        let all = registry.list_all();
        let tracker = Arc::new(MetricsTracker::new(all.iter().map(|d| d.id.clone())));

        let config_issues = all
            .iter()
            .filter(|d| !providers.contains_key(&d.id))
            .map(|d| (d.id.clone(), "no adapter configured".to_string()))
            .collect();

        Self {
            registry,
            tracker,
            events: FallbackEventLog::new(),
            providers: Arc::new(providers),
            config_issues,
            strategy,
            health_config: HealthCheckConfig::default(),
            pinned: RwLock::new(None),
        }
    }

    /// Build the registry and adapters described by `config`.
    ///
    /// Providers whose adapter cannot be built (missing key, placeholder
    /// key, missing endpoint id) stay registered and are reported as
    /// configuration issues instead of failing startup.
    pub fn from_config(
        config: &EaselConfig,
        client: Arc<reqwest::Client>,
    ) -> Result<Self, DispatchError> {
        let descriptors: Vec<ProviderDescriptor> =
            config.providers.iter().map(|p| p.to_descriptor()).collect();
        let registry = ProviderRegistry::from_descriptors(descriptors.clone())
            .map_err(|e| DispatchError::Configuration(e.to_string()))?;

        let mut providers: ProviderMap = HashMap::new();
        let mut issues = BTreeMap::new();
        for (provider_config, descriptor) in config.providers.iter().zip(&descriptors) {
            let api_key = provider_config.resolve_api_key();
            match create_provider(descriptor, api_key.as_deref(), Arc::clone(&client)) {
                Ok(adapter) => {
                    providers.insert(descriptor.id.clone(), adapter);
                }
                Err(e) => {
                    if descriptor.enabled {
                        warn!(provider_id = %descriptor.id, error = %e, "Provider is not usable");
                    }
                    issues.insert(descriptor.id.clone(), e.to_string());
                }
            }
        }

        let manager = Self::new(Arc::new(registry), providers, config.fallback.clone())
            .with_config_issues(issues)
            .with_health_config(config.health_check.clone());

        info!(
            providers = manager.registry.provider_count(),
            enabled = manager.registry.list_enabled().len(),
            "Fallback manager ready"
        );
        Ok(manager)
    }

    /// Replace the reason recorded for specific providers.
    pub fn with_config_issues(mut self, issues: BTreeMap<String, String>) -> Self {
        self.config_issues.extend(issues);
        self
    }

    pub fn with_health_config(mut self, config: HealthCheckConfig) -> Self {
        self.health_config = config;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn tracker(&self) -> &Arc<MetricsTracker> {
        &self.tracker
    }

    pub fn strategy(&self) -> &FallbackStrategy {
        &self.strategy
    }

    pub fn health_config(&self) -> &HealthCheckConfig {
        &self.health_config
    }

    /// Configuration problems of currently enabled providers.
    pub fn config_issues(&self) -> Vec<(String, String)> {
        self.registry
            .list_enabled()
            .into_iter()
            .filter_map(|d| {
                self.config_issues
                    .get(&d.id)
                    .map(|issue| (d.id.clone(), issue.clone()))
            })
            .collect()
    }

    /// A prober over this manager's providers and tracker.
    pub fn health_prober(&self) -> HealthProber {
        HealthProber::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.tracker),
            Arc::clone(&self.providers),
            self.health_config.clone(),
        )
    }

    /// Start periodic probing. The task runs until the guard is stopped or
    /// dropped.
    pub fn start_health_probe(&self) -> ProbeGuard {
        let cancel = CancellationToken::new();
        let handle = self.health_prober().start(cancel.clone());
        ProbeGuard::new(cancel, handle)
    }

    /// Generate images, falling back across providers as needed.
    pub async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<GenerationOutcome, DispatchError> {
        self.generate_image_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Like `generate_image`, aborting the in-flight call or retry pause as
    /// soon as `cancel` fires.
    pub async fn generate_image_with_cancel(
        &self,
        request: &ImageGenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationOutcome, DispatchError> {
        self.dispatch(request, generate_request_id(), cancel).await
    }

    /// Full dispatch with a caller-chosen correlation id, which is attached
    /// to log lines and fallback events.
    pub async fn dispatch(
        &self,
        request: &ImageGenerationRequest,
        request_id: String,
        cancel: CancellationToken,
    ) -> Result<GenerationOutcome, DispatchError> {
        request.validate().map_err(DispatchError::Validation)?;

        let enabled = self.registry.list_enabled();
        if enabled.is_empty() {
            warn!("Generation requested with no enabled providers");
            return Err(DispatchError::NoProviderAvailable);
        }
        self.preflight(&enabled)?;

        let started = Instant::now();
        let deadline = self.strategy.deadline().map(|d| started + d);
        let max_retries = self.strategy.max_retries.max(1);

        info!(
            request_id = %request_id,
            prompt = %truncate_prompt(&request.prompt),
            providers = enabled.len(),
            "Dispatching image generation"
        );

        let mut index = self.select_start(&enabled);
        let mut total_attempts = 0u32;
        let mut last_error: Option<AgentError> = None;

        loop {
            let descriptor = &enabled[index];
            let provider = self.adapter(descriptor)?;
            let selected_status = self.tracker.status_of(&descriptor.id);
            let mut attempt = 0u32;

            let failure = loop {
                attempt += 1;
                total_attempts += 1;
                debug!(
                    request_id = %request_id,
                    provider_id = %descriptor.id,
                    attempt,
                    "Invoking provider"
                );

                let call_start = Instant::now();
                let result = self
                    .guarded(
                        provider.generate(request),
                        &cancel,
                        deadline,
                        started,
                        &last_error,
                    )
                    .await?;
                let elapsed = call_start.elapsed();

                metrics::histogram!("easel_provider_latency_seconds",
                    "provider" => descriptor.id.clone()
                )
                .record(elapsed.as_secs_f64());

                match result {
                    Ok(response) => {
                        self.tracker
                            .record_success(&descriptor.id, elapsed.as_millis() as u64);
                        metrics::counter!("easel_generations_total",
                            "provider" => descriptor.id.clone(),
                            "status" => "success"
                        )
                        .increment(1);
                        info!(
                            request_id = %request_id,
                            provider_id = %descriptor.id,
                            attempts = total_attempts,
                            latency_ms = elapsed.as_millis() as u64,
                            "Image generation succeeded"
                        );
                        return Ok(GenerationOutcome {
                            response,
                            provider_id: descriptor.id.clone(),
                            attempts: total_attempts,
                            request_id,
                        });
                    }
                    Err(error) => {
                        let message = error.to_string();
                        self.tracker.record_failure(&descriptor.id, &message);
                        metrics::counter!("easel_generations_total",
                            "provider" => descriptor.id.clone(),
                            "status" => "failure"
                        )
                        .increment(1);
                        warn!(
                            request_id = %request_id,
                            provider_id = %descriptor.id,
                            attempt,
                            error = %message,
                            "Provider attempt failed"
                        );

                        let advance =
                            should_fallback(&message, attempt, max_retries, selected_status);
                        last_error = Some(error.clone());
                        if advance {
                            break error;
                        }

                        metrics::counter!("easel_retries_total",
                            "provider" => descriptor.id.clone()
                        )
                        .increment(1);
                        self.guarded(
                            tokio::time::sleep(self.strategy.retry_delay()),
                            &cancel,
                            deadline,
                            started,
                            &last_error,
                        )
                        .await?;
                    }
                }
            };

            let next = if self.strategy.auto_fallback {
                self.next_index(&enabled, index)
            } else {
                None
            };

            let Some(next) = next else {
                warn!(
                    request_id = %request_id,
                    provider_id = %descriptor.id,
                    attempts = total_attempts,
                    "No provider left to fall back to"
                );
                return Err(DispatchError::Exhausted {
                    provider_id: descriptor.id.clone(),
                    source: failure,
                });
            };

            let message = failure.to_string();
            let reason = classify_reason(&message);
            let to = &enabled[next];
            self.events.push(
                FallbackEvent::new(reason, &descriptor.id, &to.id)
                    .with_error(message)
                    .with_request_id(&request_id),
            );
            metrics::counter!("easel_fallbacks_total",
                "from" => descriptor.id.clone(),
                "to" => to.id.clone(),
                "reason" => reason.as_str()
            )
            .increment(1);
            info!(
                request_id = %request_id,
                from = %descriptor.id,
                to = %to.id,
                reason = %reason,
                "Falling back to next provider"
            );

            index = next;
        }
    }

    /// Metrics for every provider plus the recent fallback events.
    pub fn get_service_status(&self) -> ServiceStatusReport {
        ServiceStatusReport {
            services: self.tracker.snapshot(),
            events: self.events.get_all(),
        }
    }

    /// Reset one provider's metrics, or everything when `provider_id` is
    /// `None` (metrics, event log and any pin).
    ///
    /// Returns false if a given id is unknown.
    pub fn reset_service_status(&self, provider_id: Option<&str>) -> bool {
        match provider_id {
            Some(id) => {
                let found = self.tracker.reset(id);
                if found {
                    info!(provider_id = id, "Provider status reset");
                }
                found
            }
            None => {
                self.tracker.reset_all();
                self.events.clear();
                *self.pinned.write().unwrap_or_else(PoisonError::into_inner) = None;
                info!("All provider status reset");
                true
            }
        }
    }

    /// Make dispatch start at `provider_id`, regardless of its health,
    /// until the next full reset.
    ///
    /// Returns false for unknown or disabled providers.
    pub fn switch_to_service(&self, provider_id: &str) -> bool {
        let enabled = self
            .registry
            .list_enabled()
            .iter()
            .any(|d| d.id == provider_id);
        if !enabled {
            return false;
        }

        *self.pinned.write().unwrap_or_else(PoisonError::into_inner) =
            Some(provider_id.to_string());
        info!(provider_id, "Dispatch pinned to provider");
        true
    }

    /// Provider dispatch currently starts at, if pinned.
    pub fn pinned_service(&self) -> Option<String> {
        self.pinned
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn preflight(&self, enabled: &[ProviderDescriptor]) -> Result<(), DispatchError> {
        let problems: Vec<String> = enabled
            .iter()
            .filter_map(|d| {
                self.config_issues
                    .get(&d.id)
                    .map(|issue| format!("{}: {}", d.id, issue))
            })
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::Configuration(problems.join("; ")))
        }
    }

    fn adapter(
        &self,
        descriptor: &ProviderDescriptor,
    ) -> Result<&Arc<dyn ImageProvider>, DispatchError> {
        self.providers.get(&descriptor.id).ok_or_else(|| {
            DispatchError::Configuration(format!("{}: no adapter configured", descriptor.id))
        })
    }

    /// The pinned provider if any, else the first provider
    /// not known to be unhealthy, else the first one.
    fn select_start(&self, enabled: &[ProviderDescriptor]) -> usize {
        if let Some(pinned) = self.pinned_service() {
            if let Some(index) = enabled.iter().position(|d| d.id == pinned) {
                return index;
            }
        }

        enabled
            .iter()
            .position(|d| self.status_allows(&d.id))
            .unwrap_or(0)
    }

    /// First later provider not known to be unhealthy, else the next one.
    fn next_index(&self, enabled: &[ProviderDescriptor], current: usize) -> Option<usize> {
        let later = current + 1;
        if later >= enabled.len() {
            return None;
        }
        let preferred = enabled[later..]
            .iter()
            .position(|d| self.status_allows(&d.id))
            .map(|offset| later + offset);
        Some(preferred.unwrap_or(later))
    }

    fn status_allows(&self, id: &str) -> bool {
        self.tracker.status_of(id) != ServiceStatus::Unhealthy
    }

    /// Run `fut` unless the request is cancelled or its deadline passes.
    async fn guarded<F: Future>(
        &self,
        fut: F,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
        started: Instant,
        last_error: &Option<AgentError>,
    ) -> Result<F::Output, DispatchError> {
        let expiry = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Dispatch cancelled by caller");
                Err(DispatchError::Cancelled)
            }
            _ = expiry => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                warn!(elapsed_ms, "Dispatch deadline exceeded");
                Err(DispatchError::DeadlineExceeded {
                    elapsed_ms,
                    last_error: last_error.clone(),
                })
            }
            output = fut => Ok(output),
        }
    }
}
