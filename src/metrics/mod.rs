//! # Metrics
//!
//! Prometheus export of dispatch activity.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `easel_requests_total{model, status}` - HTTP generation requests
//! - `easel_generations_total{provider, status}` - Provider calls
//! - `easel_retries_total{provider}` - Same-provider retries
//! - `easel_fallbacks_total{from, to, reason}` - Provider advances
//!
//! **Histograms:**
//! - `easel_request_duration_seconds{status}` - Whole-request duration
//! - `easel_provider_latency_seconds{provider}` - Single provider call
//!
//! **Gauges (computed at scrape time):**
//! - `easel_providers_total` - Registered providers
//! - `easel_providers_healthy` - Providers currently healthy or degraded

pub mod handler;

pub use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::dispatch::FallbackManager;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// `model` label for requests that name no model.
pub const DEFAULT_MODEL_LABEL: &str = "default";
/// `model` label for requests naming a model no provider is configured for.
pub const OTHER_MODEL_LABEL: &str = "other";

/// Computes scrape-time gauges and renders the Prometheus text output.
pub struct MetricsCollector {
    manager: Arc<FallbackManager>,
    start_time: Instant,
    /// Configured model name -> label value. Fixed at construction so
    /// client input never adds series.
    model_labels: HashMap<String, String>,
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        manager: Arc<FallbackManager>,
        start_time: Instant,
        prometheus_handle: PrometheusHandle,
    ) -> Self {
        let model_labels = manager
            .registry()
            .list_all()
            .into_iter()
            .flat_map(|d| d.settings.models.into_iter().chain(d.settings.model))
            .map(|model| {
                let label = sanitize_label(&model);
                (model, label)
            })
            .collect();

        Self {
            manager,
            start_time,
            model_labels,
            prometheus_handle,
        }
    }

    /// Label value for a request's `model`.
    ///
    /// Only models some provider is configured with get their own value;
    /// anything else collapses to `other`.
    pub fn model_label(&self, model: Option<&str>) -> &str {
        match model {
            None => DEFAULT_MODEL_LABEL,
            Some(model) => self
                .model_labels
                .get(model)
                .map(String::as_str)
                .unwrap_or(OTHER_MODEL_LABEL),
        }
    }

    /// Refresh provider gauges from the registry and tracker.
    pub fn update_provider_gauges(&self) {
        let total = self.manager.registry().provider_count();
        let available = self.manager.tracker().available_count();
        metrics::gauge!("easel_providers_total").set(total as f64);
        metrics::gauge!("easel_providers_healthy").set(available as f64);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Reduce a configured name to `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn sanitize_label(label: &str) -> String {
    let mut sanitized: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if sanitized.is_empty() || sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized.insert(0, '_');
    }
    sanitized
}

/// Install the global Prometheus recorder.
///
/// Latency buckets are in seconds and sized for image generation, which
/// routinely takes several seconds and is capped by the dispatch deadline.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let latency_buckets = &[0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("easel_provider_latency_seconds".to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full("easel_request_duration_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Install the global recorder, or build a detached handle when one is
/// already installed (several servers in one process, e.g. under test).
pub fn metrics_handle() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Metrics recorder already installed, using detached handle");
        PrometheusBuilder::new().build_recorder().handle()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::FallbackStrategy;
    use crate::registry::{ProviderDescriptor, ProviderKind, ProviderRegistry, ProviderSettings};

    fn collector() -> MetricsCollector {
        let registry = ProviderRegistry::new();
        registry
            .add_provider(
                ProviderDescriptor::new("openai-dalle", "OpenAI", ProviderKind::OpenAI, 2)
                    .with_settings(ProviderSettings {
                        models: vec!["dall-e-3".to_string(), "dall-e-2".to_string()],
                        ..ProviderSettings::default()
                    }),
            )
            .unwrap();
        registry
            .add_provider(
                ProviderDescriptor::new("doubao-primary", "Doubao", ProviderKind::Doubao, 1)
                    .with_settings(ProviderSettings {
                        model: Some("ep-2024/v1".to_string()),
                        ..ProviderSettings::default()
                    }),
            )
            .unwrap();
        let manager = FallbackManager::new(
            Arc::new(registry),
            HashMap::new(),
            FallbackStrategy::default(),
        );
        MetricsCollector::new(
            Arc::new(manager),
            Instant::now(),
            PrometheusBuilder::new().build_recorder().handle(),
        )
    }

    #[test]
    fn test_sanitize_keeps_valid_labels() {
        assert_eq!(sanitize_label("dall_e_3"), "dall_e_3");
        assert_eq!(sanitize_label("Seedream"), "Seedream");
    }

    #[test]
    fn test_sanitize_replaces_invalid_chars() {
        assert_eq!(sanitize_label("dall-e-3"), "dall_e_3");
        assert_eq!(sanitize_label("ep-2024/v1"), "ep_2024_v1");
        assert_eq!(sanitize_label("3d"), "_3d");
        assert_eq!(sanitize_label(""), "_");
    }

    #[test]
    fn test_configured_models_get_their_own_label() {
        let collector = collector();
        assert_eq!(collector.model_label(Some("dall-e-3")), "dall_e_3");
        assert_eq!(collector.model_label(Some("ep-2024/v1")), "ep_2024_v1");
        assert_eq!(collector.model_label(None), DEFAULT_MODEL_LABEL);
    }

    #[test]
    fn test_unknown_models_share_one_label() {
        let collector = collector();
        assert_eq!(collector.model_label(Some("made-up-1")), OTHER_MODEL_LABEL);
        assert_eq!(collector.model_label(Some("made-up-2")), OTHER_MODEL_LABEL);
        assert_eq!(collector.model_labels.len(), 3);
    }

    #[test]
    fn test_uptime_starts_near_zero() {
        assert!(collector().uptime_seconds() < 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_sanitized_label_is_valid(input in "\\PC{0,40}") {
                let sanitized = sanitize_label(&input);
                let first = sanitized.chars().next().unwrap();
                prop_assert!(first.is_ascii_alphabetic() || first == '_');
                prop_assert!(sanitized.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            }

            #[test]
            fn prop_sanitize_is_idempotent(input in "[a-zA-Z0-9_:\\-./@]{1,30}") {
                let once = sanitize_label(&input);
                let twice = sanitize_label(&once);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_client_model_labels_are_bounded(model in "\\PC{1,40}") {
                let collector = collector();
                let label = collector.model_label(Some(&model)).to_string();
                prop_assert!(
                    label == OTHER_MODEL_LABEL
                        || collector.model_labels.values().any(|v| *v == label)
                );
            }
        }
    }
}
