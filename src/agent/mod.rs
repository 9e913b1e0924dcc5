//! Provider abstraction layer.
//!
//! This module provides the `ImageProvider` trait and the adapters that
//! translate the gateway's image request into each upstream's wire format.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub mod doubao;
pub mod error;
pub mod factory;
pub mod mock;
pub mod openai;
pub mod placeholder;
pub mod types;

pub use error::AgentError;
pub use factory::create_provider;
pub use types::HealthStatus;

use crate::api::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::registry::ProviderKind;

/// Unified interface for all image generation providers.
///
/// This trait is object-safe and designed to be used as
/// `Arc<dyn ImageProvider>`. Dropping a `generate` future aborts any
/// in-flight HTTP request.
#[async_trait]
pub trait ImageProvider: Send + Sync + 'static {
    /// Registry id of the provider this adapter serves.
    fn id(&self) -> &str;

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Probe the provider.
    ///
    /// - `Ok(HealthStatus::Healthy)` if the provider answered normally
    /// - `Ok(HealthStatus::Unhealthy)` if it answered with an error
    /// - `Err(AgentError::Network | Timeout)` if it could not be reached
    ///
    /// Local providers are always healthy.
    async fn health_check(&self) -> Result<HealthStatus, AgentError> {
        Ok(HealthStatus::Healthy { model_count: 0 })
    }

    /// Generate images for an already-validated request.
    ///
    /// - `Err(AgentError::Upstream)` if the provider returned 4xx/5xx
    /// - `Err(AgentError::Timeout)` if the call exceeded the provider timeout
    /// - `Err(AgentError::InvalidResponse)` if the body was unusable or empty
    async fn generate(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, AgentError>;
}

/// Adapters keyed by provider id.
pub type ProviderMap = HashMap<String, Arc<dyn ImageProvider>>;

/// Placeholder fragments that mark a credential as unset.
const PLACEHOLDER_KEY_MARKERS: [&str; 2] = ["your_", "_here"];

/// True when `key` looks like an unedited template value.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || PLACEHOLDER_KEY_MARKERS.iter().any(|m| key.contains(m))
}

/// Short key prefix safe to log.
pub(crate) fn redact_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{}...", prefix)
}
