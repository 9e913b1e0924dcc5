//! Provider factory: builds `ImageProvider` trait objects from descriptors.

use super::{
    doubao::{DoubaoProvider, DOUBAO_API_BASE_URL},
    is_placeholder_key,
    mock::MockProvider,
    openai::{OpenAiImageProvider, OPENAI_API_BASE_URL},
    placeholder::PlaceholderProvider,
    AgentError, ImageProvider,
};
use crate::registry::{ProviderDescriptor, ProviderKind};
use reqwest::Client;
use std::sync::Arc;

/// Create a provider adapter for a registry descriptor.
///
/// API providers require a usable `api_key`; an absent key or a template
/// value such as `your_api_key_here` is a configuration error. Doubao
/// additionally requires an endpoint id in `settings.model`.
///
/// # Examples
///
/// ```
/// use easel::agent::create_provider;
/// use easel::registry::{ProviderDescriptor, ProviderKind};
/// use reqwest::Client;
/// use std::sync::Arc;
///
/// let descriptor = ProviderDescriptor::new("mock", "Mock", ProviderKind::Mock, 5);
/// let provider = create_provider(&descriptor, None, Arc::new(Client::new())).unwrap();
///
/// assert_eq!(provider.id(), "mock");
/// ```
pub fn create_provider(
    descriptor: &ProviderDescriptor,
    api_key: Option<&str>,
    client: Arc<Client>,
) -> Result<Arc<dyn ImageProvider>, AgentError> {
    let settings = &descriptor.settings;
    let id = descriptor.id.clone();
    let name = descriptor.name.clone();

    match descriptor.kind {
        ProviderKind::Doubao => {
            let api_key = require_key(descriptor, api_key)?;
            let endpoint_id = settings
                .model
                .clone()
                .filter(|m| !m.trim().is_empty())
                .ok_or_else(|| {
                    AgentError::Configuration(format!(
                        "Provider '{}' requires an endpoint id (set `model` or DOUBAO_ENDPOINT_ID)",
                        descriptor.id
                    ))
                })?;
            let base_url = settings
                .endpoint
                .clone()
                .unwrap_or_else(|| DOUBAO_API_BASE_URL.to_string());

            Ok(Arc::new(DoubaoProvider::new(
                id,
                name,
                base_url,
                api_key,
                Some(endpoint_id),
                settings.timeout_ms,
                client,
            )))
        }
        ProviderKind::OpenAI => {
            let api_key = require_key(descriptor, api_key)?;
            let base_url = settings
                .endpoint
                .clone()
                .unwrap_or_else(|| OPENAI_API_BASE_URL.to_string());

            Ok(Arc::new(OpenAiImageProvider::new(
                id,
                name,
                base_url,
                api_key,
                settings.timeout_ms,
                client,
            )))
        }
        ProviderKind::Mock => Ok(Arc::new(MockProvider::new(
            id,
            name,
            settings.latency_ms,
            settings.seed,
        ))),
        ProviderKind::Placeholder => Ok(Arc::new(PlaceholderProvider::new(id, name))),
    }
}

fn require_key(descriptor: &ProviderDescriptor, api_key: Option<&str>) -> Result<String, AgentError> {
    match api_key {
        Some(key) if !is_placeholder_key(key) => Ok(key.trim().to_string()),
        Some(_) => Err(AgentError::Configuration(format!(
            "Provider '{}' API key is still a placeholder value",
            descriptor.id
        ))),
        None => Err(AgentError::Configuration(format!(
            "Provider '{}' requires an API key ('api_key' or 'api_key_env')",
            descriptor.id
        ))),
    }
}
