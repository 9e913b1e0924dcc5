//! Provider configuration

use crate::agent::doubao::DOUBAO_API_BASE_URL;
use crate::agent::openai::OPENAI_API_BASE_URL;
use crate::registry::{
    ProviderDescriptor, ProviderKind, ProviderSettings, DEFAULT_MOCK_LATENCY_MS,
    DEFAULT_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};

/// One `[[providers]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    /// Display name; defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Upstream model; for Doubao, the inference endpoint id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Inline key; prefer `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Seed for the mock provider's random source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    50
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_min_latency_ms() -> u64 {
    DEFAULT_MOCK_LATENCY_MS.0
}

fn default_max_latency_ms() -> u64 {
    DEFAULT_MOCK_LATENCY_MS.1
}

impl ProviderConfig {
    /// A provider entry with defaults for everything but identity.
    pub fn new(id: impl Into<String>, kind: ProviderKind, priority: i32) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            enabled: true,
            priority,
            endpoint: None,
            model: None,
            models: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_key: None,
            api_key_env: None,
            seed: None,
            min_latency_ms: DEFAULT_MOCK_LATENCY_MS.0,
            max_latency_ms: DEFAULT_MOCK_LATENCY_MS.1,
        }
    }

    pub fn to_descriptor(&self) -> ProviderDescriptor {
        let descriptor = ProviderDescriptor::new(
            self.id.clone(),
            self.name.clone().unwrap_or_else(|| self.id.clone()),
            self.kind,
            self.priority,
        )
        .with_settings(ProviderSettings {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            models: self.models.clone(),
            timeout_ms: self.timeout_ms,
            seed: self.seed,
            latency_ms: (self.min_latency_ms, self.max_latency_ms),
        });

        if self.enabled {
            descriptor
        } else {
            descriptor.disabled()
        }
    }

    /// Env var holding this provider's key.
    pub fn key_env_var(&self) -> Option<&str> {
        self.api_key_env.as_deref().or(match self.kind {
            ProviderKind::Doubao => Some("DOUBAO_API_KEY"),
            ProviderKind::OpenAI => Some("OPENAI_API_KEY"),
            ProviderKind::Mock | ProviderKind::Placeholder => None,
        })
    }

    /// Inline `api_key`, else the value of the key env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(key.clone());
        }
        self.key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Provider list used when the config file defines none.
pub fn default_providers() -> Vec<ProviderConfig> {
    let mut doubao = ProviderConfig::new("doubao-primary", ProviderKind::Doubao, 1);
    doubao.name = Some("Doubao Seedream".to_string());
    doubao.endpoint = Some(DOUBAO_API_BASE_URL.to_string());
    doubao.models = vec![
        "Doubao-Seedream-4.0".to_string(),
        "Doubao-SeedEdit-3.0-i2i".to_string(),
    ];
    doubao.api_key_env = Some("DOUBAO_API_KEY".to_string());

    let mut openai = ProviderConfig::new("openai-dalle", ProviderKind::OpenAI, 2);
    openai.name = Some("OpenAI DALL-E".to_string());
    openai.enabled = false;
    openai.endpoint = Some(OPENAI_API_BASE_URL.to_string());
    openai.models = vec!["dall-e-3".to_string(), "dall-e-2".to_string()];
    openai.timeout_ms = 60_000;
    openai.api_key_env = Some("OPENAI_API_KEY".to_string());

    let mut mock = ProviderConfig::new("mock-service", ProviderKind::Mock, 5);
    mock.name = Some("Mock Service".to_string());

    let mut placeholder = ProviderConfig::new("placeholder-service", ProviderKind::Placeholder, 6);
    placeholder.name = Some("Placeholder Service".to_string());

    vec![doubao, openai, mock, placeholder]
}
