use serde::{Deserialize, Serialize};

/// Default per-call timeout for API providers.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default simulated latency window for the mock provider.
pub const DEFAULT_MOCK_LATENCY_MS: (u64, u64) = (1000, 3000);

/// Which adapter implementation serves a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Doubao Seedream image API (Volcengine Ark)
    Doubao,
    /// OpenAI DALL-E image API
    OpenAI,
    /// Deterministic local stand-in, no network I/O
    Mock,
    /// Synthesized placeholder image URL, always succeeds
    Placeholder,
}

/// Coarse provider category used by the prober and the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCategory {
    Api,
    Mock,
    Placeholder,
}

impl ProviderKind {
    pub fn category(self) -> ProviderCategory {
        match self {
            ProviderKind::Doubao | ProviderKind::OpenAI => ProviderCategory::Api,
            ProviderKind::Mock => ProviderCategory::Mock,
            ProviderKind::Placeholder => ProviderCategory::Placeholder,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Doubao => "doubao",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Mock => "mock",
            ProviderKind::Placeholder => "placeholder",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-specific settings carried by a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the upstream API (API providers only)
    pub endpoint: Option<String>,
    /// Model or endpoint id forced for every request
    pub model: Option<String>,
    /// Model identifiers this provider accepts
    pub models: Vec<String>,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
    /// Seed for the mock provider's random source
    pub seed: Option<u64>,
    /// Inclusive simulated latency window for the mock provider
    pub latency_ms: (u64, u64),
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            models: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            seed: None,
            latency_ms: DEFAULT_MOCK_LATENCY_MS,
        }
    }
}

/// A candidate image-generation service.
///
/// Descriptors are immutable after load apart from the operator toggles
/// `enabled` and `priority`, which go through [`super::ProviderRegistry`].
///
/// # Examples
///
/// ```
/// use easel::registry::{ProviderCategory, ProviderDescriptor, ProviderKind};
///
/// let provider = ProviderDescriptor::new("mock-service", "Mock", ProviderKind::Mock, 5);
/// assert!(provider.enabled);
/// assert_eq!(provider.category(), ProviderCategory::Mock);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique identifier (e.g., "doubao-primary")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Adapter implementation
    pub kind: ProviderKind,
    /// Disabled providers are never selected
    pub enabled: bool,
    /// Lower = tried first
    pub priority: i32,
    /// Adapter-specific configuration
    pub settings: ProviderSettings,
}

impl ProviderDescriptor {
    /// Create an enabled descriptor with default settings.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: ProviderKind,
        priority: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            enabled: true,
            priority,
            settings: ProviderSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ProviderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn category(&self) -> ProviderCategory {
        self.kind.category()
    }
}
