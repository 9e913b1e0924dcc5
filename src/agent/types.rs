//! Supporting types for provider operations.

use serde::{Deserialize, Serialize};

/// Result of a provider health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Provider is reachable and accepting requests.
    Healthy {
        /// Number of models the provider advertises (informational).
        model_count: usize,
    },

    /// Provider answered but reported a failure.
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy { .. })
    }
}

/// `GET /models` response shared by OpenAI-compatible providers.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelsResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// Pull a readable message out of a provider error body.
///
/// Handles `{"error": {"message": ...}}`, `{"error": "..."}` and
/// falls back to the raw body.
pub(crate) fn extract_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        let error = value.get("error")?;
        error
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| error.as_str())
            .map(str::to_string)
    });

    match message {
        Some(message) => message,
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => body.trim().to_string(),
    }
}
