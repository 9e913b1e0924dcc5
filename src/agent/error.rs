//! Error types for provider operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to an image provider.
///
/// The `Display` output is what the fallback policy inspects, so upstream
/// errors carry both the numeric status and its reason phrase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Provider error {status} {}: {message}", reason_phrase(.status))]
    Upstream { status: u16, message: String },

    /// Provider response doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider configuration error (missing key, endpoint id, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AgentError {
    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AgentError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Map a reqwest transport error, keeping timeouts distinct.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            AgentError::Timeout(timeout_ms)
        } else {
            AgentError::Network(err.to_string())
        }
    }
}

fn reason_phrase(status: &u16) -> &'static str {
    StatusCode::from_u16(*status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}
