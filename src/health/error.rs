//! Error types for health probing.

use crate::agent::AgentError;
use thiserror::Error;

/// Errors that can occur while probing a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthCheckError {
    /// Probe exceeded its timeout
    #[error("health probe timeout after {0}ms")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Provider answered with a failure
    #[error("provider reported unhealthy")]
    Unhealthy,

    /// Provider has no usable adapter (missing credentials or endpoint)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    ParseError(String),
}

impl HealthCheckError {
    pub fn from_agent_error(err: AgentError) -> Self {
        match err {
            AgentError::Timeout(ms) => HealthCheckError::Timeout(ms),
            AgentError::Network(message) => HealthCheckError::ConnectionFailed(message),
            AgentError::Configuration(message) => HealthCheckError::NotConfigured(message),
            AgentError::Upstream { .. } => HealthCheckError::Unhealthy,
            AgentError::InvalidResponse(message) => HealthCheckError::ParseError(message),
        }
    }
}
