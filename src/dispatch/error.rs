//! Dispatch errors and their client-facing classification.

use crate::agent::AgentError;
use serde::Serialize;
use thiserror::Error;

/// Terminal failure of a dispatch.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Missing or placeholder credentials; no provider was called.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bad request input; no provider was called.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No image provider available")]
    NoProviderAvailable,

    /// The last provider tried failed and no further provider remains.
    #[error("Provider '{provider_id}' failed: {source}")]
    Exhausted {
        provider_id: String,
        #[source]
        source: AgentError,
    },

    #[error("Dispatch deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded {
        elapsed_ms: u64,
        last_error: Option<AgentError>,
    },

    #[error("Dispatch cancelled")]
    Cancelled,
}

/// Machine-readable error category reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Authentication,
    Payment,
    RateLimit,
    UpstreamError,
    ServerError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Payment => "payment",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::ServerError => "server_error",
        }
    }

    /// Remediation hint shown alongside the error.
    pub fn suggestion(self) -> &'static str {
        match self {
            ErrorKind::Configuration => {
                "Set a valid API key (and endpoint id for Doubao) or disable the provider."
            }
            ErrorKind::Validation => "Please check the request parameters and try again.",
            ErrorKind::Authentication => "Please check your API key configuration.",
            ErrorKind::Payment => "Please check your account balance.",
            ErrorKind::RateLimit => "Please wait a moment before making another request.",
            ErrorKind::UpstreamError => "Please try again later.",
            ErrorKind::ServerError => {
                "Please try again later or contact support if the problem persists."
            }
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Configuration(_) => ErrorKind::Configuration,
            DispatchError::Validation(_) => ErrorKind::Validation,
            DispatchError::Exhausted { source, .. } => agent_error_kind(source),
            DispatchError::NoProviderAvailable
            | DispatchError::DeadlineExceeded { .. }
            | DispatchError::Cancelled => ErrorKind::ServerError,
        }
    }

    /// HTTP status used when this error is returned over the API.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::Configuration(_) => 500,
            DispatchError::Validation(_) => 400,
            DispatchError::NoProviderAvailable | DispatchError::Cancelled => 503,
            DispatchError::DeadlineExceeded { .. } => 504,
            DispatchError::Exhausted { source, .. } => match source {
                AgentError::Upstream { status, .. } if (400..600).contains(status) => *status,
                AgentError::Timeout(_) => 504,
                AgentError::Configuration(_) => 500,
                _ => 502,
            },
        }
    }

    pub fn suggestion(&self) -> &'static str {
        self.kind().suggestion()
    }
}

fn agent_error_kind(error: &AgentError) -> ErrorKind {
    match error {
        AgentError::Upstream { status: 401, .. } => ErrorKind::Authentication,
        AgentError::Upstream { status: 402, .. } => ErrorKind::Payment,
        AgentError::Upstream { status: 429, .. } => ErrorKind::RateLimit,
        AgentError::Configuration(_) => ErrorKind::Configuration,
        _ => ErrorKind::UpstreamError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exhausted(status: u16) -> DispatchError {
        DispatchError::Exhausted {
            provider_id: "doubao-primary".to_string(),
            source: AgentError::Upstream {
                status,
                message: "nope".to_string(),
            },
        }
    }

    #[test]
    fn upstream_statuses_map_to_kinds() {
        assert_eq!(exhausted(401).kind(), ErrorKind::Authentication);
        assert_eq!(exhausted(402).kind(), ErrorKind::Payment);
        assert_eq!(exhausted(429).kind(), ErrorKind::RateLimit);
        assert_eq!(exhausted(500).kind(), ErrorKind::UpstreamError);
        assert_eq!(exhausted(429).status_code(), 429);
    }

    #[test]
    fn suggestions_per_kind() {
        assert_eq!(exhausted(401).suggestion(), "Please check your API key configuration.");
        assert_eq!(exhausted(402).suggestion(), "Please check your account balance.");
        assert_eq!(
            exhausted(429).suggestion(),
            "Please wait a moment before making another request."
        );
        assert_eq!(exhausted(503).suggestion(), "Please try again later.");
    }

    #[test]
    fn local_errors_have_fixed_status() {
        assert_eq!(DispatchError::Validation("x".into()).status_code(), 400);
        assert_eq!(DispatchError::Configuration("x".into()).status_code(), 500);
        assert_eq!(DispatchError::NoProviderAvailable.status_code(), 503);
        assert_eq!(
            DispatchError::DeadlineExceeded {
                elapsed_ms: 1,
                last_error: None
            }
            .status_code(),
            504
        );
    }

    #[test]
    fn transport_failures_are_bad_gateway() {
        let err = DispatchError::Exhausted {
            provider_id: "p".into(),
            source: AgentError::Network("refused".into()),
        };
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
    }

    #[test]
    fn exhausted_display_includes_upstream_text() {
        let text = exhausted(503).to_string();
        assert!(text.contains("doubao-primary"));
        assert!(text.contains("503 Service Unavailable"));
    }
}
