//! Retry-versus-advance decision and failure classification.
//!
//! Both functions work on error text so that any adapter error, structured
//! or not, can be classified the same way.

use crate::health::ServiceStatus;
use serde::{Deserialize, Serialize};

/// Error fragments that are never worth a same-provider retry.
pub const IMMEDIATE_FAILURE_PATTERNS: [&str; 5] = [
    "authentication",
    "unauthorized",
    "payment required",
    "forbidden",
    "not found",
];

/// Why dispatch moved from one provider to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Timeout,
    RateLimit,
    ServiceUnavailable,
    AuthenticationError,
    PaymentError,
    ApiError,
}

impl FallbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackReason::Timeout => "timeout",
            FallbackReason::RateLimit => "rate_limit",
            FallbackReason::ServiceUnavailable => "service_unavailable",
            FallbackReason::AuthenticationError => "authentication_error",
            FallbackReason::PaymentError => "payment_error",
            FallbackReason::ApiError => "api_error",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether to leave the current provider.
///
/// Returns true (advance) when local retries are used up, when the provider
/// was already unhealthy, or when the error is a non-transient failure.
/// Returns false when another attempt on the same provider is worthwhile.
///
/// ```
/// use easel::fallback::should_fallback;
/// use easel::health::ServiceStatus;
///
/// assert!(!should_fallback("503 Service Unavailable", 1, 3, ServiceStatus::Healthy));
/// assert!(should_fallback("503 Service Unavailable", 3, 3, ServiceStatus::Healthy));
/// assert!(should_fallback("401 Unauthorized", 1, 3, ServiceStatus::Healthy));
/// ```
pub fn should_fallback(
    error: &str,
    retry_count: u32,
    max_retries: u32,
    status: ServiceStatus,
) -> bool {
    if retry_count >= max_retries {
        return true;
    }

    if status == ServiceStatus::Unhealthy {
        return true;
    }

    is_immediate_failure(error)
}

/// True when the error matches a non-transient pattern.
pub fn is_immediate_failure(error: &str) -> bool {
    let error = error.to_lowercase();
    IMMEDIATE_FAILURE_PATTERNS
        .iter()
        .any(|pattern| error.contains(pattern))
}

/// Map error text to a `FallbackReason`. First match wins.
pub fn classify_reason(error: &str) -> FallbackReason {
    let error = error.to_lowercase();
    let has = |needle: &str| error.contains(needle);

    if has("timeout") {
        FallbackReason::Timeout
    } else if has("rate limit") || has("429") {
        FallbackReason::RateLimit
    } else if has("500") || has("503") {
        FallbackReason::ServiceUnavailable
    } else if has("401") || has("unauthorized") {
        FallbackReason::AuthenticationError
    } else if has("402") || has("payment") {
        FallbackReason::PaymentError
    } else {
        FallbackReason::ApiError
    }
}
