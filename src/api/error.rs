//! Conversion of internal failures into API error envelopes.

use super::types::ApiError;
use crate::dispatch::DispatchError;
use crate::storage::StorageError;
use axum::extract::rejection::JsonRejection;

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        ApiError::new(
            error.status_code(),
            error.kind().as_str(),
            &error.to_string(),
            Some(error.suggestion()),
        )
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        ApiError::internal(&error.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            400,
            "validation",
            &rejection.body_text(),
            Some("Check your request body and try again."),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentError;

    #[test]
    fn test_validation_maps_to_400() {
        let api: ApiError = DispatchError::Validation("Prompt is required".to_string()).into();
        assert_eq!(api.status, 400);
        assert_eq!(api.error.r#type, "validation");
        assert!(api.error.suggestion.is_some());
    }

    #[test]
    fn test_exhausted_passes_upstream_status() {
        let api: ApiError = DispatchError::Exhausted {
            provider_id: "doubao-primary".to_string(),
            source: AgentError::Upstream {
                status: 402,
                message: "insufficient balance".to_string(),
            },
        }
        .into();
        assert_eq!(api.status, 402);
        assert_eq!(api.error.r#type, "payment");
        assert!(api.error.message.contains("insufficient balance"));
    }

    #[test]
    fn test_no_provider_maps_to_503() {
        let api: ApiError = DispatchError::NoProviderAvailable.into();
        assert_eq!(api.status, 503);
        assert_eq!(api.error.r#type, "server_error");
    }

    #[test]
    fn test_storage_error_is_internal() {
        let api: ApiError = StorageError::Unavailable("disk gone".to_string()).into();
        assert_eq!(api.status, 500);
    }
}
