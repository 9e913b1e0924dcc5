//! Provider status and operator control endpoints.

use crate::api::{
    ApiError, AppState, ResetServiceRequest, SwitchServiceRequest, SwitchServiceResponse,
};
use crate::dispatch::ServiceStatusReport;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// GET /v1/services/status - Per-provider metrics and recent fallback events.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatusReport> {
    Json(state.manager.get_service_status())
}

/// POST /v1/services/reset - Reset one provider, or all when no
/// `service_id` is given.
///
/// Only an empty body resets everything. A body that is not a valid
/// `ResetServiceRequest` is rejected rather than read as "reset all".
pub async fn reset(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let service_id = parse_reset_body(&body)?.service_id;

    if !state.manager.reset_service_status(service_id.as_deref()) {
        let id = service_id.unwrap_or_default();
        return Err(ApiError::not_found(&format!("Unknown service '{}'", id)));
    }

    info!(service_id = service_id.as_deref().unwrap_or("all"), "Service status reset via API");
    Ok(Json(json!({ "reset": service_id.unwrap_or_else(|| "all".to_string()) })))
}

fn parse_reset_body(body: &[u8]) -> Result<ResetServiceRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResetServiceRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError::new(
            400,
            "validation",
            &format!("Invalid reset request body: {}", e),
            Some("Send {\"service_id\": \"<id>\"} or an empty body to reset all."),
        )
    })
}

/// POST /v1/services/switch - Pin dispatch to start at a provider.
///
/// Responds `{"switched": false}` with 404 for unknown or disabled ids.
pub async fn switch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SwitchServiceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SwitchServiceResponse>), ApiError> {
    let Json(request) = payload?;
    let switched = state.manager.switch_to_service(&request.service_id);
    let status = if switched {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(SwitchServiceResponse { switched })))
}
