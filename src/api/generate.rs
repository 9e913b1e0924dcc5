//! Image generation endpoint handler.

use super::headers::DispatchHeaders;
use crate::api::{ApiError, AppState, ImageGenerationRequest};
use crate::dispatch::GenerationOutcome;
use crate::logging::{extract_status, request_id_from_headers, truncate_prompt};
use crate::storage::GeneratedImage;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// POST /v1/images/generations - Generate images through the fallback chain.
///
/// The client disconnecting or the server timeout firing drops this future,
/// which cancels the in-flight provider call.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ImageGenerationRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let start_time = Instant::now();
    let request_id = request_id_from_headers(&headers);
    let model_label = state
        .metrics_collector
        .model_label(request.model.as_deref())
        .to_string();

    info!(
        request_id = %request_id,
        prompt = %truncate_prompt(&request.prompt),
        size = request.size.as_deref().unwrap_or("default"),
        "Image generation request"
    );

    let result = state
        .manager
        .dispatch(&request, request_id.clone(), CancellationToken::new())
        .await;

    let elapsed = start_time.elapsed();
    let (status, error_message) = extract_status(&result);
    metrics::counter!("easel_requests_total",
        "model" => model_label,
        "status" => status
    )
    .increment(1);
    metrics::histogram!("easel_request_duration_seconds", "status" => status)
        .record(elapsed.as_secs_f64());

    match result {
        Ok(outcome) => {
            save_in_background(&state, &request, &outcome, elapsed.as_millis() as u64);

            let mut response = Json(&outcome.response).into_response();
            DispatchHeaders {
                provider_id: &outcome.provider_id,
                attempts: outcome.attempts,
                request_id: &outcome.request_id,
            }
            .inject_into(response.headers_mut());
            Ok(response)
        }
        Err(e) => {
            warn!(
                request_id = %request_id,
                error_type = status,
                error = error_message.as_deref().unwrap_or_default(),
                "Image generation failed"
            );
            Err(e.into())
        }
    }
}

/// Persist the generated images without holding up the response.
fn save_in_background(
    state: &Arc<AppState>,
    request: &ImageGenerationRequest,
    outcome: &GenerationOutcome,
    generation_time_ms: u64,
) {
    let images = GeneratedImage::from_outcome(request, outcome, generation_time_ms);
    if images.is_empty() {
        return;
    }

    let store = Arc::clone(&state.store);
    let request_id = outcome.request_id.clone();
    tokio::spawn(async move {
        for image in images {
            if let Err(e) = store.save_image(&image).await {
                warn!(
                    request_id = %request_id,
                    image_id = %image.id,
                    error = %e,
                    "Failed to save generated image"
                );
            }
        }
    });
}
