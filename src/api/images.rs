//! Gallery endpoints.

use crate::api::{ApiError, AppState};
use crate::storage::GeneratedImage;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ImageList {
    pub total: usize,
    pub images: Vec<GeneratedImage>,
}

/// GET /v1/images - Saved images, newest first.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<ImageList>, ApiError> {
    let images = state.store.load_images().await?;
    Ok(Json(ImageList {
        total: images.len(),
        images,
    }))
}

/// DELETE /v1/images/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete_image(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(&format!("Image '{}' not found", id)))
    }
}
