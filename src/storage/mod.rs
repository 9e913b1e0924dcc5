//! Gallery persistence for generated images.
//!
//! Storage is a collaborator of the HTTP surface, not of dispatch: saving
//! happens after a generation succeeds and its failures never turn into
//! generation failures.

mod error;
mod fallback;
mod file;
mod memory;

pub use error::StorageError;
pub use fallback::FallbackImageStore;
pub use file::FileImageStore;
pub use memory::MemoryImageStore;

use crate::api::types::ImageGenerationRequest;
use crate::config::{StorageBackend, StorageConfig};
use crate::dispatch::GenerationOutcome;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_DIMENSIONS: (u32, u32) = (1024, 1024);

/// One gallery entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: String,
    pub url: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Provider that produced the image
    pub model_version: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time_ms: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl GeneratedImage {
    /// A 1024x1024 record with a fresh id.
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: new_image_id(),
            url: url.into(),
            prompt: prompt.into(),
            negative_prompt: None,
            width: DEFAULT_DIMENSIONS.0,
            height: DEFAULT_DIMENSIONS.1,
            seed: None,
            model_version: "unknown".to_string(),
            created_at: Utc::now(),
            generation_time_ms: None,
            tags: Vec::new(),
            is_favorite: false,
        }
    }

    /// One record per returned image reference (URL or data URI).
    pub fn from_outcome(
        request: &ImageGenerationRequest,
        outcome: &GenerationOutcome,
        generation_time_ms: u64,
    ) -> Vec<Self> {
        let (width, height) = request.dimensions_or(DEFAULT_DIMENSIONS);
        outcome
            .response
            .image_refs()
            .into_iter()
            .map(|url| Self {
                width,
                height,
                negative_prompt: request.negative_prompt.clone(),
                seed: request.seed,
                model_version: outcome.provider_id.clone(),
                generation_time_ms: Some(generation_time_ms),
                ..Self::new(url, request.prompt.clone())
            })
            .collect()
    }
}

fn new_image_id() -> String {
    format!("img_{}", Uuid::new_v4().simple())
}

/// Gallery backend.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Insert or replace (by id) a record.
    async fn save_image(&self, image: &GeneratedImage) -> Result<(), StorageError>;

    /// Every record, newest first.
    async fn load_images(&self) -> Result<Vec<GeneratedImage>, StorageError>;

    /// Remove a record. Returns false if the id was not stored.
    async fn delete_image(&self, id: &str) -> Result<bool, StorageError>;
}

/// Build the configured store, wrapped in `FallbackImageStore` when
/// `local_fallback` is set.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn ImageStore>, StorageError> {
    let primary: Arc<dyn ImageStore> = match config.backend {
        StorageBackend::Memory => return Ok(Arc::new(MemoryImageStore::new())),
        StorageBackend::File => {
            let path = config.path.clone().ok_or_else(|| {
                StorageError::Unavailable("file backend requires storage.path".to_string())
            })?;
            Arc::new(FileImageStore::new(path))
        }
    };

    if config.local_fallback {
        Ok(Arc::new(FallbackImageStore::new(primary)))
    } else {
        Ok(primary)
    }
}
