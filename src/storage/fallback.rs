//! Primary store with an in-memory safety net.

use super::memory::upsert_newest_first;
use super::{GeneratedImage, ImageStore, MemoryImageStore, StorageError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Writes go to the primary store; records the primary rejects are kept
/// locally so the gallery still shows them. Reads merge both sides.
pub struct FallbackImageStore {
    primary: Arc<dyn ImageStore>,
    local: MemoryImageStore,
}

impl FallbackImageStore {
    pub fn new(primary: Arc<dyn ImageStore>) -> Self {
        Self {
            primary,
            local: MemoryImageStore::new(),
        }
    }

    /// Records currently held only in memory.
    pub fn local_count(&self) -> usize {
        self.local.len()
    }
}

#[async_trait]
impl ImageStore for FallbackImageStore {
    fn backend(&self) -> &'static str {
        self.primary.backend()
    }

    async fn save_image(&self, image: &GeneratedImage) -> Result<(), StorageError> {
        if let Err(e) = self.primary.save_image(image).await {
            warn!(
                backend = self.primary.backend(),
                image_id = %image.id,
                error = %e,
                "Primary store rejected image, keeping it locally"
            );
            self.local.save_image(image).await?;
        }
        Ok(())
    }

    async fn load_images(&self) -> Result<Vec<GeneratedImage>, StorageError> {
        let local = self.local.load_images().await?;
        let mut images = match self.primary.load_images().await {
            Ok(images) => images,
            Err(e) => {
                warn!(
                    backend = self.primary.backend(),
                    error = %e,
                    "Primary store unreadable, serving local images only"
                );
                Vec::new()
            }
        };

        for image in local.into_iter().rev() {
            upsert_newest_first(&mut images, image);
        }
        images.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(images)
    }

    async fn delete_image(&self, id: &str) -> Result<bool, StorageError> {
        let local = self.local.delete_image(id).await?;
        match self.primary.delete_image(id).await {
            Ok(primary) => Ok(primary || local),
            Err(e) if local => {
                warn!(image_id = id, error = %e, "Primary delete failed");
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}
