//! In-process gallery.

use super::{GeneratedImage, ImageStore, StorageError};
use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

/// Gallery kept in process memory, newest first.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: RwLock<Vec<GeneratedImage>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn save_image(&self, image: &GeneratedImage) -> Result<(), StorageError> {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        upsert_newest_first(&mut images, image.clone());
        Ok(())
    }

    async fn load_images(&self) -> Result<Vec<GeneratedImage>, StorageError> {
        Ok(self
            .images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn delete_image(&self, id: &str) -> Result<bool, StorageError> {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        let before = images.len();
        images.retain(|img| img.id != id);
        Ok(images.len() != before)
    }
}

/// Replace any record with the same id, then put `image` at the front.
pub(super) fn upsert_newest_first(images: &mut Vec<GeneratedImage>, image: GeneratedImage) {
    images.retain(|img| img.id != image.id);
    images.insert(0, image);
}
