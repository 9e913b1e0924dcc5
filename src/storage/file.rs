//! JSON-file gallery.
//!
//! The file holds `{"images": [...], "last_updated": "<rfc3339>"}`. Files
//! written by older builds contain a bare array of records; they are read
//! as-is and rewritten in the current layout on first load.

use super::memory::upsert_newest_first;
use super::{GeneratedImage, ImageStore, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize, Deserialize)]
struct GalleryFile {
    #[serde(default)]
    images: Vec<GeneratedImage>,
    last_updated: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredGallery {
    Current(GalleryFile),
    Legacy(Vec<GeneratedImage>),
}

/// Gallery persisted to a single JSON file.
///
/// All operations are read-modify-write under one async lock, so concurrent
/// saves from the same process never lose records.
pub struct FileImageStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileImageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<GeneratedImage>, StorageError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let stored: StoredGallery =
            serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        match stored {
            StoredGallery::Current(file) => Ok(file.images),
            StoredGallery::Legacy(images) => {
                info!(
                    path = %self.path.display(),
                    count = images.len(),
                    "Migrating legacy gallery file"
                );
                self.write(&images).await?;
                Ok(images)
            }
        }
    }

    async fn write(&self, images: &[GeneratedImage]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let body = serde_json::to_string_pretty(&GalleryFile {
            images: images.to_vec(),
            last_updated: Utc::now(),
        })?;

        // Write then rename so readers never see a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp.clone(),
                source,
            })?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = images.len(), "Gallery written");
        Ok(())
    }
}

#[async_trait]
impl ImageStore for FileImageStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn save_image(&self, image: &GeneratedImage) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut images = self.read().await?;
        upsert_newest_first(&mut images, image.clone());
        self.write(&images).await
    }

    async fn load_images(&self) -> Result<Vec<GeneratedImage>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut images = self.read().await?;
        images.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(images)
    }

    async fn delete_image(&self, id: &str) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;
        let mut images = self.read().await?;
        let before = images.len();
        images.retain(|img| img.id != id);
        if images.len() == before {
            warn!(image_id = id, "Delete requested for unknown image");
            return Ok(false);
        }
        self.write(&images).await?;
        Ok(true)
    }
}
