//! Gallery stores built from configuration, exercised against a real
//! filesystem.

use chrono::{Duration, Utc};
use easel::config::{StorageBackend, StorageConfig};
use easel::storage::{self, FileImageStore, GeneratedImage, ImageStore};
use tempfile::TempDir;

fn image(prompt: &str, age_secs: i64) -> GeneratedImage {
    let mut image = GeneratedImage::new(format!("https://cdn.test/{}.png", prompt), prompt);
    image.created_at = Utc::now() - Duration::seconds(age_secs);
    image
}

fn file_config(path: std::path::PathBuf, local_fallback: bool) -> StorageConfig {
    StorageConfig {
        backend: StorageBackend::File,
        path: Some(path),
        local_fallback,
    }
}

#[tokio::test]
async fn file_backend_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gallery").join("images.json");

    let store = storage::from_config(&file_config(path.clone(), false)).unwrap();
    assert_eq!(store.backend(), "file");
    store.save_image(&image("old", 60)).await.unwrap();
    store.save_image(&image("new", 0)).await.unwrap();

    let reopened = FileImageStore::new(&path);
    let images = reopened.load_images().await.unwrap();
    let prompts: Vec<_> = images.iter().map(|i| i.prompt.as_str()).collect();
    assert_eq!(prompts, vec!["new", "old"]);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw["last_updated"].is_string());
    assert_eq!(raw["images"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn legacy_array_file_is_migrated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("images.json");
    let legacy = vec![image("legacy", 10)];
    std::fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

    let store = FileImageStore::new(&path);
    let images = store.load_images().await.unwrap();
    assert_eq!(images, legacy);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.is_object());
    assert_eq!(raw["images"][0]["prompt"], "legacy");
}

#[tokio::test]
async fn unwritable_path_falls_back_to_memory() {
    let dir = TempDir::new().unwrap();
    // A regular file where a directory is expected makes every write fail
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("images.json");

    let store = storage::from_config(&file_config(path, true)).unwrap();
    let saved = image("kept", 0);
    store.save_image(&saved).await.unwrap();

    let images = store.load_images().await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].id, saved.id);

    assert!(store.delete_image(&saved.id).await.unwrap());
    assert!(store.load_images().await.unwrap().is_empty());
}

#[tokio::test]
async fn unwritable_path_without_fallback_errors() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let store = storage::from_config(&file_config(blocker.join("images.json"), false)).unwrap();
    assert!(store.save_image(&image("lost", 0)).await.is_err());
}

#[test]
fn file_backend_without_path_is_rejected() {
    let config = StorageConfig {
        backend: StorageBackend::File,
        path: None,
        local_fallback: true,
    };
    assert!(storage::from_config(&config).is_err());
}
