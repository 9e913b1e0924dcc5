//! Gallery storage configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where generated image records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory only
    #[default]
    Memory,
    /// JSON file at `path`
    File,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
    /// Keep an in-memory copy when the primary store fails
    pub local_fallback: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: None,
            local_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert!(config.path.is_none());
        assert!(config.local_fallback);
    }

    #[test]
    fn test_storage_config_file_backend() {
        let config: StorageConfig = toml::from_str(
            r#"
            backend = "file"
            path = "/var/lib/easel/images.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, StorageBackend::File);
        assert_eq!(
            config.path.as_deref(),
            Some(std::path::Path::new("/var/lib/easel/images.json"))
        );
    }
}
