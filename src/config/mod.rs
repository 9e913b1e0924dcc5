//! Configuration module for Easel
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`EASEL_*`, `DOUBAO_ENDPOINT_ID`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use easel::config::EaselConfig;
//!
//! let config = EaselConfig::default();
//! assert_eq!(config.server.port, 8000);
//! assert_eq!(config.fallback.max_retries, 3);
//!
//! let toml = r#"
//! [fallback]
//! retry_delay_ms = 250
//! "#;
//! let config: EaselConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.fallback.retry_delay_ms, 250);
//! assert_eq!(config.providers.len(), 4);
//! ```

pub mod error;
pub mod logging;
pub mod providers;
pub mod server;
pub mod storage;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use providers::{default_providers, ProviderConfig};
pub use server::ServerConfig;
pub use storage::{StorageBackend, StorageConfig};

pub use crate::dispatch::FallbackStrategy;
pub use crate::health::HealthCheckConfig;

use crate::registry::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Unified configuration for the Easel gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EaselConfig {
    pub server: ServerConfig,
    pub health_check: HealthCheckConfig,
    /// Retry and fallback behavior
    pub fallback: FallbackStrategy,
    pub providers: Vec<ProviderConfig>,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Default for EaselConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            health_check: HealthCheckConfig::default(),
            fallback: FallbackStrategy::default(),
            providers: default_providers(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EaselConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                toml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: p.to_path_buf(),
                    source,
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (current values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("EASEL_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("EASEL_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("EASEL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("EASEL_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(health) = std::env::var("EASEL_HEALTH_CHECK") {
            self.health_check.enabled = health.to_lowercase() == "true";
        }

        if let Ok(endpoint_id) = std::env::var("DOUBAO_ENDPOINT_ID") {
            let endpoint_id = endpoint_id.trim();
            if !endpoint_id.is_empty() {
                self.providers
                    .iter_mut()
                    .filter(|p| p.kind == ProviderKind::Doubao)
                    .for_each(|p| p.model = Some(endpoint_id.to_string()));
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        if self.fallback.max_retries == 0 {
            return Err(ConfigError::Validation {
                field: "fallback.max_retries".to_string(),
                message: "at least one attempt per provider is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if provider.id.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].id", i),
                    message: "id cannot be empty".to_string(),
                });
            }
            if !seen.insert(provider.id.as_str()) {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].id", i),
                    message: format!("duplicate provider id '{}'", provider.id),
                });
            }
            if provider.min_latency_ms > provider.max_latency_ms {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].min_latency_ms", i),
                    message: "min_latency_ms must not exceed max_latency_ms".to_string(),
                });
            }
        }

        if self.storage.backend == StorageBackend::File && self.storage.path.is_none() {
            return Err(ConfigError::MissingField("storage.path".to_string()));
        }

        Ok(())
    }
}
