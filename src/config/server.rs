//! Server configuration

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on one HTTP request, including the whole dispatch
    pub request_timeout_seconds: u64,
    /// Request body limit; large enough for a base64 source image
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_seconds: 330,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}
