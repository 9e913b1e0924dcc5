//! Configuration for provider health probing.

use serde::{Deserialize, Serialize};

/// Configuration for the periodic health prober.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether the background prober runs
    pub enabled: bool,
    /// Seconds between probe rounds
    pub interval_seconds: u64,
    /// Timeout for each probe request
    pub timeout_seconds: u64,
    /// Probes slower than this mark the provider degraded
    pub degraded_threshold_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
            timeout_seconds: 10,
            degraded_threshold_ms: 5000,
        }
    }
}
