//! Retry and fallback tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How dispatch retries and falls back. Also the `[fallback]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackStrategy {
    /// Attempts per provider before advancing
    pub max_retries: u32,
    /// Fixed pause between attempts on the same provider
    pub retry_delay_ms: u64,
    /// Advance to the next provider on a disqualifying failure
    pub auto_fallback: bool,
    /// Upper bound on a whole dispatch; 0 disables it
    pub deadline_seconds: u64,
}

impl Default for FallbackStrategy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            auto_fallback: true,
            deadline_seconds: 300,
        }
    }
}

impl FallbackStrategy {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_seconds > 0).then(|| Duration::from_secs(self.deadline_seconds))
    }
}
