//! Health command implementation

use crate::cli::output::{format_health_table, provider_views, ProviderView};
use crate::cli::HealthArgs;
use crate::dispatch::FallbackManager;
use crate::health::ServiceStatus;
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub providers: Vec<ProviderView>,
}

impl HealthReport {
    fn new(providers: Vec<ProviderView>) -> Self {
        let available = providers
            .iter()
            .filter(|p| matches!(p.status, ServiceStatus::Healthy | ServiceStatus::Degraded))
            .count();
        let status = match (available, providers.len()) {
            (a, t) if a == t && t > 0 => "healthy",
            (a, _) if a > 0 => "degraded",
            _ => "unhealthy",
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            providers,
        }
    }
}

/// Handle `easel health`: probe every enabled provider once.
pub async fn handle_health(
    args: &HealthArgs,
    manager: &FallbackManager,
) -> Result<String, Box<dyn std::error::Error>> {
    manager.health_prober().probe_all().await;
    let report = HealthReport::new(provider_views(manager, false));

    if args.json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let status = match report.status {
        "healthy" => "Healthy".green(),
        "degraded" => "Degraded".yellow(),
        _ => "Unhealthy".red(),
    };
    Ok(format!(
        "Status: {}\nVersion: {}\n\n{}",
        status,
        report.version,
        format_health_table(&report.providers)
    ))
}
