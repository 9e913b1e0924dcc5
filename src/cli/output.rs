//! Output formatting helpers for CLI commands

use crate::dispatch::FallbackManager;
use crate::health::{ServiceMetrics, ServiceStatus};
use crate::registry::ProviderDescriptor;
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

/// View model for provider display
#[derive(Debug, Clone, Serialize)]
pub struct ProviderView {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub enabled: bool,
    pub priority: i32,
    pub status: ServiceStatus,
    pub response_time_ms: u64,
    pub success_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ProviderView {
    pub fn new(
        descriptor: &ProviderDescriptor,
        metrics: Option<&ServiceMetrics>,
        issue: Option<String>,
    ) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            kind: descriptor.kind.to_string(),
            enabled: descriptor.enabled,
            priority: descriptor.priority,
            status: metrics.map(|m| m.status).unwrap_or(ServiceStatus::Unknown),
            response_time_ms: metrics.map(|m| m.response_time_ms).unwrap_or(0),
            success_rate: metrics.map(|m| m.success_rate).unwrap_or(100.0),
            issue,
            last_error: metrics.and_then(|m| m.last_error.clone()),
        }
    }
}

/// Views for the manager's providers, sorted by priority.
pub fn provider_views(manager: &FallbackManager, include_disabled: bool) -> Vec<ProviderView> {
    let descriptors = if include_disabled {
        let mut all = manager.registry().list_all();
        all.sort_by_key(|d| d.priority);
        all
    } else {
        manager.registry().list_enabled()
    };
    let issues = manager.config_issues();

    descriptors
        .iter()
        .map(|d| {
            let metrics = manager.tracker().get(&d.id);
            let issue = issues
                .iter()
                .find(|(id, _)| id == &d.id)
                .map(|(_, issue)| issue.clone());
            ProviderView::new(d, metrics.as_ref(), issue)
        })
        .collect()
}

pub fn colored_status(status: ServiceStatus) -> ColoredString {
    match status {
        ServiceStatus::Healthy => "Healthy".green(),
        ServiceStatus::Degraded => "Degraded".yellow(),
        ServiceStatus::Unhealthy => "Unhealthy".red(),
        ServiceStatus::Unknown => "Unknown".dimmed(),
    }
}

/// Get status icon for provider status
pub fn status_icon(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Healthy => "✓",
        ServiceStatus::Degraded => "~",
        ServiceStatus::Unhealthy => "✗",
        ServiceStatus::Unknown => "?",
    }
}

/// Format providers as a table
pub fn format_providers_table(providers: &[ProviderView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Type", "Priority", "Enabled", "Status", "Notes"]);

    for p in providers {
        let enabled = if p.enabled {
            "yes".green()
        } else {
            "no".dimmed()
        };
        let notes = p
            .issue
            .as_deref()
            .map(|issue| issue.red().to_string())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(&p.id),
            Cell::new(&p.name),
            Cell::new(&p.kind),
            Cell::new(p.priority),
            Cell::new(enabled),
            Cell::new(colored_status(p.status)),
            Cell::new(notes),
        ]);
    }

    table.to_string()
}

/// Format providers as JSON
pub fn format_providers_json(providers: &[ProviderView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "providers": providers }))
}

/// Format probe results as a table
pub fn format_health_table(providers: &[ProviderView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Provider", "Status", "Latency", "Error"]);

    for p in providers {
        table.add_row(vec![
            Cell::new(status_icon(p.status)),
            Cell::new(&p.id),
            Cell::new(colored_status(p.status)),
            Cell::new(format!("{}ms", p.response_time_ms)),
            Cell::new(p.last_error.as_deref().or(p.issue.as_deref()).unwrap_or("")),
        ]);
    }

    table.to_string()
}
