//! Structured logging helpers
//!
//! Filter construction for the tracing subscriber, request correlation ids,
//! and privacy-safe field formatting.

pub mod fields;
pub mod middleware;

pub use fields::{extract_status, truncate_prompt};
pub use middleware::{generate_request_id, request_id_from_headers, REQUEST_ID_HEADER};

/// Build filter directives string from LoggingConfig
///
/// Produces "base_level,easel::component=level,..." with components in
/// sorted order so the result is stable.
///
/// # Examples
///
/// ```
/// use easel::config::{LogFormat, LoggingConfig};
/// use easel::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("dispatch".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,easel::dispatch=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",easel::{}={}", component, level));
        }
    }

    filter_str
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use std::collections::HashMap;

    #[test]
    fn test_filter_without_components() {
        assert_eq!(build_filter_directives(&LoggingConfig::default()), "info");
    }

    #[test]
    fn test_filter_components_sorted() {
        let mut levels = HashMap::new();
        levels.insert("health".to_string(), "warn".to_string());
        levels.insert("agent".to_string(), "trace".to_string());
        let config = LoggingConfig {
            level: "debug".to_string(),
            component_levels: Some(levels),
            ..Default::default()
        };

        assert_eq!(
            build_filter_directives(&config),
            "debug,easel::agent=trace,easel::health=warn"
        );
    }
}
