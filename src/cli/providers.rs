//! Providers command implementation

use crate::cli::output::{format_providers_json, format_providers_table, provider_views};
use crate::cli::ProvidersListArgs;
use crate::dispatch::FallbackManager;

/// Handle `easel providers list`
pub fn handle_providers_list(
    args: &ProvidersListArgs,
    manager: &FallbackManager,
) -> Result<String, Box<dyn std::error::Error>> {
    let views = provider_views(manager, args.all);

    if args.json {
        return Ok(format_providers_json(&views)?);
    }

    if views.is_empty() {
        return Ok("No providers enabled. Use --all to include disabled ones.".to_string());
    }
    Ok(format_providers_table(&views))
}
