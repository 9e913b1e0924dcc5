//! Generate command implementation

use crate::api::ImageGenerationRequest;
use crate::cli::GenerateArgs;
use crate::dispatch::{DispatchError, FallbackManager, GenerationOutcome};
use colored::Colorize;
use serde_json::json;
use std::fmt::Write;

impl From<&GenerateArgs> for ImageGenerationRequest {
    fn from(args: &GenerateArgs) -> Self {
        let mut request = ImageGenerationRequest::new(args.prompt.clone());
        request.size = args.size.clone();
        request.model = args.model.clone();
        request.seed = args.seed;
        request.n = args.n;
        request
    }
}

/// Handle `easel generate`: one dispatch, printed as URLs or JSON.
pub async fn handle_generate(
    args: &GenerateArgs,
    manager: &FallbackManager,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(provider) = &args.provider {
        if !manager.switch_to_service(provider) {
            return Err(format!("Unknown or disabled provider: {}", provider).into());
        }
    }

    let request = ImageGenerationRequest::from(args);
    let outcome = manager
        .generate_image(&request)
        .await
        .map_err(describe_failure)?;

    if args.json {
        return Ok(serde_json::to_string_pretty(&json!({
            "provider": outcome.provider_id,
            "attempts": outcome.attempts,
            "request_id": outcome.request_id,
            "response": outcome.response,
        }))?);
    }

    Ok(format_outcome(&outcome))
}

fn format_outcome(outcome: &GenerationOutcome) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} Generated by {} ({} attempt{})",
        "✓".green(),
        outcome.provider_id.bold(),
        outcome.attempts,
        if outcome.attempts == 1 { "" } else { "s" }
    );
    for image in outcome.response.image_refs() {
        let _ = writeln!(output, "  {}", image);
    }
    output
}

fn describe_failure(error: DispatchError) -> Box<dyn std::error::Error> {
    format!("{} ({})\n  {}", error, error.kind(), error.suggestion()).into()
}
