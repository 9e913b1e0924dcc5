//! Field helpers for structured logging

use crate::dispatch::{DispatchError, GenerationOutcome};

/// Characters of a prompt that may appear in logs.
pub const PROMPT_PREVIEW_CHARS: usize = 100;

/// Shorten a prompt for logging.
///
/// ```
/// use easel::logging::truncate_prompt;
///
/// assert_eq!(truncate_prompt("a cat"), "a cat");
/// assert_eq!(truncate_prompt(&"x".repeat(150)).chars().count(), 103);
/// ```
pub fn truncate_prompt(prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.chars().count() <= PROMPT_PREVIEW_CHARS {
        return prompt.to_string();
    }
    let mut preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

/// Status label and error message of a dispatch result.
///
/// - Ok: ("success", None)
/// - Err: (error kind, Some(message))
pub fn extract_status(
    result: &Result<GenerationOutcome, DispatchError>,
) -> (&'static str, Option<String>) {
    match result {
        Ok(_) => ("success", None),
        Err(e) => (e.kind().as_str(), Some(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_prompt_untouched() {
        assert_eq!(truncate_prompt("  sunset over hills "), "sunset over hills");
    }

    #[test]
    fn test_truncate_long_prompt() {
        let prompt = "a".repeat(250);
        let preview = truncate_prompt(&prompt);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), PROMPT_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_truncate_multibyte_prompt() {
        let prompt = "山".repeat(120);
        let preview = truncate_prompt(&prompt);
        assert_eq!(preview.chars().count(), PROMPT_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_extract_status_error() {
        let result: Result<GenerationOutcome, DispatchError> =
            Err(DispatchError::Validation("Prompt is required".into()));
        let (status, message) = extract_status(&result);
        assert_eq!(status, "validation");
        assert!(message.unwrap().contains("Prompt is required"));
    }
}
