//! Placeholder provider: synthesizes a placeholder-image URL locally.

use super::{AgentError, ImageProvider};
use crate::api::types::{ImageData, ImageGenerationRequest, ImageGenerationResponse};
use crate::registry::ProviderKind;
use async_trait::async_trait;
use reqwest::Url;

const PLACEHOLDER_BASE_URL: &str = "https://via.placeholder.com";
const BACKGROUND_COLOR: &str = "4A90E2";
const TEXT_COLOR: &str = "FFFFFF";
const DEFAULT_TEXT: &str = "AI Generated Image";
const MAX_TEXT_CHARS: usize = 50;
const DEFAULT_DIMENSIONS: (u32, u32) = (1024, 1024);

/// Placeholder provider. Never fails for a valid request and never touches
/// the network.
pub struct PlaceholderProvider {
    id: String,
    name: String,
}

impl PlaceholderProvider {
    pub fn new(id: String, name: String) -> Self {
        Self { id, name }
    }
}

/// Build the placeholder URL for the given dimensions and prompt.
///
/// ```
/// use easel::agent::placeholder::placeholder_url;
///
/// let url = placeholder_url(512, 512, "").unwrap();
/// assert_eq!(
///     url,
///     "https://via.placeholder.com/512x512/4A90E2/FFFFFF?text=AI+Generated+Image"
/// );
/// ```
pub fn placeholder_url(width: u32, height: u32, prompt: &str) -> Result<String, AgentError> {
    // First 50 characters of the raw prompt; surrounding whitespace is kept.
    let text: String = prompt.chars().take(MAX_TEXT_CHARS).collect();
    let text = if text.trim().is_empty() {
        DEFAULT_TEXT.to_string()
    } else {
        text
    };

    let base = format!(
        "{}/{}x{}/{}/{}",
        PLACEHOLDER_BASE_URL, width, height, BACKGROUND_COLOR, TEXT_COLOR
    );
    let url = Url::parse_with_params(&base, &[("text", text)])
        .map_err(|e| AgentError::InvalidResponse(format!("Invalid placeholder URL: {}", e)))?;
    Ok(url.into())
}

#[async_trait]
impl ImageProvider for PlaceholderProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Placeholder
    }

    async fn generate(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, AgentError> {
        let (width, height) = request.dimensions_or(DEFAULT_DIMENSIONS);
        let url = placeholder_url(width, height, &request.prompt)?;

        Ok(ImageGenerationResponse::now(
            format!("placeholder-{}", chrono::Utc::now().timestamp_millis()),
            vec![ImageData::from_url(url, Some(request.prompt.clone()))],
        ))
    }
}
