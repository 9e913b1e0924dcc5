//! Request and response types for the image generation API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

/// Largest `n` accepted in a single request.
pub const MAX_IMAGES_PER_REQUEST: u8 = 4;

/// Image generation request.
///
/// `prompt` defaults to empty when absent so that a missing prompt is
/// reported as a validation error rather than a JSON rejection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ImageGenerationRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// "WIDTHxHEIGHT", e.g. "1024x1024"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<ImageQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Base64 source image for image-to-image models
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub sequential_image_generation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

impl ImageGenerationRequest {
    /// Create a request with only a prompt set.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Check the request before any provider sees it.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("Prompt is required".to_string());
        }

        if let Some(n) = self.n {
            if !(1..=MAX_IMAGES_PER_REQUEST).contains(&n) {
                return Err(format!(
                    "n must be between 1 and {}, got {}",
                    MAX_IMAGES_PER_REQUEST, n
                ));
            }
        }

        if let Some(size) = &self.size {
            if parse_size(size).is_none() {
                return Err(format!(
                    "size must look like WIDTHxHEIGHT (e.g. 1024x1024), got '{}'",
                    size
                ));
            }
        }

        Ok(())
    }

    /// Requested dimensions, or `default` when no valid size was given.
    pub fn dimensions_or(&self, default: (u32, u32)) -> (u32, u32) {
        self.size.as_deref().and_then(parse_size).unwrap_or(default)
    }
}

/// Parse a "WIDTHxHEIGHT" size string into positive dimensions.
///
/// ```
/// use easel::api::parse_size;
///
/// assert_eq!(parse_size("768x512"), Some((768, 512)));
/// assert_eq!(parse_size("0x512"), None);
/// assert_eq!(parse_size("large"), None);
/// ```
pub fn parse_size(size: &str) -> Option<(u32, u32)> {
    let (width, height) = size.trim().split_once(['x', 'X'])?;
    let width: u32 = width.trim().parse().ok()?;
    let height: u32 = height.trim().parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    Standard,
    Hd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    Vivid,
    Natural,
    Realistic,
    Cartoon,
    OilPainting,
    Watercolor,
    Sketch,
    Cyberpunk,
    ClassicalArt,
    ModernArt,
}

/// Mock and placeholder providers always answer with URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Url,
    B64Json,
}

impl ResponseFormat {
    /// Wire value expected by OpenAI-compatible upstreams.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::B64Json => "b64_json",
        }
    }
}

/// Image generation response (common shape across providers).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageGenerationResponse {
    pub id: String,
    #[serde(default = "default_object")]
    pub object: String,
    pub created: i64,
    #[serde(default)]
    pub data: Vec<ImageData>,
}

fn default_object() -> String {
    "list".to_string()
}

impl ImageGenerationResponse {
    /// Build a response stamped with the current time.
    pub fn now(id: String, data: Vec<ImageData>) -> Self {
        Self {
            id,
            object: default_object(),
            created: chrono::Utc::now().timestamp(),
            data,
        }
    }

    /// URLs (or inline payloads) of every returned image.
    pub fn image_refs(&self) -> Vec<&str> {
        self.data.iter().filter_map(ImageData::image_ref).collect()
    }
}

/// A single generated image reference.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ImageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

impl ImageData {
    pub fn from_url(url: String, revised_prompt: Option<String>) -> Self {
        Self {
            url: Some(url),
            b64_json: None,
            revised_prompt,
        }
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.url.as_deref().or(self.b64_json.as_deref())
    }
}

/// Body of `POST /v1/services/reset`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResetServiceRequest {
    #[serde(default)]
    pub service_id: Option<String>,
}

/// Body of `POST /v1/services/switch`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwitchServiceRequest {
    pub service_id: String,
}

/// Response of `POST /v1/services/switch`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwitchServiceResponse {
    pub switched: bool,
}

/// API error response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    /// Machine-readable error kind (e.g. "validation", "rate_limit")
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, kind: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self {
            status,
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: kind.to_string(),
                code: Some(kind.to_string()),
                suggestion: suggestion.map(str::to_string),
            },
        }
    }

    /// Create a not found error (404).
    pub fn not_found(message: &str) -> Self {
        Self::new(404, "not_found", message, None)
    }

    /// Create an internal server error (500).
    pub fn internal(message: &str) -> Self {
        Self::new(
            500,
            "server_error",
            message,
            Some("Please try again later or contact support if the problem persists."),
        )
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
