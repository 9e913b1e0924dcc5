//! Doubao (Volcengine Ark) image generation provider.

use super::types::{extract_error_message, ModelsResponse};
use super::{AgentError, HealthStatus, ImageProvider};
use crate::api::types::{ImageData, ImageGenerationRequest, ImageGenerationResponse};
use crate::registry::ProviderKind;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Public Ark API base URL.
pub const DOUBAO_API_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";

/// Prefix of Ark inference endpoint ids.
pub const ENDPOINT_ID_PREFIX: &str = "ep-";

const DEFAULT_SIZE: &str = "1024x1024";
const HEALTH_TIMEOUT_MS: u64 = 5000;

/// Doubao provider.
///
/// Calls `POST {base_url}/images/generations` with Bearer authentication.
/// The Ark API addresses models by inference endpoint id (`ep-...`).
pub struct DoubaoProvider {
    id: String,
    name: String,
    base_url: String,
    api_key: String,
    /// Configured endpoint id; overrides the request model
    endpoint_id: Option<String>,
    timeout_ms: u64,
    client: Arc<Client>,
}

impl DoubaoProvider {
    pub fn new(
        id: String,
        name: String,
        base_url: String,
        api_key: String,
        endpoint_id: Option<String>,
        timeout_ms: u64,
        client: Arc<Client>,
    ) -> Self {
        Self {
            id,
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            endpoint_id,
            timeout_ms,
            client,
        }
    }

    fn resolve_model(&self, request: &ImageGenerationRequest) -> Result<String, AgentError> {
        let model = self
            .endpoint_id
            .as_deref()
            .or(request.model.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                AgentError::Configuration(
                    "Doubao requires an inference endpoint id (ep-...)".to_string(),
                )
            })?;

        if !model.starts_with(ENDPOINT_ID_PREFIX) {
            warn!(
                provider_id = %self.id,
                model,
                "Doubao model is not an endpoint id, the call will likely fail"
            );
        }

        Ok(model.to_string())
    }

    fn build_body(&self, model: String, request: &ImageGenerationRequest) -> DoubaoImageRequest {
        let n = request.n.unwrap_or(1);
        let sequential = request.sequential_image_generation;

        DoubaoImageRequest {
            model,
            prompt: request.prompt.trim().to_string(),
            size: request
                .size
                .clone()
                .unwrap_or_else(|| DEFAULT_SIZE.to_string()),
            response_format: request.response_format.unwrap_or_default().as_str(),
            image: request.image.clone(),
            n,
            seed: request.seed,
            watermark: true,
            stream: false,
            sequential_image_generation: sequential.then_some("auto"),
            sequential_image_generation_options: (sequential && n > 1)
                .then_some(SequentialOptions { max_images: n }),
        }
    }
}

/// Ark `/images/generations` request body
#[derive(Debug, Serialize)]
struct DoubaoImageRequest {
    model: String,
    prompt: String,
    size: String,
    response_format: &'static str,
    /// Base64 source image for image-to-image endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    n: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    watermark: bool,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequential_image_generation: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequential_image_generation_options: Option<SequentialOptions>,
}

#[derive(Debug, Serialize)]
struct SequentialOptions {
    max_images: u8,
}

#[derive(Debug, Deserialize)]
struct DoubaoImageResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    data: Vec<ImageData>,
}

#[async_trait]
impl ImageProvider for DoubaoProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Doubao
    }

    async fn health_check(&self) -> Result<HealthStatus, AgentError> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_millis(HEALTH_TIMEOUT_MS))
            .send()
            .await
            .map_err(|e| AgentError::from_transport(e, HEALTH_TIMEOUT_MS))?;

        if !response.status().is_success() {
            return Ok(HealthStatus::Unhealthy);
        }

        let models: ModelsResponse = response.json().await.map_err(|e| {
            AgentError::InvalidResponse(format!("Failed to parse Doubao models response: {}", e))
        })?;

        Ok(HealthStatus::Healthy {
            model_count: models.data.len(),
        })
    }

    async fn generate(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, AgentError> {
        let model = self.resolve_model(request)?;
        let body = self.build_body(model, request);
        let url = format!("{}/images/generations", self.base_url);

        debug!(
            provider_id = %self.id,
            model = %body.model,
            size = %body.size,
            n = body.n,
            api_key = %super::redact_key(&self.api_key),
            "Calling Doubao image generation"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_millis(self.timeout_ms))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::from_transport(e, self.timeout_ms))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::from_transport(e, self.timeout_ms))?;

        if !status.is_success() {
            return Err(AgentError::Upstream {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let parsed: DoubaoImageResponse = serde_json::from_str(&text).map_err(|e| {
            AgentError::InvalidResponse(format!("Failed to parse Doubao response: {}", e))
        })?;

        if parsed.data.is_empty() {
            return Err(AgentError::InvalidResponse(
                "Doubao response contained no image data".to_string(),
            ));
        }

        let mut result = ImageGenerationResponse::now(
            parsed
                .id
                .unwrap_or_else(|| format!("doubao-{}", uuid::Uuid::new_v4())),
            parsed.data,
        );
        if let Some(created) = parsed.created {
            result.created = created;
        }
        Ok(result)
    }
}
