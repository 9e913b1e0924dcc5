//! OpenAI DALL·E image generation provider.

use super::types::{extract_error_message, ModelsResponse};
use super::{AgentError, HealthStatus, ImageProvider};
use crate::api::types::{
    ImageData, ImageGenerationRequest, ImageGenerationResponse, ImageQuality, ImageStyle,
};
use crate::registry::ProviderKind;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Public OpenAI API base URL.
pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_MODEL: &str = "dall-e-3";
const SUPPORTED_SIZES: [&str; 3] = ["256x256", "512x512", "1024x1024"];
const HEALTH_TIMEOUT_MS: u64 = 5000;

/// OpenAI DALL·E provider.
///
/// - Health check via GET {base_url}/models
/// - Generation via POST {base_url}/images/generations with Bearer token
pub struct OpenAiImageProvider {
    id: String,
    name: String,
    base_url: String,
    api_key: String,
    timeout_ms: u64,
    client: Arc<Client>,
}

impl OpenAiImageProvider {
    pub fn new(
        id: String,
        name: String,
        base_url: String,
        api_key: String,
        timeout_ms: u64,
        client: Arc<Client>,
    ) -> Self {
        Self {
            id,
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_ms,
            client,
        }
    }

    fn build_body<'a>(request: &'a ImageGenerationRequest) -> DalleRequest<'a> {
        let model = request
            .model
            .as_deref()
            .filter(|m| m.contains("dall-e"))
            .unwrap_or(DEFAULT_MODEL);

        let size = request
            .size
            .as_deref()
            .filter(|s| SUPPORTED_SIZES.contains(s))
            .unwrap_or("1024x1024");

        DalleRequest {
            model,
            prompt: &request.prompt,
            size,
            quality: match request.quality {
                Some(ImageQuality::Hd) => "hd",
                _ => "standard",
            },
            style: match request.style {
                Some(ImageStyle::Natural) => "natural",
                _ => "vivid",
            },
            response_format: request.response_format.unwrap_or_default().as_str(),
            n: 1,
        }
    }
}

#[derive(Debug, Serialize)]
struct DalleRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'static str,
    style: &'static str,
    response_format: &'static str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct DalleResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    data: Vec<ImageData>,
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
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
            AgentError::InvalidResponse(format!("Failed to parse OpenAI models response: {}", e))
        })?;

        Ok(HealthStatus::Healthy {
            model_count: models.data.len(),
        })
    }

    async fn generate(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, AgentError> {
        let url = format!("{}/images/generations", self.base_url);
        let body = Self::build_body(request);

        debug!(
            provider_id = %self.id,
            model = body.model,
            size = body.size,
            "Calling OpenAI image generation"
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

        let parsed: DalleResponse = serde_json::from_str(&text).map_err(|e| {
            AgentError::InvalidResponse(format!("Failed to parse OpenAI response: {}", e))
        })?;

        if parsed.data.is_empty() {
            return Err(AgentError::InvalidResponse(
                "OpenAI response contained no image data".to_string(),
            ));
        }

        let id = parsed
            .id
            .unwrap_or_else(|| format!("openai-{}", chrono::Utc::now().timestamp_millis()));
        let mut result = ImageGenerationResponse::now(id, parsed.data);
        if let Some(created) = parsed.created {
            result.created = created;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ResponseFormat;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn test_provider(base_url: String) -> OpenAiImageProvider {
        OpenAiImageProvider::new(
            "openai-dalle".to_string(),
            "OpenAI DALL-E".to_string(),
            base_url,
            "sk-openai".to_string(),
            2000,
            Arc::new(Client::new()),
        )
    }

    #[test]
    fn test_body_defaults() {
        let request = ImageGenerationRequest::new("cat");
        let body = OpenAiImageProvider::build_body(&request);
        assert_eq!(body.model, "dall-e-3");
        assert_eq!(body.size, "1024x1024");
        assert_eq!(body.quality, "standard");
        assert_eq!(body.style, "vivid");
        assert_eq!(body.response_format, "url");
        assert_eq!(body.n, 1);
    }

    #[test]
    fn test_body_maps_options() {
        let mut request = ImageGenerationRequest::new("cat");
        request.model = Some("dall-e-2".to_string());
        request.size = Some("512x512".to_string());
        request.quality = Some(ImageQuality::Hd);
        request.style = Some(ImageStyle::Natural);
        let body = OpenAiImageProvider::build_body(&request);
        assert_eq!(body.model, "dall-e-2");
        assert_eq!(body.size, "512x512");
        assert_eq!(body.quality, "hd");
        assert_eq!(body.style, "natural");
    }

    #[test]
    fn test_body_rejects_unsupported_values() {
        let mut request = ImageGenerationRequest::new("cat");
        request.model = Some("stable-diffusion".to_string());
        request.size = Some("1792x1024".to_string());
        request.style = Some(ImageStyle::Cyberpunk);
        let body = OpenAiImageProvider::build_body(&request);
        assert_eq!(body.model, "dall-e-3");
        assert_eq!(body.size, "1024x1024");
        assert_eq!(body.style, "vivid");
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/images/generations")
            .match_header("authorization", "Bearer sk-openai")
            .match_body(Matcher::PartialJson(json!({"model": "dall-e-3", "n": 1})))
            .with_status(200)
            .with_body(
                r#"{"created":1700000001,"data":[{"url":"https://oai.example.com/x.png",
                    "revised_prompt":"a fluffy cat"}]}"#,
            )
            .create_async()
            .await;

        let response = test_provider(server.url())
            .generate(&ImageGenerationRequest::new("cat"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.id.starts_with("openai-"));
        assert_eq!(response.created, 1700000001);
        assert_eq!(
            response.data[0].revised_prompt.as_deref(),
            Some("a fluffy cat")
        );
    }

    #[tokio::test]
    async fn test_generate_requests_base64() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/images/generations")
            .match_body(Matcher::PartialJson(json!({"response_format": "b64_json"})))
            .with_status(200)
            .with_body(r#"{"data":[{"b64_json":"iVBORw0KGgo="}]}"#)
            .create_async()
            .await;

        let mut request = ImageGenerationRequest::new("cat");
        request.response_format = Some(ResponseFormat::B64Json);
        let response = test_provider(server.url()).generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.data[0].b64_json.as_deref(), Some("iVBORw0KGgo="));
        assert!(response.data[0].url.is_none());
    }

    #[tokio::test]
    async fn test_payment_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/images/generations")
            .with_status(402)
            .with_body(r#"{"error":{"message":"Billing hard limit reached"}}"#)
            .create_async()
            .await;

        let err = test_provider(server.url())
            .generate(&ImageGenerationRequest::new("cat"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(402));
        assert!(err.to_string().contains("Payment Required"));
    }

    #[tokio::test]
    async fn test_health_check_success() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/models")
            .with_status(200)
            .with_body(r#"{"data":[{"id":"dall-e-3"}]}"#)
            .create_async()
            .await;

        let status = test_provider(server.url()).health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy { model_count: 1 });
    }
}
