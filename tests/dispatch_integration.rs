//! End-to-end dispatch through real HTTP adapters against mock upstreams.

mod common;

use common::*;
use easel::api::ImageGenerationRequest;
use easel::dispatch::{DispatchError, ErrorKind};
use easel::fallback::FallbackReason;
use easel::health::ServiceStatus;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn doubao_success_sends_endpoint_id_as_model() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(header("authorization", "Bearer sk-test-doubao"))
        .and(body_partial_json(serde_json::json!({ "model": TEST_ENDPOINT_ID })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(image_payload("https://cdn.test/fox.png")),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let config = config_with(vec![
        doubao("doubao-primary", &upstream.uri(), 1),
        placeholder("placeholder-service", 6),
    ]);
    let manager = manager_for(&config);

    let outcome = manager
        .generate_image(&ImageGenerationRequest::new("a red fox"))
        .await
        .unwrap();

    assert_eq!(outcome.provider_id, "doubao-primary");
    assert_eq!(outcome.attempts, 1);
    assert_eq!(
        outcome.response.data[0].url.as_deref(),
        Some("https://cdn.test/fox.png")
    );
    assert_eq!(
        manager.tracker().status_of("doubao-primary"),
        ServiceStatus::Healthy
    );
}

#[tokio::test]
async fn persistent_server_error_falls_back_to_placeholder() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"error": {"message": "internal"}})),
        )
        .expect(3)
        .mount(&upstream)
        .await;

    let config = config_with(vec![
        doubao("doubao-primary", &upstream.uri(), 1),
        placeholder("placeholder-service", 6),
    ]);
    let manager = manager_for(&config);

    let mut request = ImageGenerationRequest::new("a lighthouse at dusk");
    request.size = Some("512x512".to_string());
    let outcome = manager.generate_image(&request).await.unwrap();

    assert_eq!(outcome.provider_id, "placeholder-service");
    assert_eq!(outcome.attempts, 4);
    let url = outcome.response.data[0].url.clone().unwrap();
    assert!(url.starts_with("https://via.placeholder.com/512x512/"));

    let report = manager.get_service_status();
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].reason, FallbackReason::ServiceUnavailable);
    assert_eq!(report.events[0].from_service, "doubao-primary");
    assert_eq!(report.events[0].to_service, "placeholder-service");

    let doubao = manager.tracker().get("doubao-primary").unwrap();
    assert_eq!(doubao.status, ServiceStatus::Unhealthy);
    assert_eq!(doubao.error_count, 3);
}

#[tokio::test]
async fn authentication_failure_advances_without_retry() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": {"message": "bad key"}})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let config = config_with(vec![
        doubao("doubao-primary", &upstream.uri(), 1),
        mock("mock-service", 5),
    ]);
    let manager = manager_for(&config);

    let outcome = manager
        .generate_image(&ImageGenerationRequest::new("a teapot"))
        .await
        .unwrap();

    assert_eq!(outcome.provider_id, "mock-service");
    assert_eq!(outcome.attempts, 2);
    let events = manager.get_service_status().events;
    assert_eq!(events[0].reason, FallbackReason::AuthenticationError);
}

#[tokio::test]
async fn rate_limited_last_provider_surfaces_rate_limit() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(serde_json::json!({"error": {"message": "slow down"}})),
        )
        .mount(&upstream)
        .await;

    let config = config_with(vec![doubao("doubao-primary", &upstream.uri(), 1)]);
    let manager = manager_for(&config);

    let err = manager
        .generate_image(&ImageGenerationRequest::new("a teapot"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimit);
    assert_eq!(err.status_code(), 429);
}

#[tokio::test]
async fn placeholder_api_key_is_a_configuration_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_payload("https://x")))
        .expect(0)
        .mount(&upstream)
        .await;

    let mut provider = doubao("doubao-primary", &upstream.uri(), 1);
    provider.api_key = Some("your_api_key_here".to_string());
    let config = config_with(vec![provider, placeholder("placeholder-service", 6)]);
    let manager = manager_for(&config);

    let err = manager
        .generate_image(&ImageGenerationRequest::new("a teapot"))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Configuration(_)));
    assert_eq!(err.status_code(), 500);
    assert!(manager.get_service_status().events.is_empty());
}

#[tokio::test]
async fn disabled_misconfigured_provider_does_not_block_dispatch() {
    let mut provider = doubao("doubao-primary", "http://127.0.0.1:9", 1);
    provider.api_key = None;
    provider.enabled = false;
    let config = config_with(vec![provider, mock("mock-service", 5)]);
    let manager = manager_for(&config);

    let outcome = manager
        .generate_image(&ImageGenerationRequest::new("a teapot"))
        .await
        .unwrap();
    assert_eq!(outcome.provider_id, "mock-service");
}

#[tokio::test]
async fn doubao_failure_falls_back_to_openai() {
    let doubao_upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(
            ResponseTemplate::new(402)
                .set_body_json(serde_json::json!({"error": {"message": "arrears"}})),
        )
        .expect(1)
        .mount(&doubao_upstream)
        .await;

    let openai_upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(header("authorization", "Bearer sk-test-openai"))
        .and(body_partial_json(serde_json::json!({ "model": "dall-e-3" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "created": 1_700_000_123,
            "data": [{ "url": "https://oai.test/cat.png", "revised_prompt": "a cat" }]
        })))
        .expect(1)
        .mount(&openai_upstream)
        .await;

    let config = config_with(vec![
        doubao("doubao-primary", &doubao_upstream.uri(), 1),
        openai("openai-dalle", &openai_upstream.uri(), 2),
    ]);
    let manager = manager_for(&config);

    let outcome = manager
        .generate_image(&ImageGenerationRequest::new("a cat"))
        .await
        .unwrap();

    assert_eq!(outcome.provider_id, "openai-dalle");
    assert_eq!(outcome.response.created, 1_700_000_123);
    let events = manager.get_service_status().events;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, FallbackReason::PaymentError);
}

#[tokio::test]
async fn probe_marks_unreachable_provider_unhealthy() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstream)
        .await;

    let config = config_with(vec![
        doubao("doubao-primary", &upstream.uri(), 1),
        mock("mock-service", 5),
    ]);
    let manager = manager_for(&config);

    manager.health_prober().probe_all().await;

    let doubao = manager.tracker().get("doubao-primary").unwrap();
    assert_eq!(doubao.status, ServiceStatus::Unhealthy);
    assert_eq!(doubao.error_count, 0);
    assert_eq!(
        manager.tracker().status_of("mock-service"),
        ServiceStatus::Healthy
    );
}
