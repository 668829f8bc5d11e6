mod common;

use concierge_common::ConciergeError;
use concierge_llm::ollama::OllamaClient;
use concierge_llm::traits::{GenerationOptions, LlmClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options() -> GenerationOptions {
    GenerationOptions {
        max_tokens: Some(256),
        context_window: Some(1024),
        temperature: Some(0.5),
    }
}

#[tokio::test]
async fn generate_posts_prompt_and_returns_response_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "prompt": "Plan a weekend in Sedona",
            "stream": false,
            "options": {"num_predict": 256, "num_ctx": 1024, "temperature": 0.5}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "response": "Sure! {\"plan\": []}",
            "done": true,
            "eval_count": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri(), "llama3", Duration::from_secs(5)).unwrap();
    let resp = client
        .generate("Plan a weekend in Sedona", &options())
        .await
        .unwrap();

    assert_eq!(resp.text, "Sure! {\"plan\": []}");
    assert_eq!(resp.tokens_used, Some(42));
    assert_eq!(resp.model.as_deref(), Some("llama3"));
}

#[tokio::test]
async fn full_generate_url_is_accepted_as_endpoint() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/api/generate", server.uri());
    let client = OllamaClient::new(&endpoint, "llama3", Duration::from_secs(5)).unwrap();
    let resp = client.generate("hi", &GenerationOptions::default()).await.unwrap();
    assert_eq!(resp.text, "ok");
    assert_eq!(client.endpoint(), server.uri());
}

#[tokio::test]
async fn non_success_status_is_a_generation_failure_without_retry() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "model loading"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri(), "llama3", Duration::from_secs(5)).unwrap();
    let err = client.generate("hi", &options()).await.unwrap_err();

    assert!(matches!(err, ConciergeError::Generation(_)));
    assert!(err.to_string().contains("model loading"));
    assert_eq!(err.debug_info().error, "generation_failed");
}

#[tokio::test]
async fn slow_generation_times_out() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "late"}))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri(), "llama3", Duration::from_millis(100)).unwrap();
    let err = client.generate("hi", &options()).await.unwrap_err();

    assert!(matches!(err, ConciergeError::Timeout));
    assert_eq!(err.debug_info().error, "generation_failed");
}

#[tokio::test]
async fn health_check_reports_reachability() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let up = OllamaClient::new(&server.uri(), "llama3", Duration::from_secs(5)).unwrap();
    assert!(up.health_check().await.unwrap());

    let down = OllamaClient::new("http://127.0.0.1:9", "llama3", Duration::from_secs(1)).unwrap();
    assert!(!down.health_check().await.unwrap());
}
