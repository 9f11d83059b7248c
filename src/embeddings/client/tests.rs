use super::*;
use crate::embeddings::Embedding;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str, dimension: usize) -> EmbeddingConfig {
    EmbeddingConfig {
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        dimension,
        api_key_env: "KNOWLEDGE_RAG_UNSET_TEST_KEY".to_string(),
        timeout_seconds: 5,
        retry_attempts: 1,
    }
}

fn embedding_body(vector: &[f32]) -> serde_json::Value {
    json!({
        "object": "list",
        "data": [{ "object": "embedding", "index": 0, "embedding": vector }],
        "model": "test-model"
    })
}

#[test]
fn client_configuration() {
    let mut config = test_config("http://test-host:1234/v1", 3);
    config.retry_attempts = 4;
    let client = EmbeddingClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model, "test-model");
    assert_eq!(client.dimension, 3);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.base_url.path(), "/v1/");
    assert_eq!(client.retry_attempts, 4);
}

#[test]
fn client_builder_methods() {
    let config = EmbeddingConfig::default();
    let client = EmbeddingClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5)
        .with_api_key("secret");

    assert_eq!(client.retry_attempts, 5);
    assert_eq!(client.api_key.as_deref(), Some("secret"));
    assert_eq!(client.dimension(), 768);
    assert_eq!(DEFAULT_RETRY_ATTEMPTS, config.retry_attempts);
}

#[test]
fn zero_retry_attempts_still_sends_once() {
    let client = EmbeddingClient::new(&EmbeddingConfig::default())
        .expect("Failed to create client")
        .with_retry_attempts(0);

    assert_eq!(client.retry_attempts, 1);
}

#[test]
fn rejects_invalid_base_url() {
    let config = test_config("not a url", 3);
    assert!(EmbeddingClient::new(&config).is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn generates_embedding_from_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_json(json!({ "model": "test-model", "input": "hello world" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[0.1, 0.2, 0.3])))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&test_config(&server.uri(), 3)).expect("client");
    let vector = tokio::task::spawn_blocking(move || client.generate_embedding("hello world"))
        .await
        .expect("task should not panic")
        .expect("embedding should succeed");

    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
}

#[tokio::test(flavor = "multi_thread")]
async fn sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("Authorization", "Bearer secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[1.0, 2.0])))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&test_config(&server.uri(), 2))
        .expect("client")
        .with_api_key("secret-key");
    let embedding = tokio::task::spawn_blocking(move || client.embed("query"))
        .await
        .expect("task should not panic");

    assert_eq!(embedding, Embedding::Generated(vec![1.0, 2.0]));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_falls_back_to_zero_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&test_config(&server.uri(), 4)).expect("client");
    let (raw, embedding) = tokio::task::spawn_blocking(move || {
        let raw = client.generate_embedding("text");
        (raw, client.embed("text"))
    })
    .await
    .expect("task should not panic");

    assert!(raw.is_err());
    assert_eq!(embedding, Embedding::Degraded { dimension: 4 });
}

#[tokio::test(flavor = "multi_thread")]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "bad key" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&test_config(&server.uri(), 4))
        .expect("client")
        .with_retry_attempts(3);
    let result = tokio::task::spawn_blocking(move || client.generate_embedding("text"))
        .await
        .expect("task should not panic");

    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_response_falls_back_to_zero_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&test_config(&server.uri(), 2)).expect("client");
    let embedding = tokio::task::spawn_blocking(move || client.embed("text"))
        .await
        .expect("task should not panic");

    assert_eq!(embedding.into_vector(), vec![0.0, 0.0]);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_data_falls_back_to_zero_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&test_config(&server.uri(), 2)).expect("client");
    let embedding = tokio::task::spawn_blocking(move || client.embed("text"))
        .await
        .expect("task should not panic");

    assert!(embedding.is_degraded());
}

#[tokio::test(flavor = "multi_thread")]
async fn health_check_verifies_dimension() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[0.5, 0.5, 0.5])))
        .mount(&server)
        .await;

    let matching = EmbeddingClient::new(&test_config(&server.uri(), 3)).expect("client");
    let mismatched = EmbeddingClient::new(&test_config(&server.uri(), 768)).expect("client");
    let (matching_result, mismatched_result) = tokio::task::spawn_blocking(move || {
        (matching.health_check(), mismatched.health_check())
    })
    .await
    .expect("task should not panic");

    assert!(matching_result.is_ok());
    assert!(mismatched_result.is_err());
}
