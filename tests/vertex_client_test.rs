use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agena::config::VertexConfig;
use agena::llm::{
    Content, GenerateContentRequest, LlmError, ModelClient, TokenSource, VertexClient,
};
use agena::{PrioritizationGateway, PrioritizeError, PrioritizeRequest};
use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::json;

const PATH: &str =
    "/v1/projects/demo-project/locations/us-central1/publishers/google/models/gemini-2.5-flash:generateContent";

fn config(server: &MockServer) -> VertexConfig {
    VertexConfig::new("demo-project", "us-central1")
        .with_base_url(server.base_url())
        .with_access_token("test-token")
        .with_timeout(Duration::from_secs(5))
}

fn simple_request() -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user_text(["- Write report"])],
        system_instruction: None,
        tools: vec![],
        tool_config: None,
    }
}

#[tokio::test]
async fn test_generate_content_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .header("authorization", "Bearer test-token")
                .json_body_partial(r#"{"contents":[{"role":"user","parts":[{"text":"- Write report"}]}]}"#);
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"functionCall": {"name": "prioritize_tasks", "args": {"prioritized_tasks": []}}}]
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
            }));
        })
        .await;

    let client = VertexClient::new(&config(&server)).unwrap();
    let response = client.generate_content(&simple_request()).await.unwrap();

    mock.assert_async().await;
    let call = response.candidates[0].first_function_call().unwrap();
    assert_eq!(call.name, "prioritize_tasks");
    assert_eq!(response.usage_metadata.unwrap().total_token_count, 16);
    assert_eq!(client.model_name(), "gemini-2.5-flash");
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(401).json_body(json!({
                "error": {"code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED"}
            }));
        })
        .await;

    let client = VertexClient::new(&config(&server)).unwrap();
    let err = client.generate_content(&simple_request()).await.unwrap_err();

    match err {
        LlmError::Unauthorized { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("invalid authentication"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_quota_exceeded() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(429).header("retry-after", "7").body("quota");
        })
        .await;

    let client = VertexClient::new(&config(&server)).unwrap();
    let err = client.generate_content(&simple_request()).await.unwrap_err();

    assert!(err.is_rate_limit());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(500).body("internal");
        })
        .await;

    let client = VertexClient::new(&config(&server)).unwrap();
    let err = client.generate_content(&simple_request()).await.unwrap_err();

    assert!(matches!(err, LlmError::ApiError { status: 500, ref message } if message == "internal"));
}

#[tokio::test]
async fn test_undecodable_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).body("<html>not json</html>");
        })
        .await;

    let client = VertexClient::new(&config(&server)).unwrap();
    let err = client.generate_content(&simple_request()).await.unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_gateway_end_to_end() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .json_body_partial(
                    r#"{"toolConfig":{"functionCallingConfig":{"mode":"ANY","allowedFunctionNames":["prioritize_tasks"]}}}"#,
                );
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"functionCall": {"name": "prioritize_tasks", "args": {"prioritized_tasks": [
                            {"task_description": "Write report", "priority_level": "high", "reasoning": "deadline today", "deadline": "2025-07-12T23:59:00"},
                            {"task_description": "Email client", "priority_level": "low", "reasoning": "can wait"}
                        ]}}}]
                    },
                    "finishReason": "STOP"
                }]
            }));
        })
        .await;

    let client: Arc<dyn ModelClient> = Arc::new(VertexClient::new(&config(&server)).unwrap());
    let gateway = PrioritizationGateway::new(client);
    let response = gateway
        .prioritize(&PrioritizeRequest::new(["Email client", "Write report"]))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.prioritized_tasks.len(), 2);
    assert_eq!(response.prioritized_tasks[0].task_description, "Write report");
    assert_eq!(
        response.prioritized_tasks[0].deadline.as_deref(),
        Some("2025-07-12T23:59:00")
    );
}

#[tokio::test]
async fn test_gateway_text_reply_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "1. Write report\n2. Email client"}]},
                    "finishReason": "STOP"
                }]
            }));
        })
        .await;

    let client: Arc<dyn ModelClient> = Arc::new(VertexClient::new(&config(&server)).unwrap());
    let err = PrioritizationGateway::new(client)
        .prioritize(&PrioritizeRequest::new(["Write report", "Email client"]))
        .await
        .unwrap_err();

    assert!(matches!(err, PrioritizeError::SchemaViolation(_)));
}

/// Hands out `token-1`, `token-2`, ... like a refreshing credential.
#[derive(Default)]
struct RotatingTokens {
    issued: AtomicUsize,
}

#[async_trait]
impl TokenSource for RotatingTokens {
    async fn access_token(&self) -> Result<String, LlmError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{n}"))
    }
}

struct NoCredentials;

#[async_trait]
impl TokenSource for NoCredentials {
    async fn access_token(&self) -> Result<String, LlmError> {
        Err(LlmError::Auth("no Google credentials found".to_string()))
    }
}

fn ok_body() -> serde_json::Value {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "hi"}]}}]})
}

#[tokio::test]
async fn test_token_source_fetched_per_request() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).header("authorization", "Bearer token-1");
            then.status(200).json_body(ok_body());
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).header("authorization", "Bearer token-2");
            then.status(200).json_body(ok_body());
        })
        .await;

    let config = VertexConfig::new("demo-project", "us-central1").with_base_url(server.base_url());
    let client =
        VertexClient::with_token_source(&config, Arc::new(RotatingTokens::default())).unwrap();

    client.generate_content(&simple_request()).await.unwrap();
    client.generate_content(&simple_request()).await.unwrap();

    first.assert_hits_async(1).await;
    second.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_missing_credentials_skip_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(ok_body());
        })
        .await;

    let config = VertexConfig::new("demo-project", "us-central1").with_base_url(server.base_url());
    let client = VertexClient::with_token_source(&config, Arc::new(NoCredentials)).unwrap();

    let err = client.generate_content(&simple_request()).await.unwrap_err();

    assert!(matches!(err, LlmError::Auth(_)));
    mock.assert_hits_async(0).await;
}
