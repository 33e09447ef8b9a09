//! Vertex AI Gemini client over the REST `generateContent` endpoint.
//!
//! One non-streaming POST per call:
//! `{base}/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::VertexConfig;

use super::auth::{GoogleTokenSource, StaticToken, TokenSource};
use super::error::LlmError;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use super::ModelClient;

/// Longest provider error body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Async Vertex AI client.
pub struct VertexClient {
    client: Client,
    endpoint: String,
    model: String,
    tokens: Arc<dyn TokenSource>,
}

impl VertexClient {
    /// Build a client from configuration.
    ///
    /// Uses `access_token` when configured, Application Default Credentials
    /// otherwise.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &VertexConfig) -> Result<Self, LlmError> {
        let tokens: Arc<dyn TokenSource> = match &config.access_token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(GoogleTokenSource::new()),
        };
        Self::with_token_source(config, tokens)
    }

    /// Build a client with an explicit token source.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_token_source(
        config: &VertexConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint_url(config),
            model: config.model.clone(),
            tokens,
        })
    }

    /// Full `generateContent` URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelClient for VertexClient {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let started = Instant::now();

        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get(RETRY_AFTER));
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &body, retry_after));
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::InvalidResponse(format!("undecodable body: {e}")))?;

        let usage = parsed.usage_metadata.unwrap_or_default();
        debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis(),
            candidates = parsed.candidates.len(),
            prompt_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            "generateContent completed"
        );

        Ok(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn endpoint_url(config: &VertexConfig) -> String {
    format!(
        "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
        config.effective_base_url(),
        config.project_id,
        config.location,
        config.model
    )
}

fn parse_retry_after(value: Option<&HeaderValue>) -> Option<Duration> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

fn map_error_status(status: StatusCode, body: &str, retry_after: Option<Duration>) -> LlmError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { retry_after },
        _ => LlmError::ApiError {
            status: status.as_u16(),
            message,
        },
    }
}
