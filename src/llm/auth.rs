//! Bearer tokens for Vertex AI requests.
//!
//! [`GoogleTokenSource`] resolves Application Default Credentials once and
//! lets `gcp_auth` cache and refresh tokens. [`StaticToken`] serves a fixed
//! token from configuration.

use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::TokenProvider;
use tokio::sync::OnceCell;

use super::error::LlmError;

/// OAuth scope required by Vertex AI.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Supplies a bearer token for each provider call.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current access token.
    ///
    /// # Errors
    /// Returns `LlmError::Auth` if no credentials can be obtained.
    async fn access_token(&self) -> Result<String, LlmError>;
}

/// Fixed token, e.g. from `VERTEX_ACCESS_TOKEN`.
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, LlmError> {
        Ok(self.0.clone())
    }
}

/// Application Default Credentials via `gcp_auth`, resolved on first use.
#[derive(Default)]
pub struct GoogleTokenSource {
    provider: OnceCell<Arc<dyn TokenProvider>>,
}

impl GoogleTokenSource {
    /// Create an unresolved source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn provider(&self) -> Result<&Arc<dyn TokenProvider>, LlmError> {
        self.provider
            .get_or_try_init(|| async {
                let provider = gcp_auth::provider()
                    .await
                    .map_err(|e| LlmError::Auth(format!("no Google credentials found: {e}")))?;
                tracing::info!("Google application default credentials resolved");
                Ok::<_, LlmError>(provider)
            })
            .await
    }
}

#[async_trait]
impl TokenSource for GoogleTokenSource {
    async fn access_token(&self) -> Result<String, LlmError> {
        let provider = self.provider().await?;
        let token = provider
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| LlmError::Auth(format!("token refresh failed: {e}")))?;
        Ok(token.as_str().to_string())
    }
}
