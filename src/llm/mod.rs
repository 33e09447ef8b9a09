//! Hosted model access.
//!
//! [`ModelClient`] is the seam between the prioritization gateway and the
//! provider. [`VertexClient`] talks to Vertex AI; [`MockModelClient`] plays
//! back scripted responses.

mod auth;
mod error;
mod mock;
mod types;
mod vertex;

pub use auth::{GoogleTokenSource, StaticToken, TokenSource, CLOUD_PLATFORM_SCOPE};
pub use error::LlmError;
pub use mock::MockModelClient;
pub use types::{
    Candidate, Content, FunctionCall, FunctionCallingConfig, FunctionCallingMode,
    FunctionDeclaration, GenerateContentRequest, GenerateContentResponse, Part, Tool, ToolConfig,
    UsageMetadata, ROLE_MODEL, ROLE_USER,
};
pub use vertex::VertexClient;

use async_trait::async_trait;

/// A provider that can run one `generateContent` call.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run the call and return the raw provider response.
    ///
    /// # Errors
    /// Returns an error on transport, auth, quota or decoding failures.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}
