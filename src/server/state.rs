//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::{ModelClient, VertexClient};
use crate::prioritization::PrioritizationGateway;

/// Shared, read-only application state.
pub struct AppState {
    /// Gateway to the hosted model.
    pub gateway: PrioritizationGateway,
    /// Directory holding the frontend page.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create state around an existing gateway.
    #[must_use]
    pub fn new(gateway: PrioritizationGateway, static_dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            static_dir: static_dir.into(),
        })
    }

    /// Create state backed by Vertex AI.
    ///
    /// # Errors
    /// Returns an error if the Vertex client cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let vertex = VertexClient::new(&config.vertex)
            .map_err(|e| format!("Failed to create Vertex AI client: {e}"))?;
        tracing::info!(endpoint = %vertex.endpoint(), "Vertex AI client ready");

        let client: Arc<dyn ModelClient> = Arc::new(vertex);
        let gateway = PrioritizationGateway::new(client).with_limits(&config.limits);

        Ok(Self::new(gateway, config.server.static_dir.clone()))
    }
}
