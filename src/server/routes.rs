//! HTTP route handlers for the prioritization API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::services::ServeFile;

use crate::prioritization::{PrioritizeError, PrioritizeRequest, PrioritizeResponse};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let index = ServeFile::new(state.static_dir.join("index.html"));

    Router::new()
        .route_service("/", index)
        .route("/health", get(health_check))
        .route("/prioritize", post(prioritize_tasks))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "agena",
        "model": state.gateway.model_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Rank the submitted tasks.
async fn prioritize_tasks(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PrioritizeRequest>,
) -> Result<Json<PrioritizeResponse>, PrioritizeError> {
    let response = state.gateway.prioritize(&request).await?;
    Ok(Json(response))
}

/// Error body returned on failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

impl IntoResponse for PrioritizeError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::SchemaViolation(_) => StatusCode::BAD_GATEWAY,
            Self::Transport(e) if e.is_rate_limit() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %self, "prioritization failed");
        }

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
