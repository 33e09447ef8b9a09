//! Error types for prioritization.

use thiserror::Error;

use crate::llm::LlmError;

/// Failure of a prioritization call.
#[derive(Debug, Error)]
pub enum PrioritizeError {
    /// Request rejected before calling the model.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Model answered but not with a valid `prioritize_tasks` call.
    #[error("model response violated the prioritize_tasks contract: {0}")]
    SchemaViolation(String),

    /// Model call failed (network, auth, quota, provider error).
    #[error("model call failed: {0}")]
    Transport(#[from] LlmError),
}

/// Convenience result alias for prioritization.
pub type PrioritizeResult<T> = Result<T, PrioritizeError>;
