//! Prioritization gateway: owns the model contract.
//!
//! The gateway builds the prompt, calls the model once with the declared
//! `prioritize_tasks` function, and validates the returned call before
//! handing the ranking back. Nothing is retried or cached.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::LimitsConfig;
use crate::llm::{Content, GenerateContentRequest, GenerateContentResponse, ModelClient, Tool, ToolConfig};

use super::error::{PrioritizeError, PrioritizeResult};
use super::prompt::build_prompt_segments;
use super::schema::{self, FUNCTION_NAME, TASKS_ARGUMENT};
use super::types::{PrioritizeRequest, PrioritizeResponse, PrioritizedTask};

/// Longest text excerpt quoted when the model answers without a call.
const MAX_TEXT_EXCERPT_CHARS: usize = 200;

/// Immutable gateway shared by all requests.
pub struct PrioritizationGateway {
    client: Arc<dyn ModelClient>,
    system_instruction: Content,
    tools: Vec<Tool>,
    tool_config: ToolConfig,
    max_tasks: usize,
}

impl PrioritizationGateway {
    /// Create a gateway around a model client.
    #[must_use]
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            system_instruction: schema::system_instruction(),
            tools: schema::tools(),
            tool_config: schema::tool_config(),
            max_tasks: LimitsConfig::default().max_tasks,
        }
    }

    /// Apply request limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: &LimitsConfig) -> Self {
        self.max_tasks = limits.max_tasks;
        self
    }

    /// Model identifier of the underlying client.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Build the provider request for a prioritization request.
    #[must_use]
    pub fn build_request(&self, request: &PrioritizeRequest) -> GenerateContentRequest {
        let segments = build_prompt_segments(request.tasks.as_slice(), request.effective_context());
        GenerateContentRequest {
            contents: vec![Content::user_text(segments)],
            system_instruction: Some(self.system_instruction.clone()),
            tools: self.tools.clone(),
            tool_config: Some(self.tool_config.clone()),
        }
    }

    /// Rank the request's tasks through the model.
    ///
    /// # Errors
    /// - `InvalidRequest` if the request fails validation (the model is not called).
    /// - `Transport` if the model call fails.
    /// - `SchemaViolation` if the model does not return a valid `prioritize_tasks` call.
    pub async fn prioritize(&self, request: &PrioritizeRequest) -> PrioritizeResult<PrioritizeResponse> {
        request.validate(self.max_tasks)?;

        let task_count = request.tasks.len();
        info!(
            task_count,
            has_context = request.effective_context().is_some(),
            model = %self.client.model_name(),
            "prioritizing tasks"
        );

        let model_request = self.build_request(request);
        let response = self.client.generate_content(&model_request).await.map_err(|e| {
            warn!(error = %e, "model call failed");
            PrioritizeError::from(e)
        })?;

        let prioritized_tasks = extract_prioritized_tasks(response).inspect_err(|e| {
            warn!(error = %e, "model response rejected");
        })?;

        if prioritized_tasks.len() != task_count {
            warn!(
                requested = task_count,
                returned = prioritized_tasks.len(),
                "model returned a different number of tasks"
            );
        }
        debug!(returned = prioritized_tasks.len(), "prioritization complete");

        Ok(PrioritizeResponse { prioritized_tasks })
    }
}

/// Pull and validate the `prioritized_tasks` argument from a model response.
///
/// # Errors
/// Returns `SchemaViolation` when the first candidate has no
/// `prioritize_tasks` call, the argument is missing or mistyped, or a
/// deadline is not ISO-8601.
pub fn extract_prioritized_tasks(
    response: GenerateContentResponse,
) -> PrioritizeResult<Vec<PrioritizedTask>> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| PrioritizeError::SchemaViolation("response has no candidates".to_string()))?;

    let Some(call) = candidate.first_function_call() else {
        let text = candidate.content.as_ref().map(Content::text).unwrap_or_default();
        let excerpt: String = text.chars().take(MAX_TEXT_EXCERPT_CHARS).collect();
        return Err(PrioritizeError::SchemaViolation(format!(
            "expected a {FUNCTION_NAME} call, got text only (finish reason {}): {excerpt:?}",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    };

    if call.name != FUNCTION_NAME {
        return Err(PrioritizeError::SchemaViolation(format!(
            "expected a {FUNCTION_NAME} call, got {}",
            call.name
        )));
    }

    let value = call.args.get(TASKS_ARGUMENT).cloned().ok_or_else(|| {
        PrioritizeError::SchemaViolation(format!("{FUNCTION_NAME} call is missing {TASKS_ARGUMENT}"))
    })?;

    let tasks: Vec<PrioritizedTask> = serde_json::from_value(value)
        .map_err(|e| PrioritizeError::SchemaViolation(format!("malformed {TASKS_ARGUMENT}: {e}")))?;

    tasks.into_iter().map(PrioritizedTask::validate).collect()
}
