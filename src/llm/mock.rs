//! Scripted model client for tests and local runs without credentials.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::LlmError;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use super::ModelClient;

/// Returns pre-defined results in order and records every request.
#[derive(Debug, Default)]
pub struct MockModelClient {
    script: Mutex<VecDeque<Result<GenerateContentResponse, LlmError>>>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl MockModelClient {
    /// Create a mock that answers with `responses`, one per call.
    #[must_use]
    pub fn new(responses: Vec<GenerateContentResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock from results, allowing scripted failures.
    #[must_use]
    pub fn with_results(results: Vec<Result<GenerateContentResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let calls = match self.requests.lock() {
            Ok(mut guard) => {
                guard.push(request.clone());
                guard.len()
            }
            Err(_) => 0,
        };

        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut guard| guard.pop_front());
        next.unwrap_or_else(|| {
            Err(LlmError::InvalidResponse(format!(
                "mock script exhausted after {calls} calls"
            )))
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
