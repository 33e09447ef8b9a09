//! Request and response shapes for prioritization.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::{PrioritizeError, PrioritizeResult};

/// Incoming prioritization request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizeRequest {
    /// Task descriptions, in the caller's order.
    pub tasks: Vec<String>,
    /// Optional background used to bias prioritization.
    #[serde(default)]
    pub context: Option<String>,
}

impl PrioritizeRequest {
    /// Create a request without context.
    #[must_use]
    pub fn new<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tasks: tasks.into_iter().map(Into::into).collect(),
            context: None,
        }
    }

    /// Attach context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Context if present and non-empty.
    #[must_use]
    pub fn effective_context(&self) -> Option<&str> {
        self.context.as_deref().filter(|c| !c.is_empty())
    }

    /// Check the request before it reaches the model.
    ///
    /// # Errors
    /// Returns `InvalidRequest` for an empty list, a blank task, or more than
    /// `max_tasks` tasks.
    pub fn validate(&self, max_tasks: usize) -> PrioritizeResult<()> {
        if self.tasks.is_empty() {
            return Err(PrioritizeError::InvalidRequest(
                "tasks must contain at least one task".to_string(),
            ));
        }
        if self.tasks.len() > max_tasks {
            return Err(PrioritizeError::InvalidRequest(format!(
                "too many tasks: {} (max {max_tasks})",
                self.tasks.len()
            )));
        }
        if let Some(index) = self.tasks.iter().position(|t| t.trim().is_empty()) {
            return Err(PrioritizeError::InvalidRequest(format!(
                "task at index {index} is blank"
            )));
        }
        Ok(())
    }
}

/// One ranked task as produced by the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizedTask {
    /// Task text.
    pub task_description: String,
    /// Open-ended label such as "high".
    pub priority_level: String,
    /// Effort estimate.
    #[serde(default)]
    pub estimated_effort: Option<String>,
    /// Justification for the ranking.
    pub reasoning: String,
    /// ISO-8601 deadline, kept verbatim.
    #[serde(default)]
    pub deadline: Option<String>,
}

impl PrioritizedTask {
    /// Check the deadline format; values are returned untouched.
    ///
    /// A blank deadline string is passed through as sent.
    ///
    /// # Errors
    /// Returns `SchemaViolation` if a non-blank deadline is not ISO-8601.
    pub fn validate(self) -> PrioritizeResult<Self> {
        let malformed = self
            .deadline
            .as_deref()
            .filter(|d| !d.trim().is_empty() && !is_iso8601_datetime(d));
        if let Some(deadline) = malformed {
            return Err(PrioritizeError::SchemaViolation(format!(
                "deadline {deadline:?} for task {:?} is not ISO-8601",
                self.task_description
            )));
        }
        Ok(self)
    }
}

/// Ranked output, highest priority first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizeResponse {
    /// Tasks in priority order.
    pub prioritized_tasks: Vec<PrioritizedTask>,
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM[:SS[.f]]`, or `YYYY-MM-DD`.
#[must_use]
pub fn is_iso8601_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(deadline: Option<&str>) -> PrioritizedTask {
        PrioritizedTask {
            task_description: "Write report".to_string(),
            priority_level: "high".to_string(),
            estimated_effort: None,
            reasoning: "deadline today".to_string(),
            deadline: deadline.map(str::to_string),
        }
    }

    #[test]
    fn test_request_context_optional() {
        let request: PrioritizeRequest =
            serde_json::from_value(json!({"tasks": ["a"]})).unwrap();
        assert_eq!(request.context, None);

        let request: PrioritizeRequest =
            serde_json::from_value(json!({"tasks": ["a"], "context": null})).unwrap();
        assert_eq!(request.context, None);

        let request: PrioritizeRequest =
            serde_json::from_value(json!({"tasks": ["a"], "context": "ctx"})).unwrap();
        assert_eq!(request.effective_context(), Some("ctx"));
    }

    #[test]
    fn test_request_requires_tasks_field() {
        let result: Result<PrioritizeRequest, _> = serde_json::from_value(json!({"context": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(PrioritizeRequest::new(["a", "b"]).validate(10).is_ok());
        assert!(matches!(
            PrioritizeRequest::new(Vec::<String>::new()).validate(10),
            Err(PrioritizeError::InvalidRequest(_))
        ));
        assert!(matches!(
            PrioritizeRequest::new(["a", "  "]).validate(10),
            Err(PrioritizeError::InvalidRequest(_))
        ));
        assert!(matches!(
            PrioritizeRequest::new(["a", "b", "c"]).validate(2),
            Err(PrioritizeError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_whitespace_context_is_kept() {
        let request = PrioritizeRequest::new(["a"]).with_context("  \n");
        assert_eq!(request.effective_context(), Some("  \n"));
        let request = PrioritizeRequest::new(["a"]).with_context("");
        assert_eq!(request.effective_context(), None);
    }

    #[test]
    fn test_response_serializes_nulls() {
        let response = PrioritizeResponse {
            prioritized_tasks: vec![task(None)],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["prioritized_tasks"][0]["estimated_effort"], json!(null));
        assert_eq!(value["prioritized_tasks"][0]["deadline"], json!(null));
        assert_eq!(value["prioritized_tasks"][0]["reasoning"], "deadline today");
    }

    #[test]
    fn test_deadline_kept_verbatim() {
        let normalized = task(Some("2025-07-12T23:59:00")).validate().unwrap();
        assert_eq!(normalized.deadline.as_deref(), Some("2025-07-12T23:59:00"));
    }

    #[test]
    fn test_iso8601_forms() {
        assert!(is_iso8601_datetime("2025-07-12T23:59:00"));
        assert!(is_iso8601_datetime("2025-07-12T23:59:00.250"));
        assert!(is_iso8601_datetime("2025-07-12T23:59:00Z"));
        assert!(is_iso8601_datetime("2025-07-12T23:59:00+02:00"));
        assert!(is_iso8601_datetime("2025-07-12T23:59"));
        assert!(is_iso8601_datetime("2025-07-12"));
        assert!(!is_iso8601_datetime("next Friday"));
        assert!(!is_iso8601_datetime("2025-13-40T00:00:00"));
    }

    #[test]
    fn test_validate_rejects_bad_deadline() {
        assert!(matches!(
            task(Some("tomorrow")).validate(),
            Err(PrioritizeError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_blank_optionals_pass_through() {
        let mut t = task(Some(""));
        t.estimated_effort = Some(" ".to_string());
        let validated = t.clone().validate().unwrap();
        assert_eq!(validated, t);
        assert_eq!(validated.deadline.as_deref(), Some(""));
        assert_eq!(validated.estimated_effort.as_deref(), Some(" "));

        let spaced = task(Some("  "));
        assert_eq!(spaced.clone().validate().unwrap(), spaced);
    }
}
