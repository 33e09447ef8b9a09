//! The structured-output contract declared to the model.

use serde_json::{json, Value};

use crate::llm::{
    Content, FunctionCallingConfig, FunctionCallingMode, FunctionDeclaration, Tool, ToolConfig,
};

/// Name of the declared function.
pub const FUNCTION_NAME: &str = "prioritize_tasks";

/// Name of the function's list argument.
pub const TASKS_ARGUMENT: &str = "prioritized_tasks";

/// Persona and prioritization criteria.
pub const SYSTEM_INSTRUCTION: &str = r#"You are a world-class executive assistant and a master of productivity, named 'Agena'.
Your primary function is to take an unstructured list of tasks and user context,
and then intelligently prioritize them.

When prioritizing, you must consider the following factors:
- **Urgency:** How soon is the deadline? Tasks with closer deadlines are generally more urgent.
- **Importance:** What is the impact of completing this task? Does it align with key goals? High-impact tasks are more important.
- **Effort:** How much time and energy will this task require? Sometimes it's best to knock out quick wins first.
- **Dependencies:** Does another task depend on this one being completed?
- **Deadline:** If provided, this will help you determine urgency precisely, in formats like "2025-07-12T23:59:00".

Your final output **MUST** be structured by calling the `prioritize_tasks` tool. Do not just return a text list.
Provide clear, concise reasoning for each task's priority."#;

/// JSON schema of the `prioritize_tasks` arguments.
#[must_use]
pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            TASKS_ARGUMENT: {
                "type": "array",
                "description": "A list of tasks, sorted from highest to lowest priority.",
                "items": {
                    "type": "object",
                    "properties": {
                        "task_description": {"type": "string"},
                        "priority_level": {"type": "string"},
                        "estimated_effort": {"type": "string"},
                        "reasoning": {"type": "string"},
                        "deadline": {"type": "string", "format": "date-time"}
                    },
                    "required": ["task_description", "priority_level", "reasoning"]
                }
            }
        },
        "required": [TASKS_ARGUMENT]
    })
}

/// The `prioritize_tasks` declaration.
#[must_use]
pub fn function_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: FUNCTION_NAME.to_string(),
        description: "Formats a list of tasks into a prioritized order with details.".to_string(),
        parameters: parameters_schema(),
    }
}

/// Tool list attached to every call.
#[must_use]
pub fn tools() -> Vec<Tool> {
    vec![Tool {
        function_declarations: vec![function_declaration()],
    }]
}

/// Forces the model to answer with a `prioritize_tasks` call.
#[must_use]
pub fn tool_config() -> ToolConfig {
    ToolConfig {
        function_calling_config: FunctionCallingConfig {
            mode: FunctionCallingMode::Any,
            allowed_function_names: vec![FUNCTION_NAME.to_string()],
        },
    }
}

/// System instruction content.
#[must_use]
pub fn system_instruction() -> Content {
    Content::system(SYSTEM_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let schema = parameters_schema();
        assert_eq!(schema["required"], json!(["prioritized_tasks"]));

        let items = &schema["properties"]["prioritized_tasks"]["items"];
        assert_eq!(
            items["required"],
            json!(["task_description", "priority_level", "reasoning"])
        );
        assert_eq!(items["properties"]["deadline"]["format"], "date-time");
        assert!(items["properties"].get("estimated_effort").is_some());
    }

    #[test]
    fn test_instruction_mandates_tool_call() {
        assert!(SYSTEM_INSTRUCTION.contains("MUST"));
        assert!(SYSTEM_INSTRUCTION.contains("`prioritize_tasks`"));
        for criterion in ["Urgency", "Importance", "Effort", "Dependencies", "Deadline"] {
            assert!(SYSTEM_INSTRUCTION.contains(criterion), "missing {criterion}");
        }
    }

    #[test]
    fn test_tool_config_allows_only_prioritize() {
        let config = tool_config();
        assert_eq!(config.function_calling_config.mode, FunctionCallingMode::Any);
        assert_eq!(
            config.function_calling_config.allowed_function_names,
            vec![FUNCTION_NAME.to_string()]
        );
    }
}
