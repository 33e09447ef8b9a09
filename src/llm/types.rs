//! Request/response types for the Gemini `generateContent` REST API.
//!
//! Field names follow the provider's camelCase JSON. Unknown response
//! fields (thought signatures, safety ratings) are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role used for caller-authored content.
pub const ROLE_USER: &str = "user";
/// Role used by the provider for model-authored content.
pub const ROLE_MODEL: &str = "model";

/// One `generateContent` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; a single user turn for this service.
    pub contents: Vec<Content>,
    /// System instruction attached to the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Declared tools.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Function calling constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
}

/// A turn made of parts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`; absent for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// User turn with one text part per segment.
    #[must_use]
    pub fn user_text<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: Some(ROLE_USER.to_string()),
            parts: segments.into_iter().map(Part::text).collect(),
        }
    }

    /// Role-less content carrying a system instruction.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

/// A single content part: text or a function call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Structured call to a declared function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl Part {
    /// Text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_call: None,
        }
    }

    /// Function call part.
    #[must_use]
    pub fn function_call(name: impl Into<String>, args: Value) -> Self {
        Self {
            text: None,
            function_call: Some(FunctionCall {
                name: name.into(),
                args,
            }),
        }
    }
}

/// Function call emitted by the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the declared function.
    pub name: String,
    /// Arguments object.
    #[serde(default)]
    pub args: Value,
}

/// Tool wrapper around function declarations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Declared functions.
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// Schema of a callable function (OpenAPI subset).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Function name.
    pub name: String,
    /// What the function does.
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// Tool configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    /// Function calling constraints.
    pub function_calling_config: FunctionCallingConfig,
}

/// Function calling constraints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallingConfig {
    /// Calling mode.
    pub mode: FunctionCallingMode,
    /// Functions the model may call in `ANY` mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_function_names: Vec<String>,
}

/// How the model may use declared functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionCallingMode {
    /// Model decides between text and a call.
    Auto,
    /// Model must call one of the allowed functions.
    Any,
    /// Function calling disabled.
    None,
}

/// Response of `generateContent`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate completions; the first is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    /// Concrete model version that served the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Single-candidate response carrying one function call.
    #[must_use]
    pub fn with_function_call(name: impl Into<String>, args: Value) -> Self {
        Self::with_parts(vec![Part::function_call(name, args)])
    }

    /// Single-candidate response carrying plain text only.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_parts(vec![Part::text(text)])
    }

    /// Single-candidate response with the given parts.
    #[must_use]
    pub fn with_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some(ROLE_MODEL.to_string()),
                    parts,
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            usage_metadata: None,
            model_version: None,
        }
    }
}

/// One candidate completion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content; absent when blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Why generation stopped (`STOP`, `SAFETY`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// First function call among the candidate's parts.
    #[must_use]
    pub fn first_function_call(&self) -> Option<&FunctionCall> {
        self.content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.function_call.as_ref())
    }
}

/// Token counts reported by the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Prompt tokens.
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Output tokens.
    #[serde(default)]
    pub candidates_token_count: u32,
    /// Total tokens.
    #[serde(default)]
    pub total_token_count: u32,
}
