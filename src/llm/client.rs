//! The language service seam.

use async_trait::async_trait;
use serde::Serialize;

use super::error::LlmError;

/// One callable function offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// What the model chose, verbatim.
///
/// Both fields are untrusted; the resolver validates them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSelection {
    pub selected_tool: Option<String>,
    pub arguments_json: Option<String>,
}

impl ToolSelection {
    /// The model answered without calling a tool.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn call(tool: impl Into<String>, arguments_json: impl Into<String>) -> Self {
        Self {
            selected_tool: Some(tool.into()),
            arguments_json: Some(arguments_json.into()),
        }
    }
}

/// A function-calling completion service.
///
/// One call is one network round-trip. Implementations do not retry.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Ask the model to pick at most one of `tools` for `user_prompt`.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<ToolSelection, LlmError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Provider identifier, for logs.
    fn provider_name(&self) -> &'static str;
}
