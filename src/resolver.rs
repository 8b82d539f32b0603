//! Question to operation routing.
//!
//! The resolver grounds the language service in the live inventory, offers
//! the catalog as a function-call menu and validates whatever comes back.
//! Anything that does not validate is treated as "no match"; it never
//! guesses.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{self, Operation, OperationKind, TABLE_NAME_PARAM};
use crate::error::AgentResult;
use crate::llm::{LlmClient, ToolDefinition, ToolSelection};
use crate::metadata::TableDescriptor;

const SYSTEM_PROMPT: &str = "You are a database expert that routes questions about \
database tables to the function that answers them.";

/// An operation plus its validated string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIntent {
    pub operation: OperationKind,
    pub parameters: BTreeMap<String, String>,
}

impl ResolvedIntent {
    pub fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn operation_name(&self) -> &'static str {
        self.operation.name()
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn table_name(&self) -> Option<&str> {
        self.parameter(TABLE_NAME_PARAM)
    }
}

/// One line per table: `- namespace.name (N rows)`.
pub fn table_context(tables: &[TableDescriptor]) -> String {
    tables
        .iter()
        .map(|t| format!("- {} ({} rows)", t.qualified_name(), t.approx_row_count))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The user message sent with the tool menu.
pub fn build_prompt(question: &str, tables: &[TableDescriptor]) -> String {
    format!(
        "Given the following question about database tables, call the function that answers it.\n\
         Available tables:\n\
         {}\n\n\
         Question: {}\n\n\
         Refer to tables by their full name (namespace.table) exactly as listed above. \
         If no function fits the question, do not call any function.",
        table_context(tables),
        question.trim()
    )
}

/// Maps free-text questions to catalog operations.
pub struct IntentResolver {
    llm: Arc<dyn LlmClient>,
    tools: Vec<ToolDefinition>,
}

impl IntentResolver {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            tools: catalog::tool_menu(),
        }
    }

    /// Resolve `question` against the given inventory.
    ///
    /// Makes exactly one call to the language service. `Ok(None)` means no
    /// operation fits or the answer failed validation; `Err` means the
    /// service itself failed.
    pub async fn resolve(
        &self,
        question: &str,
        tables: &[TableDescriptor],
    ) -> AgentResult<Option<ResolvedIntent>> {
        let prompt = build_prompt(question, tables);
        tracing::debug!(
            provider = self.llm.provider_name(),
            model = self.llm.model_name(),
            tables = tables.len(),
            prompt_chars = prompt.len(),
            "resolving question"
        );

        let selection = self.llm.complete(SYSTEM_PROMPT, &prompt, &self.tools).await?;
        let intent = interpret(selection);

        match &intent {
            Some(intent) => tracing::info!(
                operation = intent.operation_name(),
                parameters = ?intent.parameters,
                "resolved question"
            ),
            None => tracing::info!("question did not match any operation"),
        }
        Ok(intent)
    }
}

/// Validate a raw tool selection against the catalog.
pub fn interpret(selection: ToolSelection) -> Option<ResolvedIntent> {
    let name = selection.selected_tool?;
    let name = name.trim();
    if name.is_empty() || name.eq_ignore_ascii_case("none") {
        return None;
    }

    let Some(operation) = catalog::get_operation(name) else {
        tracing::warn!(tool = name, "language service selected an unknown operation");
        return None;
    };

    let parameters = parse_arguments(operation, selection.arguments_json.as_deref())?;
    Some(ResolvedIntent {
        operation: operation.kind,
        parameters,
    })
}

/// Arguments must be a JSON object of strings, naming only declared
/// parameters and supplying every required one.
fn parse_arguments(operation: &Operation, raw: Option<&str>) -> Option<BTreeMap<String, String>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("{}");

    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) | Err(_) => {
            tracing::warn!(operation = operation.name(), "tool arguments are not a JSON object");
            return None;
        }
    };

    let mut parameters = BTreeMap::new();
    for (key, value) in object {
        if operation.parameter(&key).is_none() {
            tracing::warn!(operation = operation.name(), parameter = %key, "unexpected tool argument");
            return None;
        }
        let Value::String(value) = value else {
            tracing::warn!(operation = operation.name(), parameter = %key, "tool argument is not a string");
            return None;
        };
        parameters.insert(key, value);
    }

    let missing = operation
        .required_parameters()
        .find(|name| parameters.get(*name).map_or(true, |v| v.trim().is_empty()));
    if let Some(name) = missing {
        tracing::warn!(operation = operation.name(), parameter = name, "required tool argument missing");
        return None;
    }

    Some(parameters)
}
