//! The fixed set of operations a question can be routed to.
//!
//! The catalog is static and immutable. Each operation declares its
//! parameters, a description, sample questions and keywords; the last three
//! are folded into the tool description shown to the language service.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::llm::ToolDefinition;

/// Closed set of operations. Adding one means updating the catalog and
/// every dispatcher that matches on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    ListTables,
    GetTableSchema,
    ProfileTable,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::ListTables,
        OperationKind::GetTableSchema,
        OperationKind::ProfileTable,
    ];

    /// Catalog name, as exposed to the language service.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::ListTables => "list_tables",
            OperationKind::GetTableSchema => "get_table_schema",
            OperationKind::ProfileTable => "profile_table",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The catalog entry for this kind.
    pub fn operation(&self) -> &'static Operation {
        match self {
            OperationKind::ListTables => &OPERATIONS[0],
            OperationKind::GetTableSchema => &OPERATIONS[1],
            OperationKind::ProfileTable => &OPERATIONS[2],
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One named string parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub description: &'static str,
    pub parameters: &'static [ParameterSpec],
    pub examples: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

/// Name of the table argument shared by the schema and profile operations.
pub const TABLE_NAME_PARAM: &str = "table_name";

static OPERATIONS: [Operation; 3] = [
    Operation {
        kind: OperationKind::ListTables,
        description: "Get a list of all tables in the database. Use this when the user wants to see what tables are available or asks about the database structure in general.",
        parameters: &[],
        examples: &[
            "Show me all tables",
            "What tables are in the database?",
            "List all available tables",
            "What tables do we have?",
            "Show me the database structure",
        ],
        keywords: &[
            "list",
            "all tables",
            "show tables",
            "available tables",
            "database structure",
            "what tables",
        ],
    },
    Operation {
        kind: OperationKind::GetTableSchema,
        description: "Get the schema (structure) of a specific table. Use this when the user wants to know about the columns, data types, or structure of a particular table.",
        parameters: &[ParameterSpec {
            name: TABLE_NAME_PARAM,
            description: "Name of the table to get schema for",
            required: true,
        }],
        examples: &[
            "What's the structure of the vendors table?",
            "Show me the columns in customers table",
            "What fields are in the orders table?",
            "Describe the schema of vendors",
            "What's the layout of the customers table?",
        ],
        keywords: &[
            "structure",
            "schema",
            "columns",
            "fields",
            "layout",
            "describe",
            "what's in",
            "show columns",
        ],
    },
    Operation {
        kind: OperationKind::ProfileTable,
        description: "Get detailed profiling and statistics of a table. Use this when the user wants to see data quality metrics, statistics, or analysis of a specific table's contents.",
        parameters: &[ParameterSpec {
            name: TABLE_NAME_PARAM,
            description: "Name of the table to profile",
            required: true,
        }],
        examples: &[
            "Give me statistics about the customers table",
            "Profile the vendors table",
            "Show me the data quality of orders",
            "What are the metrics for customers?",
            "Analyze the vendors table",
        ],
        keywords: &[
            "statistics",
            "profile",
            "metrics",
            "analyze",
            "data quality",
            "show stats",
            "give stats",
        ],
    },
];

impl Operation {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn parameter(&self, name: &str) -> Option<&'static ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &'static str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
    }

    /// JSON Schema of the arguments object. Unknown keys are not allowed.
    pub fn parameter_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.to_string(),
                    json!({ "type": "string", "description": p.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self.required_parameters().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// The function signature offered to the language service.
    pub fn tool_definition(&self) -> ToolDefinition {
        let mut description = self.description.to_string();
        if !self.examples.is_empty() {
            description.push_str("\nExample questions: ");
            description.push_str(&self.examples.join("; "));
        }
        if !self.keywords.is_empty() {
            description.push_str("\nKeywords: ");
            description.push_str(&self.keywords.join(", "));
        }

        ToolDefinition {
            name: self.name().to_string(),
            description,
            parameters: self.parameter_schema(),
        }
    }
}

/// All operations, in stable order.
pub fn list_operations() -> &'static [Operation] {
    &OPERATIONS
}

/// Look up an operation by catalog name.
pub fn get_operation(name: &str) -> Option<&'static Operation> {
    OperationKind::from_name(name).map(|kind| kind.operation())
}

/// One tool definition per operation, in catalog order.
pub fn tool_menu() -> Vec<ToolDefinition> {
    list_operations()
        .iter()
        .map(Operation::tool_definition)
        .collect()
}
