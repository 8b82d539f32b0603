//! # Querent
//!
//! Ask natural-language questions about a relational database and get its
//! tables, a table's schema, or a statistical profile of a table back.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      question                            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [TableInventory]
//! ┌─────────────────────────────────────────────────────────┐
//! │        live table list (namespace.name, row count)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [IntentResolver + catalog tool menu]
//! ┌─────────────────────────────────────────────────────────┐
//! │     ResolvedIntent (list_tables | get_table_schema |     │
//! │                     profile_table, table_name)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Orchestrator dispatch]
//! ┌─────────────────────────────────────────────────────────┐
//! │   OperationResult (tables | TableSchema | TableProfile)  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is reached through a bounded [`store::ConnectionPool`]; the
//! language service through the [`llm::LlmClient`] trait.

pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod metadata;
pub mod orchestrator;
pub mod profiler;
pub mod render;
pub mod resolver;
pub mod sql;
pub mod store;

pub use sql::dialect;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{get_operation, list_operations, Operation, OperationKind};
    pub use crate::config::{ConnectionConfig, Settings};
    pub use crate::error::{AgentError, Diagnostic, ErrorKind};
    pub use crate::llm::{LlmClient, OpenAiClient, ToolDefinition, ToolSelection};
    pub use crate::metadata::{
        ColumnDescriptor, ColumnProfile, TableDescriptor, TableInventory, TableProfile, TableSchema,
    };
    pub use crate::orchestrator::{HandleOutcome, OperationResult, Orchestrator};
    pub use crate::profiler::TableProfiler;
    pub use crate::resolver::{IntentResolver, ResolvedIntent};
    pub use crate::sql::{Dialect, SqlDialect};
    pub use crate::store::{ConnectionPool, PoolOptions, SqlValue};
}
