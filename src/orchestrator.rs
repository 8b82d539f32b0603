//! Single-pass question handling.
//!
//! `inventory → resolver → dispatch`. Every failure is converted to a
//! [`Diagnostic`] at this boundary; callers get `None` rather than an error.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::OperationKind;
use crate::error::{AgentError, AgentResult, Diagnostic, ErrorKind};
use crate::llm::LlmClient;
use crate::metadata::{TableDescriptor, TableInventory, TableProfile, TableSchema};
use crate::profiler::TableProfiler;
use crate::resolver::{IntentResolver, ResolvedIntent};
use crate::store::ConnectionPool;

/// Result of one handled question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationResult {
    Tables { tables: Vec<TableDescriptor> },
    Schema(TableSchema),
    Profile(TableProfile),
}

impl OperationResult {
    /// The operation that produced this result.
    pub fn operation(&self) -> OperationKind {
        match self {
            OperationResult::Tables { .. } => OperationKind::ListTables,
            OperationResult::Schema(_) => OperationKind::GetTableSchema,
            OperationResult::Profile(_) => OperationKind::ProfileTable,
        }
    }
}

/// A result, or the reason there is none.
///
/// Both are `None` when the question simply did not map to an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HandleOutcome {
    pub result: Option<OperationResult>,
    pub diagnostic: Option<Diagnostic>,
}

impl HandleOutcome {
    fn success(result: OperationResult) -> Self {
        Self {
            result: Some(result),
            diagnostic: None,
        }
    }

    fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            result: None,
            diagnostic: Some(diagnostic),
        }
    }

    fn no_match() -> Self {
        Self::default()
    }
}

/// Wires inventory, resolver and profiler together.
///
/// Holds no per-question state. Connections are checked out of the pool
/// per operation and never held across the language service call.
pub struct Orchestrator {
    pool: ConnectionPool,
    inventory: TableInventory,
    resolver: IntentResolver,
    profiler: TableProfiler,
}

impl Orchestrator {
    pub fn new(pool: ConnectionPool, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            inventory: TableInventory::new(pool.clone()),
            profiler: TableProfiler::new(pool.clone()),
            resolver: IntentResolver::new(llm),
            pool,
        }
    }

    pub fn inventory(&self) -> &TableInventory {
        &self.inventory
    }

    pub fn profiler(&self) -> &TableProfiler {
        &self.profiler
    }

    /// Answer `question`, or `None` if it could not be answered.
    pub async fn handle(&self, question: &str) -> Option<OperationResult> {
        self.handle_with_diagnostics(question).await.result
    }

    /// Like [`handle`](Self::handle), but says why there is no result.
    pub async fn handle_with_diagnostics(&self, question: &str) -> HandleOutcome {
        let tables = match self.inventory.list_tables().await {
            Ok(tables) => tables,
            Err(e) => return report(e),
        };
        if tables.is_empty() {
            tracing::warn!("no tables available; skipping question");
            return HandleOutcome::failed(Diagnostic::new(
                ErrorKind::NotFound,
                "the database has no tables to ask about",
            ));
        }

        let intent = match self.resolver.resolve(question, &tables).await {
            Ok(Some(intent)) => intent,
            Ok(None) => return HandleOutcome::no_match(),
            Err(e) => return report(e),
        };

        match self.dispatch(intent, tables).await {
            Ok(result) => HandleOutcome::success(result),
            Err(e) => report(e),
        }
    }

    async fn dispatch(
        &self,
        intent: ResolvedIntent,
        tables: Vec<TableDescriptor>,
    ) -> AgentResult<OperationResult> {
        match intent.operation {
            OperationKind::ListTables => Ok(OperationResult::Tables { tables }),
            OperationKind::GetTableSchema => {
                let table = required_table(&intent)?;
                self.profiler.get_schema(table).await.map(OperationResult::Schema)
            }
            OperationKind::ProfileTable => {
                let table = required_table(&intent)?;
                self.profiler.profile(table).await.map(OperationResult::Profile)
            }
        }
    }

    /// Open one connection and release it.
    pub async fn check_connection(&self) -> AgentResult<()> {
        self.pool.check().await?;
        tracing::info!(target = %self.pool.describe(), "database connection ok");
        Ok(())
    }
}

// The resolver guarantees a table name for schema and profile intents.
fn required_table(intent: &ResolvedIntent) -> AgentResult<&str> {
    intent
        .table_name()
        .ok_or_else(|| AgentError::NotFound(String::new()))
}

fn report(err: AgentError) -> HandleOutcome {
    tracing::warn!(kind = %err.kind(), error = %err, "question failed");
    HandleOutcome::failed(err.to_diagnostic())
}
