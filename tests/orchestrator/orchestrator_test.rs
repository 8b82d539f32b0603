//! End-to-end question handling over SQLite with a scripted language service.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{ScriptedLlm, TestDb};
use querent::catalog::OperationKind;
use querent::error::ErrorKind;
use querent::llm::{LlmError, ToolSelection};
use querent::orchestrator::{OperationResult, Orchestrator};
use querent::store::{ConnectionPool, PoolOptions, SqliteConnector};

#[tokio::test]
async fn test_list_tables_returns_inventory() {
    let db = TestDb::sales();
    let llm = ScriptedLlm::calling("list_tables", "{}");
    let orchestrator = Orchestrator::new(db.pool(), llm.clone());

    let result = orchestrator
        .handle("Show me all the tables in the database")
        .await
        .unwrap();

    let OperationResult::Tables { tables } = &result else {
        panic!("expected tables, got {:?}", result);
    };
    let names: Vec<String> = tables.iter().map(|t| t.qualified_name()).collect();
    assert_eq!(names, vec!["main.empty_table", "main.orders", "main.vendors"]);
    assert_eq!(result.operation(), OperationKind::ListTables);
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_schema_question() {
    let db = TestDb::sales();
    let llm = ScriptedLlm::calling("get_table_schema", r#"{"table_name":"main.vendors"}"#);
    let orchestrator = Orchestrator::new(db.pool(), llm.clone());

    let outcome = orchestrator
        .handle_with_diagnostics("What's the structure of the vendors table?")
        .await;

    assert_eq!(outcome.diagnostic, None);
    let Some(OperationResult::Schema(schema)) = outcome.result else {
        panic!("expected a schema");
    };
    assert_eq!(schema.qualified_name(), "main.vendors");
    assert_eq!(schema.columns.len(), 5);

    // The prompt was grounded in the live inventory.
    let prompt = &llm.calls()[0].user_prompt;
    assert!(prompt.contains("- main.vendors (4 rows)"));
    assert!(prompt.contains("- main.empty_table (0 rows)"));
}

#[tokio::test]
async fn test_profile_question() {
    let db = TestDb::sales();
    let llm = ScriptedLlm::calling("profile_table", r#"{"table_name":"orders"}"#);
    let orchestrator = Orchestrator::new(db.pool(), llm);

    let result = orchestrator.handle("Give me stats on orders").await;

    let Some(OperationResult::Profile(profile)) = result else {
        panic!("expected a profile");
    };
    assert_eq!(profile.qualified_name(), "main.orders");
    assert_eq!(profile.total_row_count, 3);
    assert_eq!(profile.columns.len(), 4);
}

#[tokio::test]
async fn test_empty_database_skips_language_service() {
    let db = TestDb::empty();
    let llm = ScriptedLlm::calling("list_tables", "{}");
    let orchestrator = Orchestrator::new(db.pool(), llm.clone());

    let outcome = orchestrator.handle_with_diagnostics("Show me all the tables").await;

    assert_eq!(outcome.result, None);
    assert_eq!(outcome.diagnostic.map(|d| d.kind), Some(ErrorKind::NotFound));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_table_is_not_found() {
    let db = TestDb::sales();
    let llm = ScriptedLlm::calling("profile_table", r#"{"table_name":"main.customers"}"#);
    let orchestrator = Orchestrator::new(db.pool(), llm);

    let outcome = orchestrator.handle_with_diagnostics("Profile the customers table").await;

    assert_eq!(outcome.result, None);
    let diagnostic = outcome.diagnostic.unwrap();
    assert_eq!(diagnostic.kind, ErrorKind::NotFound);
    assert!(diagnostic.message.contains("main.customers"));
}

#[tokio::test]
async fn test_unmatched_question_has_no_diagnostic() {
    let db = TestDb::sales();
    let llm = ScriptedLlm::replying(ToolSelection::none());
    let orchestrator = Orchestrator::new(db.pool(), llm.clone());

    let outcome = orchestrator.handle_with_diagnostics("What's the weather like?").await;

    assert_eq!(outcome.result, None);
    assert_eq!(outcome.diagnostic, None);
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_language_service_failure_is_reported() {
    let db = TestDb::sales();
    let llm = ScriptedLlm::failing(LlmError::MalformedResponse("no choices".to_string()));
    let orchestrator = Orchestrator::new(db.pool(), llm);

    let outcome = orchestrator.handle_with_diagnostics("Show me all the tables").await;

    assert_eq!(outcome.result, None);
    assert_eq!(outcome.diagnostic.map(|d| d.kind), Some(ErrorKind::Resolution));
}

#[tokio::test]
async fn test_unreachable_store_is_connection_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.db");
    let pool = ConnectionPool::new(
        Arc::new(SqliteConnector::new(missing)),
        PoolOptions::default(),
    );
    let llm = ScriptedLlm::calling("list_tables", "{}");
    let orchestrator = Orchestrator::new(pool, llm.clone());

    let outcome = orchestrator.handle_with_diagnostics("Show me all the tables").await;

    assert_eq!(outcome.result, None);
    assert_eq!(outcome.diagnostic.map(|d| d.kind), Some(ErrorKind::Connection));
    assert_eq!(llm.call_count(), 0);
    assert!(orchestrator.check_connection().await.is_err());
}

#[tokio::test]
async fn test_check_connection() {
    let db = TestDb::sales();
    let orchestrator = Orchestrator::new(db.pool(), ScriptedLlm::replying(ToolSelection::none()));
    orchestrator.check_connection().await.unwrap();
}

#[tokio::test]
async fn test_repeated_questions_release_connections() {
    let db = TestDb::sales();
    let pool = db.pool_with(common::fast_fail_options(1, 1));
    let llm = ScriptedLlm::calling("profile_table", r#"{"table_name":"main.vendors"}"#);
    let orchestrator = Orchestrator::new(pool.clone(), llm.clone());

    for _ in 0..3 {
        assert!(orchestrator.handle("Profile vendors").await.is_some());
    }
    assert_eq!(llm.call_count(), 3);
    assert_eq!(pool.available_permits(), 1);
    assert_eq!(pool.idle_count(), 1);
}

#[tokio::test]
async fn test_result_serializes_with_kind_tag() {
    let db = TestDb::sales();
    let llm = ScriptedLlm::calling("list_tables", "{}");
    let orchestrator = Orchestrator::new(db.pool(), llm);

    let result = orchestrator.handle("List the tables").await.unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["kind"], "tables");
    assert_eq!(json["tables"][2]["name"], "vendors");
    assert_eq!(json["tables"][2]["approx_row_count"], 4);
}

#[tokio::test]
async fn test_profiling_failure_is_reported() {
    let db = TestDb::sales();
    let llm = ScriptedLlm::calling("profile_table", r#"{"table_name":"main.vendors"}"#);
    let orchestrator = Orchestrator::new(db.pool_failing_on("MIN(\"Name\")"), llm);

    let outcome = orchestrator.handle_with_diagnostics("Give me stats on vendors").await;

    assert_eq!(outcome.result, None);
    let diagnostic = outcome.diagnostic.unwrap();
    assert_eq!(diagnostic.kind, ErrorKind::Profiling);
    assert!(diagnostic.message.contains("Name"));
}
