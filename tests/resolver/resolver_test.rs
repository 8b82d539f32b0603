//! Intent resolution against a scripted language service.

#[path = "../common/mod.rs"]
mod common;

use common::ScriptedLlm;
use querent::catalog::OperationKind;
use querent::error::{AgentError, ErrorKind};
use querent::llm::{LlmError, ToolSelection};
use querent::metadata::TableDescriptor;
use querent::resolver::{IntentResolver, ResolvedIntent};

fn inventory() -> Vec<TableDescriptor> {
    vec![
        TableDescriptor::new("dbo", "orders", 120),
        TableDescriptor::new("dbo", "vendors", 10),
    ]
}

#[tokio::test]
async fn test_list_tables_question() {
    let llm = ScriptedLlm::calling("list_tables", "{}");
    let resolver = IntentResolver::new(llm.clone());

    let intent = resolver
        .resolve("Show me all the tables in the database", &inventory())
        .await
        .unwrap();

    assert_eq!(intent, Some(ResolvedIntent::new(OperationKind::ListTables)));
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_schema_question_carries_table_name() {
    let llm = ScriptedLlm::calling("get_table_schema", r#"{"table_name": "dbo.vendors"}"#);
    let resolver = IntentResolver::new(llm.clone());

    let intent = resolver
        .resolve("What's the structure of the vendors table?", &inventory())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(intent.operation, OperationKind::GetTableSchema);
    assert_eq!(intent.table_name(), Some("dbo.vendors"));
    assert_eq!(intent.parameters.len(), 1);
}

#[tokio::test]
async fn test_prompt_lists_inventory_and_question() {
    let llm = ScriptedLlm::calling("profile_table", r#"{"table_name":"dbo.orders"}"#);
    let resolver = IntentResolver::new(llm.clone());

    resolver
        .resolve("Give me stats on orders", &inventory())
        .await
        .unwrap();

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert!(call.user_prompt.contains("- dbo.orders (120 rows)"));
    assert!(call.user_prompt.contains("- dbo.vendors (10 rows)"));
    assert!(call.user_prompt.contains("Question: Give me stats on orders"));
    assert!(!call.system_prompt.is_empty());
    assert_eq!(
        call.tool_names,
        vec!["list_tables", "get_table_schema", "profile_table"]
    );
}

#[tokio::test]
async fn test_no_tool_call_is_no_match() {
    let llm = ScriptedLlm::replying(ToolSelection::none());
    let resolver = IntentResolver::new(llm);

    let intent = resolver
        .resolve("What's the weather like?", &inventory())
        .await
        .unwrap();
    assert_eq!(intent, None);
}

#[tokio::test]
async fn test_invalid_selection_is_no_match() {
    let llm = ScriptedLlm::calling("profile_table", r#"{"table":"dbo.orders"}"#);
    let resolver = IntentResolver::new(llm);

    let intent = resolver
        .resolve("Profile the orders table", &inventory())
        .await
        .unwrap();
    assert_eq!(intent, None);
}

#[tokio::test]
async fn test_service_failure_is_resolution_error() {
    let llm = ScriptedLlm::failing(LlmError::api(503, "overloaded"));
    let resolver = IntentResolver::new(llm.clone());

    let err = resolver
        .resolve("Show me all the tables", &inventory())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Resolution(_)));
    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert_eq!(llm.call_count(), 1);
}
