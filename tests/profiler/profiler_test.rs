//! Schema lookup and profiling over a real SQLite file.

#[path = "../common/mod.rs"]
mod common;

use common::TestDb;
use querent::error::{AgentError, ErrorKind};
use querent::metadata::TableInventory;
use querent::profiler::TableProfiler;
use querent::store::SqlValue;

#[tokio::test]
async fn test_inventory_lists_tables_with_counts() {
    let db = TestDb::sales();
    let tables = TableInventory::new(db.pool()).list_tables().await.unwrap();

    let listed: Vec<(String, u64)> = tables
        .iter()
        .map(|t| (t.qualified_name(), t.approx_row_count))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("main.empty_table".to_string(), 0),
            ("main.orders".to_string(), 3),
            ("main.vendors".to_string(), 4),
        ]
    );
}

#[tokio::test]
async fn test_schema_of_vendors() {
    let db = TestDb::sales();
    let schema = TableProfiler::new(db.pool())
        .get_schema("main.vendors")
        .await
        .unwrap();

    assert_eq!(schema.qualified_name(), "main.vendors");
    let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["VendorId", "Name", "Rating", "JoinedOn", "Logo"]);

    let ordinals: Vec<u32> = schema.columns.iter().map(|c| c.ordinal_position).collect();
    assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);

    let id = schema.column("vendorid").unwrap();
    assert!(id.is_primary_key);
    assert!(id.is_identity);
    assert!(!id.nullable);

    let name = schema.column("Name").unwrap();
    assert_eq!(name.declared_type, "VARCHAR(100)");
    assert_eq!(name.max_length, Some(100));
    assert!(!name.nullable);
    assert!(!name.is_primary_key);

    let rating = schema.column("Rating").unwrap();
    assert_eq!((rating.precision, rating.scale), (Some(3), Some(1)));
    assert!(rating.nullable);
}

#[tokio::test]
async fn test_bare_name_resolves_to_main() {
    let db = TestDb::sales();
    let schema = TableProfiler::new(db.pool())
        .get_schema("orders")
        .await
        .unwrap();

    assert_eq!(schema.namespace, "main");
    assert!(schema.column("VendorId").unwrap().is_foreign_key);
    assert!(!schema.column("Total").unwrap().is_foreign_key);
}

#[tokio::test]
async fn test_unknown_tables_are_not_found() {
    let db = TestDb::sales();
    let profiler = TableProfiler::new(db.pool());

    for name in ["customers", "main.customers", "dbo.vendors", "", "main."] {
        let err = profiler.get_schema(name).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "{:?}", name);

        let err = profiler.profile(name).await.unwrap_err();
        assert!(matches!(err, AgentError::NotFound(_)), "{:?}", name);
    }
}

#[tokio::test]
async fn test_profile_of_vendors() {
    let db = TestDb::sales();
    let profile = TableProfiler::new(db.pool())
        .profile("main.vendors")
        .await
        .unwrap();

    assert_eq!(profile.qualified_name(), "main.vendors");
    assert_eq!(profile.total_row_count, 4);
    let names: Vec<&str> = profile.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["VendorId", "Name", "Rating", "JoinedOn", "Logo"]);

    let id = &profile.columns[0];
    assert_eq!(id.null_count, 0);
    assert_eq!(id.unique_value_count, 4);
    assert_eq!(id.min_value, Some(SqlValue::Int(1)));
    assert_eq!(id.max_value, Some(SqlValue::Int(4)));
    assert_eq!(id.avg_value, Some(2.5));
    assert_eq!(profile.null_percentage(id), 0.0);
    assert_eq!(profile.unique_percentage(id), 100.0);

    let name = &profile.columns[1];
    assert_eq!(name.min_value, Some(SqlValue::Text("Acme".to_string())));
    assert_eq!(name.max_value, Some(SqlValue::Text("Umbrella".to_string())));
    assert_eq!(name.avg_value, None);

    // 3.0 is stored as an integer under NUMERIC affinity.
    let rating = &profile.columns[2];
    assert_eq!(rating.null_count, 1);
    assert_eq!(rating.unique_value_count, 2);
    assert_eq!(rating.min_value, Some(SqlValue::Int(3)));
    assert_eq!(rating.max_value, Some(SqlValue::Float(4.5)));
    assert_eq!(rating.avg_value, Some(4.0));
    assert_eq!(profile.null_percentage(rating), 25.0);
    assert_eq!(profile.unique_percentage(rating), 50.0);

    let joined = &profile.columns[3];
    assert_eq!(joined.null_count, 1);
    assert_eq!(joined.unique_value_count, 3);
    assert_eq!(joined.min_value, Some(SqlValue::Text("2019-11-30".to_string())));
    assert_eq!(joined.max_value, Some(SqlValue::Text("2021-06-01".to_string())));
    assert_eq!(joined.avg_value, None);

    let logo = &profile.columns[4];
    assert_eq!(logo.null_count, 2);
    assert_eq!(logo.unique_value_count, 2);
    assert_eq!(logo.min_value, None);
    assert_eq!(logo.max_value, None);
    assert_eq!(logo.avg_value, None);

    // Distinct values among null rows are always zero.
    assert!(profile.columns.iter().all(|c| c.distinct_value_count == 0));
}

#[tokio::test]
async fn test_profile_of_empty_table() {
    let db = TestDb::sales();
    let profile = TableProfiler::new(db.pool())
        .profile("empty_table")
        .await
        .unwrap();

    assert_eq!(profile.total_row_count, 0);
    assert_eq!(profile.columns.len(), 2);
    for column in &profile.columns {
        assert_eq!(column.null_count, 0);
        assert_eq!(column.unique_value_count, 0);
        assert_eq!(column.min_value, None);
        assert_eq!(column.max_value, None);
        assert_eq!(column.avg_value, None);
        assert_eq!(profile.null_percentage(column), 0.0);
        assert_eq!(profile.unique_percentage(column), 0.0);
    }
}

#[tokio::test]
async fn test_profile_is_repeatable() {
    let db = TestDb::sales();
    let profiler = TableProfiler::new(db.pool());

    let first = profiler.profile("main.orders").await.unwrap();
    let second = profiler.profile("main.orders").await.unwrap();
    assert_eq!(first, second);

    let total = first.columns.iter().find(|c| c.name == "Total").unwrap();
    assert_eq!(total.avg_value, Some(125.0 / 3.0));
    let note = first.columns.iter().find(|c| c.name == "Note").unwrap();
    assert_eq!(note.null_count, 1);
    assert_eq!(note.unique_value_count, 1);
}

#[tokio::test]
async fn test_profile_reflects_new_rows() {
    let db = TestDb::sales();
    let profiler = TableProfiler::new(db.pool());

    let before = profiler.profile("orders").await.unwrap();
    db.execute("INSERT INTO orders VALUES (13, 2, 10.0, NULL);");
    let after = profiler.profile("orders").await.unwrap();

    assert_eq!(before.total_row_count, 3);
    assert_eq!(after.total_row_count, 4);
}

#[tokio::test]
async fn test_profile_serializes_percentages() {
    let db = TestDb::sales();
    let profile = TableProfiler::new(db.pool())
        .profile("main.vendors")
        .await
        .unwrap();

    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["total_row_count"], 4);
    let logo = &json["columns"][4];
    assert_eq!(logo["name"], "Logo");
    assert_eq!(logo["null_percentage"], 50.0);
    assert_eq!(logo["unique_percentage"], 50.0);
    assert!(logo["min_value"].is_null());
}

#[tokio::test]
async fn test_failed_column_query_fails_whole_profile() {
    let db = TestDb::sales();
    let profiler = TableProfiler::new(db.pool_failing_on("MIN(\"Name\")"));

    let err = profiler.profile("vendors").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Profiling);
    match err {
        AgentError::Profiling { table, column, .. } => {
            assert_eq!(table, "main.vendors");
            assert_eq!(column.as_deref(), Some("Name"));
        }
        other => panic!("expected a profiling error, got {:?}", other),
    }

    // Other tables are unaffected.
    assert!(profiler.profile("orders").await.is_ok());
}

#[tokio::test]
async fn test_failed_row_count_names_no_column() {
    let db = TestDb::sales();
    let profiler = TableProfiler::new(db.pool_failing_on("SELECT COUNT(*) FROM \"main\".\"vendors\""));

    let err = profiler.profile("main.vendors").await.unwrap_err();
    assert!(matches!(err, AgentError::Profiling { column: None, .. }));
    assert!(err.to_string().contains("row count"));
}

#[tokio::test]
async fn test_names_come_back_as_the_catalog_spells_them() {
    let db = TestDb::sales();
    let profiler = TableProfiler::new(db.pool());

    let schema = profiler.get_schema("VENDORS").await.unwrap();
    assert_eq!(schema.qualified_name(), "main.vendors");

    let profile = profiler.profile("MAIN.Orders").await.unwrap();
    assert_eq!(profile.qualified_name(), "main.orders");
}
