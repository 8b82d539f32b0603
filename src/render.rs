//! Plain-text rendering of results for the terminal.

use std::fmt::Write;

use crate::metadata::{TableDescriptor, TableProfile, TableSchema};
use crate::orchestrator::OperationResult;
use crate::store::SqlValue;

const CELL_WIDTH: usize = 15;

pub fn render_result(result: &OperationResult) -> String {
    match result {
        OperationResult::Tables { tables } => render_tables(tables),
        OperationResult::Schema(schema) => render_schema(schema),
        OperationResult::Profile(profile) => render_profile(profile),
    }
}

pub fn render_tables(tables: &[TableDescriptor]) -> String {
    let rule = "-".repeat(50);
    let mut out = String::new();
    line(&mut out, "Database Tables:");
    line(&mut out, &rule);
    for table in tables {
        line(&mut out, &format!("Table: {}", table.qualified_name()));
        line(&mut out, &format!("Row Count: {}", table.approx_row_count));
        line(&mut out, &rule);
    }
    out
}

pub fn render_schema(schema: &TableSchema) -> String {
    let rule = "-".repeat(80);
    let mut out = String::new();
    line(&mut out, &format!("Schema for table '{}':", schema.qualified_name()));
    line(&mut out, &rule);
    line(
        &mut out,
        &format!(
            "{:<20} {:<15} {:<10} {:<12} {:<12} {:<10}",
            "Column Name", "Data Type", "Nullable", "Primary Key", "Foreign Key", "Identity"
        ),
    );
    line(&mut out, &rule);
    for column in &schema.columns {
        line(
            &mut out,
            &format!(
                "{:<20} {:<15} {:<10} {:<12} {:<12} {:<10}",
                column.name,
                column.declared_type,
                yes_no(column.nullable),
                yes_no(column.is_primary_key),
                yes_no(column.is_foreign_key),
                yes_no(column.is_identity),
            ),
        );
    }
    line(&mut out, &rule);
    out
}

pub fn render_profile(profile: &TableProfile) -> String {
    let rule = "-".repeat(100);
    let mut out = String::new();
    line(&mut out, &format!("Profile for table '{}':", profile.qualified_name()));
    line(&mut out, &format!("Total Rows: {}", profile.total_row_count));
    line(&mut out, "");
    line(&mut out, "Column Statistics:");
    line(&mut out, &rule);
    line(
        &mut out,
        &format!(
            "{:<20} {:<12} {:<10} {:<10} {:<15} {:<15} {:<15}",
            "Column", "Type", "Null %", "Unique %", "Min", "Max", "Avg"
        ),
    );
    line(&mut out, &rule);
    for column in &profile.columns {
        let avg = column
            .avg_value
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "N/A".to_string());
        line(
            &mut out,
            &format!(
                "{:<20} {:<12} {:>6.2}%  {:>6.2}%  {:<15} {:<15} {:<15}",
                column.name,
                column.declared_type,
                profile.null_percentage(column),
                profile.unique_percentage(column),
                cell(column.min_value.as_ref()),
                cell(column.max_value.as_ref()),
                avg,
            ),
        );
    }
    line(&mut out, &rule);
    out
}

fn line(out: &mut String, text: &str) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", text.trim_end());
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Value truncated to the column width, `N/A` when absent.
fn cell(value: Option<&SqlValue>) -> String {
    match value {
        Some(v) => v.to_string().chars().take(CELL_WIDTH).collect(),
        None => "N/A".to_string(),
    }
}
