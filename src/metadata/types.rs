//! Metadata and profile types.
//!
//! These are the structures the profiler and inventory hand back to callers.
//! All of them serialize to JSON for the CLI's `--json` output.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::store::SqlValue;

// ============================================================================
// Inventory
// ============================================================================

/// A user-visible table with an approximate row count.
///
/// Unique by `(namespace, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableDescriptor {
    pub name: String,
    pub namespace: String,
    pub approx_row_count: u64,
}

impl TableDescriptor {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, approx_row_count: u64) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            approx_row_count,
        }
    }

    /// `namespace.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

// ============================================================================
// Schema
// ============================================================================

/// One column as declared in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    pub max_length: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_identity: bool,
    /// 1-based, unique within the table.
    pub ordinal_position: u32,
}

/// Columns of one table in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub table_name: String,
    pub namespace: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.table_name)
    }

    /// Look up a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// Profile
// ============================================================================

/// `count / total` as a percentage in `[0, 100]`; zero when `total` is zero.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Statistics for one column.
///
/// Percentages are not stored; they are derived from the counts and the
/// owning table's row count, see [`TableProfile::null_percentage`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub declared_type: String,
    pub null_count: u64,
    /// Distinct values among the NULL rows. Kept for output parity; it is
    /// at most 1 and carries no real information.
    pub distinct_value_count: u64,
    /// Distinct values across all rows.
    pub unique_value_count: u64,
    pub min_value: Option<SqlValue>,
    pub max_value: Option<SqlValue>,
    /// Only set for numeric columns.
    pub avg_value: Option<f64>,
}

/// Statistics for a whole table, one column entry per schema column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableProfile {
    pub table_name: String,
    pub namespace: String,
    pub total_row_count: u64,
    pub columns: Vec<ColumnProfile>,
}

impl TableProfile {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.table_name)
    }

    pub fn null_percentage(&self, column: &ColumnProfile) -> f64 {
        percentage(column.null_count, self.total_row_count)
    }

    pub fn unique_percentage(&self, column: &ColumnProfile) -> f64 {
        percentage(column.unique_value_count, self.total_row_count)
    }
}

/// Serialized column entry: the stored counts plus derived percentages.
struct ColumnProfileView<'a> {
    column: &'a ColumnProfile,
    total_row_count: u64,
}

impl Serialize for ColumnProfileView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let c = self.column;
        let mut s = serializer.serialize_struct("ColumnProfile", 10)?;
        s.serialize_field("name", &c.name)?;
        s.serialize_field("declared_type", &c.declared_type)?;
        s.serialize_field("null_count", &c.null_count)?;
        s.serialize_field("null_percentage", &percentage(c.null_count, self.total_row_count))?;
        s.serialize_field("distinct_value_count", &c.distinct_value_count)?;
        s.serialize_field("unique_value_count", &c.unique_value_count)?;
        s.serialize_field(
            "unique_percentage",
            &percentage(c.unique_value_count, self.total_row_count),
        )?;
        s.serialize_field("min_value", &c.min_value)?;
        s.serialize_field("max_value", &c.max_value)?;
        s.serialize_field("avg_value", &c.avg_value)?;
        s.end()
    }
}

impl Serialize for TableProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns: Vec<_> = self
            .columns
            .iter()
            .map(|column| ColumnProfileView {
                column,
                total_row_count: self.total_row_count,
            })
            .collect();

        let mut s = serializer.serialize_struct("TableProfile", 4)?;
        s.serialize_field("table_name", &self.table_name)?;
        s.serialize_field("namespace", &self.namespace)?;
        s.serialize_field("total_row_count", &self.total_row_count)?;
        s.serialize_field("columns", &columns)?;
        s.end()
    }
}
