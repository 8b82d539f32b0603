//! Statistics query builder.
//!
//! Builds the read-only queries the profiler issues against one table. Table
//! and column names are always quoted through the dialect, so a name taken
//! from the catalog can never terminate the identifier early.

use super::dialect::{Dialect, SqlDialect, TypeClass};

/// Query builder bound to one namespace-qualified table.
#[derive(Debug, Clone)]
pub struct StatsQuery {
    dialect: Dialect,
    table: String,
}

impl StatsQuery {
    /// Create a builder for `namespace.table`.
    pub fn new(dialect: Dialect, namespace: &str, table: &str) -> Self {
        Self {
            dialect,
            table: dialect.qualified_table(namespace, table),
        }
    }

    /// The quoted, qualified table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// `SELECT COUNT(*)` over the whole table.
    pub fn row_count(&self) -> String {
        format!("SELECT COUNT(*) FROM {}", self.table)
    }

    /// Null count plus the distinct count restricted to null rows.
    ///
    /// Result: `(null_count, distinct_count)`.
    pub fn null_stats(&self, column: &str) -> String {
        let col = self.dialect.quote_identifier(column);
        format!(
            "SELECT COUNT(*), COUNT(DISTINCT {col}) FROM {table} WHERE {col} IS NULL",
            col = col,
            table = self.table
        )
    }

    /// Distinct count over all rows.
    pub fn distinct_count(&self, column: &str) -> String {
        let col = self.dialect.quote_identifier(column);
        format!("SELECT COUNT(DISTINCT {}) FROM {}", col, self.table)
    }

    /// MIN/MAX, plus AVG over a float cast for numeric columns.
    ///
    /// Result: `(min, max)` or `(min, max, avg)`. Returns `None` for
    /// [`TypeClass::Other`], which gets no extrema query at all.
    pub fn extrema(&self, column: &str, class: TypeClass) -> Option<String> {
        if !class.has_extrema() {
            return None;
        }

        let col = self.dialect.quote_identifier(column);
        let sql = if class.has_average() {
            format!(
                "SELECT MIN({col}), MAX({col}), AVG({avg}) FROM {table}",
                col = col,
                avg = self.dialect.float_cast(&col),
                table = self.table
            )
        } else {
            format!(
                "SELECT MIN({col}), MAX({col}) FROM {table}",
                col = col,
                table = self.table
            )
        };
        Some(sql)
    }
}
