//! SQL dialect definitions.
//!
//! Each supported store speaks a slightly different SQL. The `SqlDialect`
//! trait isolates those differences so the profiler can build its statistics
//! queries once:
//!
//! - Identifier quoting: `[]` (T-SQL), `"` (SQLite)
//! - Bind parameter placeholders: `@P1` (T-SQL), `?1` (SQLite)
//! - Floating-point cast used for averages
//! - Declared type classification (numeric / text / temporal / other)
//! - Catalog query text for column metadata
//!
//! # Usage
//!
//! ```ignore
//! use querent::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::TSql;
//! let quoted = dialect.quote_identifier("order");  // [order]
//! ```
//!
//! Every table and column name spliced into query text must go through
//! `quote_identifier` / `qualified_table`. Values always travel as bind
//! parameters.

pub mod helpers;
mod sqlite;
mod tsql;

pub use sqlite::Sqlite;
pub use tsql::TSql;

use serde::{Deserialize, Serialize};

/// Coarse class of a declared column type, used to pick profiling queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    /// Integer, decimal, float and currency families.
    Numeric,
    /// Character and text families.
    Text,
    /// Dates, times and timestamps.
    Temporal,
    /// Anything else (binary, xml, guid, spatial, ...).
    Other,
}

impl TypeClass {
    /// Whether MIN/MAX are collected for this class.
    pub fn has_extrema(&self) -> bool {
        !matches!(self, TypeClass::Other)
    }

    /// Whether an average is collected for this class.
    pub fn has_average(&self) -> bool {
        matches!(self, TypeClass::Numeric)
    }
}

/// SQL dialect trait - defines how the profiler's SQL is rendered.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (namespace, table, column).
    ///
    /// - T-SQL: `[identifier]`
    /// - SQLite: `"identifier"`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a namespace-qualified table name.
    fn qualified_table(&self, namespace: &str, table: &str) -> String {
        format!(
            "{}.{}",
            self.quote_identifier(namespace),
            self.quote_identifier(table)
        )
    }

    /// Placeholder for the 1-based bind parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Cast an expression to the dialect's double precision type.
    fn float_cast(&self, expr: &str) -> String;

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Namespace assumed when a table name is not qualified.
    fn default_namespace(&self) -> &'static str;

    /// Namespace bound as parameter 2 of `table_columns_sql`.
    ///
    /// `None` matches every namespace.
    fn namespace_param(&self, requested: Option<&str>) -> Option<String> {
        requested.map(str::to_string)
    }

    /// Whether the store can hold tables in `namespace` at all.
    fn known_namespace(&self, _namespace: &str) -> bool {
        true
    }

    /// Query returning the column metadata of one table.
    ///
    /// Parameter 1 is the table name, parameter 2 the namespace (may be NULL
    /// to match any namespace). Result columns, in order: namespace, column
    /// name, declared type, max length, precision, scale, nullable (0/1),
    /// ordinal position, primary key (0/1), foreign key (0/1), identity (0/1),
    /// and the table name as the catalog spells it. Rows are ordered by namespace then ordinal position.
    fn table_columns_sql(&self) -> String;

    /// Classify a declared column type.
    fn classify_type(&self, declared_type: &str) -> TypeClass;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    TSql,
    Sqlite,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::TSql => &TSql,
            Dialect::Sqlite => &Sqlite,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn qualified_table(&self, namespace: &str, table: &str) -> String {
        self.dialect().qualified_table(namespace, table)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn float_cast(&self, expr: &str) -> String {
        self.dialect().float_cast(expr)
    }

    fn default_namespace(&self) -> &'static str {
        self.dialect().default_namespace()
    }

    fn namespace_param(&self, requested: Option<&str>) -> Option<String> {
        self.dialect().namespace_param(requested)
    }

    fn known_namespace(&self, namespace: &str) -> bool {
        self.dialect().known_namespace(namespace)
    }

    fn table_columns_sql(&self) -> String {
        self.dialect().table_columns_sql()
    }

    fn classify_type(&self, declared_type: &str) -> TypeClass {
        self.dialect().classify_type(declared_type)
    }
}
