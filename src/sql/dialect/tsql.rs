//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! Differences from ANSI that matter to profiling:
//! - Square bracket identifier quoting (`[name]`)
//! - `@P1`-style bind parameters (TDS RPC)
//! - `FLOAT` as the double precision cast target
//! - `bit` cannot be fed to MIN/MAX, so it is classified as "other"

use super::helpers;
use super::{SqlDialect, TypeClass};

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

const NUMERIC_TYPES: &[&str] = &[
    "bigint",
    "int",
    "smallint",
    "tinyint",
    "decimal",
    "numeric",
    "float",
    "real",
    "money",
    "smallmoney",
];

const TEXT_TYPES: &[&str] = &["char", "varchar", "nchar", "nvarchar", "text", "ntext"];

const TEMPORAL_TYPES: &[&str] = &[
    "date",
    "time",
    "datetime",
    "datetime2",
    "smalldatetime",
    "datetimeoffset",
];

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@P{}", index)
    }

    fn float_cast(&self, expr: &str) -> String {
        format!("CAST({} AS FLOAT)", expr)
    }

    fn default_namespace(&self) -> &'static str {
        "dbo"
    }

    fn table_columns_sql(&self) -> String {
        let table = self.placeholder(1);
        let namespace = self.placeholder(2);
        format!(
            "SELECT \
                c.TABLE_SCHEMA, \
                c.COLUMN_NAME, \
                c.DATA_TYPE, \
                CAST(c.CHARACTER_MAXIMUM_LENGTH AS BIGINT), \
                CAST(c.NUMERIC_PRECISION AS BIGINT), \
                CAST(c.NUMERIC_SCALE AS BIGINT), \
                CASE WHEN c.IS_NULLABLE = 'YES' THEN 1 ELSE 0 END, \
                CAST(c.ORDINAL_POSITION AS BIGINT), \
                CASE WHEN pk.COLUMN_NAME IS NULL THEN 0 ELSE 1 END, \
                CASE WHEN fk.COLUMN_NAME IS NULL THEN 0 ELSE 1 END, \
                CAST(COALESCE(COLUMNPROPERTY(OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)), c.COLUMN_NAME, 'IsIdentity'), 0) AS INT), \
                c.TABLE_NAME \
            FROM INFORMATION_SCHEMA.COLUMNS c \
            LEFT JOIN ({pk}) pk \
                ON pk.TABLE_SCHEMA = c.TABLE_SCHEMA AND pk.TABLE_NAME = c.TABLE_NAME AND pk.COLUMN_NAME = c.COLUMN_NAME \
            LEFT JOIN ({fk}) fk \
                ON fk.TABLE_SCHEMA = c.TABLE_SCHEMA AND fk.TABLE_NAME = c.TABLE_NAME AND fk.COLUMN_NAME = c.COLUMN_NAME \
            WHERE c.TABLE_NAME = {table} AND ({namespace} IS NULL OR c.TABLE_SCHEMA = {namespace}) \
            ORDER BY c.TABLE_SCHEMA, c.ORDINAL_POSITION",
            pk = constraint_columns("PRIMARY KEY"),
            fk = constraint_columns("FOREIGN KEY"),
            table = table,
            namespace = namespace,
        )
    }

    fn classify_type(&self, declared_type: &str) -> TypeClass {
        let base = helpers::base_type_name(declared_type);
        let base = base.as_str();
        if NUMERIC_TYPES.contains(&base) {
            TypeClass::Numeric
        } else if TEXT_TYPES.contains(&base) {
            TypeClass::Text
        } else if TEMPORAL_TYPES.contains(&base) {
            TypeClass::Temporal
        } else {
            TypeClass::Other
        }
    }
}

/// Distinct (schema, table, column) triples taking part in a constraint type.
fn constraint_columns(constraint_type: &str) -> String {
    format!(
        "SELECT DISTINCT ku.TABLE_SCHEMA, ku.TABLE_NAME, ku.COLUMN_NAME \
         FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
         JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE ku \
             ON tc.CONSTRAINT_SCHEMA = ku.CONSTRAINT_SCHEMA AND tc.CONSTRAINT_NAME = ku.CONSTRAINT_NAME \
         WHERE tc.CONSTRAINT_TYPE = '{}'",
        constraint_type
    )
}
