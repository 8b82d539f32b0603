//! Table name resolution and column metadata loading.

use crate::error::{AgentError, AgentResult};
use crate::metadata::{ColumnDescriptor, TableSchema};
use crate::sql::dialect::helpers::{parse_type_modifiers, unquote_identifier};
use crate::sql::{Dialect, SqlDialect, TypeClass};
use crate::store::{PooledConnection, Row, SqlValue, StoreError, StoreResult};

/// A table reference as typed by a user or returned by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub namespace: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Split `namespace.name` (or a bare `name`) at the last dot that is not
    /// inside `[]`, `""` or ``` `` ``` quoting, and unquote both parts.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let mut closing: Option<char> = None;
        let mut split_at = None;

        for (idx, ch) in input.char_indices() {
            match closing {
                Some(close) if ch == close => closing = None,
                Some(_) => {}
                None => match ch {
                    '[' => closing = Some(']'),
                    '"' => closing = Some('"'),
                    '`' => closing = Some('`'),
                    '.' => split_at = Some(idx),
                    _ => {}
                },
            }
        }

        match split_at {
            Some(idx) => Self {
                namespace: Some(unquote_identifier(&input[..idx])),
                name: unquote_identifier(&input[idx + 1..]),
            },
            None => Self {
                namespace: None,
                name: unquote_identifier(input),
            },
        }
    }
}

/// Load the schema of `table_name` over an open connection.
///
/// A bare name matches every namespace; the alphabetically first namespace
/// holding the table wins.
pub(crate) async fn load_schema(
    conn: &mut PooledConnection,
    dialect: Dialect,
    table_name: &str,
) -> AgentResult<TableSchema> {
    let table = TableRef::parse(table_name);
    let not_found = || AgentError::NotFound(table_name.trim().to_string());

    if table.name.is_empty() {
        return Err(not_found());
    }
    if let Some(ns) = &table.namespace {
        if ns.is_empty() || !dialect.known_namespace(ns) {
            return Err(not_found());
        }
    }

    let params = [
        SqlValue::Text(table.name.clone()),
        SqlValue::from(dialect.namespace_param(table.namespace.as_deref())),
    ];
    let sql = dialect.table_columns_sql();
    tracing::debug!(sql = %sql, table = %table.name, "loading column metadata");
    let rows = conn.query(&sql, &params).await?;

    let Some(first) = rows.first() else {
        return Err(not_found());
    };
    let namespace = first.str_at(0)?.to_string();
    // The catalog's spelling, not the caller's.
    let table_name = first.str_at(11)?.to_string();

    let mut columns = rows
        .iter()
        .filter(|row| row.str_at(0).map_or(false, |ns| ns == namespace))
        .map(|row| column_from_row(dialect, row))
        .collect::<StoreResult<Vec<_>>>()?;
    columns.sort_by_key(|c| c.ordinal_position);

    if columns.is_empty() {
        return Err(not_found());
    }

    Ok(TableSchema {
        table_name,
        namespace,
        columns,
    })
}

fn column_from_row(dialect: Dialect, row: &Row) -> StoreResult<ColumnDescriptor> {
    let declared_type = row.str_at(2)?.to_string();
    let mut max_length = row.opt_i64_at(3)?;
    let mut precision = row.opt_i64_at(4)?;
    let mut scale = row.opt_i64_at(5)?;

    // SQLite only reports the declared text, e.g. VARCHAR(50) or DECIMAL(10,2).
    if max_length.is_none() && precision.is_none() {
        if let Some(modifiers) = parse_type_modifiers(&declared_type) {
            match dialect.classify_type(&declared_type) {
                TypeClass::Text | TypeClass::Other => max_length = modifiers.first,
                TypeClass::Numeric | TypeClass::Temporal => {
                    precision = modifiers.first;
                    scale = scale.or(modifiers.second);
                }
            }
        }
    }

    let ordinal = row.i64_at(7)?;
    let ordinal_position = u32::try_from(ordinal)
        .ok()
        .filter(|o| *o >= 1)
        .ok_or_else(|| StoreError::decode(format!("invalid ordinal position {}", ordinal)))?;

    Ok(ColumnDescriptor {
        name: row.str_at(1)?.to_string(),
        declared_type,
        max_length,
        precision,
        scale,
        nullable: row.flag_at(6)?,
        is_primary_key: row.flag_at(8)?,
        is_foreign_key: row.flag_at(9)?,
        is_identity: row.flag_at(10)?,
        ordinal_position,
    })
}
