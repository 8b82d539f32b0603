//! SQLite backend (read-only).

use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, OpenFlags, ToSql};

use super::error::{StoreError, StoreResult};
use super::value::{Row, SqlValue};
use super::{Connection, Connector};
use crate::metadata::TableDescriptor;
use crate::sql::{Dialect, SqlDialect};

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY name";

/// Opens read-only connections to a SQLite file (or `file:` URI).
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
}

impl SqliteConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    async fn connect(&self) -> StoreResult<Box<dyn Connection>> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = rusqlite::Connection::open_with_flags(&self.path, flags).map_err(|e| {
            StoreError::ConnectionFailed(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Box::new(SqliteConnection { conn }))
    }
}

/// One open SQLite handle.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

#[async_trait]
impl Connection for SqliteConnection {
    async fn list_tables(&mut self) -> StoreResult<Vec<TableDescriptor>> {
        list_tables(&self.conn)
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> StoreResult<Vec<Row>> {
        run_query(&self.conn, sql, params)
    }

    async fn close(self: Box<Self>) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| StoreError::from(e))
    }
}

fn list_tables(conn: &rusqlite::Connection) -> StoreResult<Vec<TableDescriptor>> {
    let names: Vec<String> = {
        let mut stmt = conn.prepare_cached(LIST_TABLES_SQL)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let names = rows.collect::<Result<Vec<_>, _>>()?;
        names
    };

    let dialect = Dialect::Sqlite;
    let namespace = dialect.default_namespace();
    names
        .into_iter()
        .map(|name| {
            let sql = format!(
                "SELECT COUNT(*) FROM {}",
                dialect.qualified_table(namespace, &name)
            );
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(TableDescriptor::new(namespace, name, count.max(0) as u64))
        })
        .collect()
}

fn run_query(conn: &rusqlite::Connection, sql: &str, params: &[SqlValue]) -> StoreResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|i| row.get_ref(i).map(decode))
            .collect::<Result<Vec<_>, _>>()?;
        out.push(Row::new(values));
    }
    Ok(out)
}

fn decode(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Int(i),
        ValueRef::Real(f) => SqlValue::Float(f),
        ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => SqlValue::Bytes(bytes.to_vec()),
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::from(rusqlite::types::Null),
            SqlValue::Bool(b) => ToSqlOutput::from(*b),
            SqlValue::Int(v) => ToSqlOutput::from(*v),
            SqlValue::Float(v) => ToSqlOutput::from(*v),
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
            SqlValue::Bytes(b) => ToSqlOutput::from(b.as_slice()),
            // Stored as ISO-8601 text, SQLite's own date convention.
            SqlValue::Date(d) => ToSqlOutput::from(d.format("%Y-%m-%d").to_string()),
            SqlValue::Time(t) => ToSqlOutput::from(t.format("%H:%M:%S%.f").to_string()),
            SqlValue::DateTime(dt) => {
                ToSqlOutput::from(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
        })
    }
}
