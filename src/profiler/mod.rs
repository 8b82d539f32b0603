//! Table schema lookup and column profiling.
//!
//! A profile is all-or-nothing: if any statistics query fails the whole
//! call fails with [`AgentError::Profiling`] naming the column, and no
//! partial profile is returned.
//!
//! Queries issued by [`TableProfiler::profile`], in order, over a single
//! pooled connection:
//!
//! 1. column metadata (the schema)
//! 2. `COUNT(*)` on the table
//! 3. per column, in ordinal order: null stats, distinct count, and
//!    MIN/MAX (plus AVG for numeric columns) unless the type is "other"

mod schema;

pub use schema::TableRef;

use crate::error::{AgentError, AgentResult};
use crate::metadata::{ColumnDescriptor, ColumnProfile, TableProfile, TableSchema};
use crate::sql::{SqlDialect, StatsQuery, TypeClass};
use crate::store::{ConnectionPool, PooledConnection, Row, StoreError, StoreResult};

/// Computes schemas and profiles for single tables.
#[derive(Debug, Clone)]
pub struct TableProfiler {
    pool: ConnectionPool,
}

impl TableProfiler {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Column metadata for `table_name` (`namespace.name` or `name`).
    ///
    /// Fails with [`AgentError::NotFound`] if no such table exists.
    pub async fn get_schema(&self, table_name: &str) -> AgentResult<TableSchema> {
        let mut conn = self.pool.acquire().await?;
        schema::load_schema(&mut conn, self.pool.dialect(), table_name).await
    }

    /// Statistics for every column of `table_name`, in schema order.
    pub async fn profile(&self, table_name: &str) -> AgentResult<TableProfile> {
        let dialect = self.pool.dialect();
        let mut conn = self.pool.acquire().await?;
        let schema = schema::load_schema(&mut conn, dialect, table_name).await?;

        let qualified = schema.qualified_name();
        let query = StatsQuery::new(dialect, &schema.namespace, &schema.table_name);

        let total_row_count = scalar_count(&mut conn, &query.row_count())
            .await
            .map_err(|source| AgentError::Profiling {
                table: qualified.clone(),
                column: None,
                source,
            })?;

        let mut columns = Vec::with_capacity(schema.columns.len());
        for column in &schema.columns {
            let class = dialect.classify_type(&column.declared_type);
            let profile = profile_column(&mut conn, &query, column, class)
                .await
                .map_err(|source| AgentError::Profiling {
                    table: qualified.clone(),
                    column: Some(column.name.clone()),
                    source,
                })?;
            columns.push(profile);
        }

        tracing::info!(
            table = %qualified,
            rows = total_row_count,
            columns = columns.len(),
            "profiled table"
        );

        Ok(TableProfile {
            table_name: schema.table_name,
            namespace: schema.namespace,
            total_row_count,
            columns,
        })
    }
}

async fn profile_column(
    conn: &mut PooledConnection,
    query: &StatsQuery,
    column: &ColumnDescriptor,
    class: TypeClass,
) -> StoreResult<ColumnProfile> {
    let null_stats = single_row(conn, &query.null_stats(&column.name)).await?;
    let null_count = null_stats.count_at(0)?;
    let distinct_value_count = null_stats.count_at(1)?;

    let unique_value_count = scalar_count(conn, &query.distinct_count(&column.name)).await?;

    let (mut min_value, mut max_value, mut avg_value) = (None, None, None);
    if let Some(sql) = query.extrema(&column.name, class) {
        let mut row = single_row(conn, &sql).await?;
        min_value = row.take_value(0)?;
        max_value = row.take_value(1)?;
        if class.has_average() {
            avg_value = row.get(2).and_then(|v| v.as_f64());
        }
    }

    Ok(ColumnProfile {
        name: column.name.clone(),
        declared_type: column.declared_type.clone(),
        null_count,
        distinct_value_count,
        unique_value_count,
        min_value,
        max_value,
        avg_value,
    })
}

async fn single_row(conn: &mut PooledConnection, sql: &str) -> StoreResult<Row> {
    tracing::debug!(sql = %sql, "profiling query");
    conn.query(sql, &[])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::decode("aggregate query returned no rows"))
}

async fn scalar_count(conn: &mut PooledConnection, sql: &str) -> StoreResult<u64> {
    single_row(conn, sql).await?.count_at(0)
}
