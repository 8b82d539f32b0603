//! Table inventory.

use crate::error::AgentResult;
use crate::store::ConnectionPool;

use super::types::TableDescriptor;

/// Lists the tables a question can be about.
#[derive(Debug, Clone)]
pub struct TableInventory {
    pool: ConnectionPool,
}

impl TableInventory {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// All user-visible tables, sorted by name then namespace.
    ///
    /// Recomputed on every call. Any store failure is reported as a
    /// connection error; the connection is released on every path.
    pub async fn list_tables(&self) -> AgentResult<Vec<TableDescriptor>> {
        let mut conn = self.pool.acquire().await?;
        let mut tables = conn.list_tables().await?;
        drop(conn);

        tables.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.namespace.cmp(&b.namespace)));
        tracing::debug!(count = tables.len(), "listed tables");
        Ok(tables)
    }
}
