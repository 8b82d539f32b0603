//! Database access module.
//!
//! The rest of the crate treats the database as an opaque store that can
//! list its tables and run a parameterised query. Everything wire-specific
//! lives behind the [`Connector`] / [`Connection`] traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      ConnectionPool                             │
//! │  - caps open connections (semaphore)                            │
//! │  - lazy connect on first acquire                                │
//! │  - PooledConnection releases on drop                            │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │ Connector::connect()
//!               ┌───────────┴────────────┐
//!               ▼                        ▼
//! ┌──────────────────────────┐ ┌──────────────────────────┐
//! │  MssqlConnector          │ │  SqliteConnector         │
//! │  (TDS via tiberius)      │ │  (rusqlite, read-only)   │
//! └──────────────────────────┘ └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use querent::store::{ConnectionPool, SqliteConnector};
//!
//! let pool = ConnectionPool::new(Arc::new(SqliteConnector::new("./app.db")), Default::default());
//! let mut conn = pool.acquire().await?;
//! let tables = conn.list_tables().await?;
//! // connection goes back to the pool here
//! ```

mod error;
mod mssql;
mod pool;
mod sqlite;
mod value;

pub use error::{StoreError, StoreResult};
pub use mssql::MssqlConnector;
pub use pool::{ConnectionPool, PoolOptions, PooledConnection};
pub use sqlite::SqliteConnector;
pub use value::{Row, SqlValue};

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ConnectionConfig, ConnectionSettings, Driver, SettingsError};
use crate::metadata::TableDescriptor;
use crate::sql::Dialect;

/// Opens connections to one database.
#[async_trait]
pub trait Connector: Send + Sync {
    /// SQL dialect spoken by this store.
    fn dialect(&self) -> Dialect;

    /// Human-readable target, safe to log (no secrets).
    fn describe(&self) -> String;

    /// Open a new connection.
    async fn connect(&self) -> StoreResult<Box<dyn Connection>>;
}

/// An open connection.
#[async_trait]
pub trait Connection: Send {
    /// All user-visible tables with namespace and an approximate row count.
    async fn list_tables(&mut self) -> StoreResult<Vec<TableDescriptor>>;

    /// Run a read query with positional bind parameters.
    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> StoreResult<Vec<Row>>;

    /// Close the connection.
    async fn close(self: Box<Self>) -> StoreResult<()>;
}

/// Build a connector from environment-style connection configuration.
pub fn connector_from_config(config: &ConnectionConfig) -> StoreResult<Arc<dyn Connector>> {
    match config.driver {
        Driver::MsSql => Ok(Arc::new(MssqlConnector::from_config(config)?)),
        Driver::Sqlite => Ok(Arc::new(SqliteConnector::new(&config.host))),
    }
}

/// Build a connector from a named `[connections.*]` entry.
pub fn connector_from_settings(
    settings: &ConnectionSettings,
) -> Result<Arc<dyn Connector>, SettingsError> {
    let connection_string = settings.resolved_connection_string()?;
    match settings.driver_type()? {
        Driver::MsSql => {
            let connector = MssqlConnector::from_ado_string(&connection_string)
                .map_err(|e| SettingsError::InvalidConfig(e.to_string()))?;
            Ok(Arc::new(connector))
        }
        Driver::Sqlite => Ok(Arc::new(SqliteConnector::new(connection_string))),
    }
}
