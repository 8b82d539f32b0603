//! Bounded connection pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::error::{StoreError, StoreResult};
use super::value::{Row, SqlValue};
use super::{Connection, Connector};
use crate::config::{PoolSettings, SettingsError};
use crate::metadata::TableDescriptor;
use crate::sql::Dialect;

/// Default wait for a free connection (30 seconds).
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Pool sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
    /// Upper bound on simultaneously open connections.
    pub max_open: usize,
    /// Connections kept open after release.
    pub max_idle: usize,
    /// How long `acquire` waits before giving up.
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_open: 1,
            max_idle: 0,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl PoolOptions {
    /// Options from the `[pool]` config section.
    pub fn from_settings(settings: &PoolSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            max_open: settings.max_open_conns as usize,
            max_idle: settings.max_idle_conns as usize,
            acquire_timeout: settings.acquire_timeout()?,
        })
    }
}

struct PoolInner {
    connector: Arc<dyn Connector>,
    options: PoolOptions,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<Box<dyn Connection>>>,
    closed: AtomicBool,
}

impl PoolInner {
    fn take_idle(&self) -> Option<Box<dyn Connection>> {
        self.idle.lock().unwrap_or_else(|e| e.into_inner()).pop()
    }

    /// Park a released connection; hands it back when it should be closed instead.
    fn park(&self, conn: Box<dyn Connection>) -> Option<Box<dyn Connection>> {
        if self.closed.load(Ordering::Acquire) {
            return Some(conn);
        }
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        if idle.len() < self.options.max_idle {
            idle.push(conn);
            None
        } else {
            Some(conn)
        }
    }
}

/// A pool of connections to one database.
///
/// Connections are opened lazily on first acquire. At most
/// `max_open` are handed out at once; further callers wait up to
/// `acquire_timeout` and then fail with [`StoreError::PoolExhausted`].
///
/// Cloning is cheap and shares the same pool.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    pub fn new(connector: Arc<dyn Connector>, options: PoolOptions) -> Self {
        let max_open = options.max_open.max(1);
        Self {
            inner: Arc::new(PoolInner {
                connector,
                permits: Arc::new(Semaphore::new(max_open)),
                options: PoolOptions { max_open, ..options },
                idle: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.inner.connector.dialect()
    }

    /// Target description for logs.
    pub fn describe(&self) -> String {
        self.inner.connector.describe()
    }

    pub fn options(&self) -> &PoolOptions {
        &self.inner.options
    }

    /// Check out a connection, reusing an idle one when available.
    pub async fn acquire(&self) -> StoreResult<PooledConnection> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(StoreError::PoolClosed);
        }

        let timeout = self.inner.options.acquire_timeout;
        let permit = match tokio::time::timeout(timeout, self.inner.permits.clone().acquire_owned())
            .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(StoreError::PoolClosed),
            Err(_) => {
                tracing::warn!(timeout = ?timeout, "timed out waiting for a database connection");
                return Err(StoreError::PoolExhausted(timeout));
            }
        };

        let conn = match self.inner.take_idle() {
            Some(conn) => conn,
            None => {
                tracing::debug!(target = %self.describe(), "opening database connection");
                self.inner.connector.connect().await?
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(&self.inner),
            broken: false,
            permit: Some(permit),
        })
    }

    /// Open (or reuse) one connection and hand it straight back.
    pub async fn check(&self) -> StoreResult<()> {
        let conn = self.acquire().await?;
        drop(conn);
        Ok(())
    }

    /// Close idle connections and refuse further acquires.
    ///
    /// Connections still checked out are closed when they are released.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.permits.close();

        let idle: Vec<_> = {
            let mut guard = self.inner.idle.lock().unwrap_or_else(|e| e.into_inner());
            guard.drain(..).collect()
        };
        for conn in idle {
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "error closing idle connection");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of parked connections.
    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// How many more connections could be checked out right now.
    pub fn available_permits(&self) -> usize {
        self.inner.permits.available_permits()
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("target", &self.describe())
            .field("options", &self.inner.options)
            .field("idle", &self.idle_count())
            .finish()
    }
}

/// A checked-out connection. Returned to the pool on drop.
///
/// The pool slot stays taken until the connection is parked or fully
/// closed, so `max_open` also bounds connections that are mid-close.
pub struct PooledConnection {
    conn: Option<Box<dyn Connection>>,
    pool: Arc<PoolInner>,
    broken: bool,
    permit: Option<OwnedSemaphorePermit>,
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("dialect", &self.dialect())
            .field("broken", &self.broken)
            .finish()
    }
}

impl PooledConnection {
    pub fn dialect(&self) -> Dialect {
        self.pool.connector.dialect()
    }

    /// Discard the connection on release instead of parking it.
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    fn conn_mut(&mut self) -> StoreResult<&mut Box<dyn Connection>> {
        self.conn.as_mut().ok_or(StoreError::PoolClosed)
    }

    fn note(&mut self, err: &StoreError) {
        if err.is_connection_error() {
            self.broken = true;
        }
    }

    pub async fn list_tables(&mut self) -> StoreResult<Vec<TableDescriptor>> {
        let result = self.conn_mut()?.list_tables().await;
        if let Err(e) = &result {
            self.note(e);
        }
        result
    }

    pub async fn query(&mut self, sql: &str, params: &[SqlValue]) -> StoreResult<Vec<Row>> {
        let result = self.conn_mut()?.query(sql, params).await;
        if let Err(e) = &result {
            self.note(e);
        }
        result
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        let conn = if self.broken {
            tracing::debug!("discarding broken connection");
            Some(conn)
        } else {
            self.pool.park(conn)
        };

        if let Some(conn) = conn {
            // Closing is async; without a runtime the connection is simply
            // dropped here, before the permit.
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let permit = self.permit.take();
                handle.spawn(async move {
                    if let Err(e) = conn.close().await {
                        tracing::debug!(error = %e, "error closing connection");
                    }
                    drop(permit);
                });
            }
        }
    }
}
