//! Shared fixtures for integration tests.
//!
//! Each test file pulls this in with `#[path = "../common/mod.rs"] mod common;`
//! and uses only part of it.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use querent::llm::{LlmClient, LlmError, ToolDefinition, ToolSelection};
use querent::metadata::TableDescriptor;
use querent::sql::Dialect;
use querent::store::{
    Connection, ConnectionPool, Connector, PoolOptions, Row, SqlValue, SqliteConnector, StoreError,
    StoreResult,
};
use tempfile::TempDir;

/// Vendors and orders, plus an empty table.
pub const SALES_DB: &str = "
    CREATE TABLE vendors (
        VendorId INTEGER PRIMARY KEY,
        Name     VARCHAR(100) NOT NULL,
        Rating   DECIMAL(3,1),
        JoinedOn DATE,
        Logo     BLOB
    );
    INSERT INTO vendors VALUES (1, 'Acme',     4.5, '2020-01-15', x'00');
    INSERT INTO vendors VALUES (2, 'Globex',   NULL, '2021-06-01', NULL);
    INSERT INTO vendors VALUES (3, 'Initech',  3.0, NULL,          NULL);
    INSERT INTO vendors VALUES (4, 'Umbrella', 4.5, '2019-11-30', x'01');

    CREATE TABLE orders (
        OrderId  INTEGER PRIMARY KEY,
        VendorId INTEGER REFERENCES vendors (VendorId),
        Total    REAL,
        Note     TEXT
    );
    INSERT INTO orders VALUES (10, 1, 99.5, 'rush');
    INSERT INTO orders VALUES (11, 1, 0.5, NULL);
    INSERT INTO orders VALUES (12, 4, 25.0, 'rush');

    CREATE TABLE empty_table (id INTEGER, label TEXT);
";

/// A SQLite file in a temporary directory. The directory lives as long as
/// this value.
pub struct TestDb {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestDb {
    pub fn new(script: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("test.db");
        let conn = rusqlite::Connection::open(&path).expect("create database");
        conn.execute_batch(script).expect("run setup script");
        drop(conn);
        Self { _dir: dir, path }
    }

    pub fn sales() -> Self {
        Self::new(SALES_DB)
    }

    pub fn empty() -> Self {
        Self::new("")
    }

    /// Run extra statements against the file (it is read-only to querent).
    pub fn execute(&self, sql: &str) {
        let conn = rusqlite::Connection::open(&self.path).expect("open database");
        conn.execute_batch(sql).expect("run statements");
    }

    pub fn pool(&self) -> ConnectionPool {
        self.pool_with(PoolOptions::default())
    }

    pub fn pool_with(&self, options: PoolOptions) -> ConnectionPool {
        ConnectionPool::new(Arc::new(SqliteConnector::new(&self.path)), options)
    }

    /// A pool whose queries fail when their text contains `needle`.
    pub fn pool_failing_on(&self, needle: &str) -> ConnectionPool {
        let connector = FailingConnector {
            inner: Arc::new(SqliteConnector::new(&self.path)),
            needle: needle.to_string(),
        };
        ConnectionPool::new(Arc::new(connector), PoolOptions::default())
    }
}

/// Wraps a real connector and rejects selected statements.
pub struct FailingConnector {
    inner: Arc<dyn Connector>,
    needle: String,
}

struct FailingConnection {
    inner: Box<dyn Connection>,
    needle: String,
}

#[async_trait]
impl Connector for FailingConnector {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn describe(&self) -> String {
        format!("failing({})", self.inner.describe())
    }

    async fn connect(&self) -> StoreResult<Box<dyn Connection>> {
        Ok(Box::new(FailingConnection {
            inner: self.inner.connect().await?,
            needle: self.needle.clone(),
        }))
    }
}

#[async_trait]
impl Connection for FailingConnection {
    async fn list_tables(&mut self) -> StoreResult<Vec<TableDescriptor>> {
        self.inner.list_tables().await
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> StoreResult<Vec<Row>> {
        if sql.contains(&self.needle) {
            return Err(StoreError::QueryFailed("statement rejected".to_string()));
        }
        self.inner.query(sql, params).await
    }

    async fn close(self: Box<Self>) -> StoreResult<()> {
        self.inner.close().await
    }
}

pub fn fast_fail_options(max_open: usize, max_idle: usize) -> PoolOptions {
    PoolOptions {
        max_open,
        max_idle,
        acquire_timeout: Duration::from_millis(100),
    }
}

/// What the scripted client saw on one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub tool_names: Vec<String>,
}

/// Language service double that replays a fixed answer and records calls.
pub struct ScriptedLlm {
    reply: Mutex<Option<Result<ToolSelection, LlmError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    count: AtomicUsize,
}

impl ScriptedLlm {
    pub fn replying(selection: ToolSelection) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(Ok(selection))),
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        })
    }

    pub fn calling(tool: &str, arguments_json: &str) -> Arc<Self> {
        Self::replying(ToolSelection::call(tool, arguments_json))
    }

    pub fn failing(error: LlmError) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(Err(error))),
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<ToolSelection, LlmError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });

        let mut reply = self.reply.lock().unwrap();
        match reply.as_ref() {
            Some(Ok(selection)) => Ok(selection.clone()),
            // Errors are not Clone; hand out the scripted one once, then a generic one.
            Some(Err(_)) => match reply.take() {
                Some(Err(e)) => Err(e),
                _ => unreachable!(),
            },
            None => Err(LlmError::MalformedResponse("script exhausted".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &'static str {
        "test"
    }
}
