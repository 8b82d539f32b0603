//! Connection pool behaviour over a real SQLite store.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{fast_fail_options, TestDb};
use querent::sql::Dialect;
use querent::store::{ConnectionPool, PoolOptions, SqlValue, SqliteConnector, StoreError};

#[tokio::test]
async fn test_pool_reports_dialect_and_target() {
    let db = TestDb::sales();
    let pool = db.pool();
    assert_eq!(pool.dialect(), Dialect::Sqlite);
    assert_eq!(pool.describe(), format!("sqlite:{}", db.path.display()));
}

#[tokio::test]
async fn test_query_binds_parameters() {
    let db = TestDb::sales();
    let pool = db.pool();
    let mut conn = pool.acquire().await.unwrap();

    let rows = conn
        .query(
            "SELECT Name FROM vendors WHERE Rating = ?1 ORDER BY Name",
            &[SqlValue::Float(4.5)],
        )
        .await
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.str_at(0).unwrap()).collect();
    assert_eq!(names, vec!["Acme", "Umbrella"]);
}

#[tokio::test]
async fn test_connections_are_read_only() {
    let db = TestDb::sales();
    let pool = db.pool();
    let mut conn = pool.acquire().await.unwrap();

    let err = conn.query("DELETE FROM vendors", &[]).await.unwrap_err();
    assert!(matches!(err, StoreError::QueryFailed(_)));
    drop(conn);

    let mut conn = pool.acquire().await.unwrap();
    let rows = conn.query("SELECT COUNT(*) FROM vendors", &[]).await.unwrap();
    assert_eq!(rows[0].count_at(0).unwrap(), 4);
}

#[tokio::test]
async fn test_acquire_waits_for_release() {
    let db = TestDb::sales();
    let pool = db.pool_with(fast_fail_options(1, 1));

    let held = pool.acquire().await.unwrap();
    let err = pool.acquire().await.unwrap_err();
    assert!(matches!(err, StoreError::PoolExhausted(d) if d == Duration::from_millis(100)));

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(held);

    waiter.await.unwrap().unwrap();
    assert_eq!(pool.available_permits(), 1);
}

#[tokio::test]
async fn test_idle_connection_is_reused() {
    let db = TestDb::sales();
    let pool = db.pool_with(fast_fail_options(2, 1));

    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();
    assert_eq!(pool.available_permits(), 0);
    drop(a);
    drop(b);

    // Only one is kept.
    assert_eq!(pool.idle_count(), 1);
    let _c = pool.acquire().await.unwrap();
    assert_eq!(pool.idle_count(), 0);
}

#[tokio::test]
async fn test_close_rejects_new_acquires() {
    let db = TestDb::sales();
    let pool = db.pool_with(fast_fail_options(1, 1));
    drop(pool.acquire().await.unwrap());
    assert_eq!(pool.idle_count(), 1);

    pool.close().await;
    assert!(pool.is_closed());
    assert_eq!(pool.idle_count(), 0);
    assert!(matches!(pool.acquire().await, Err(StoreError::PoolClosed)));
}

#[tokio::test]
async fn test_check_opens_and_releases_a_connection() {
    let db = TestDb::sales();
    let pool = db.pool_with(fast_fail_options(1, 1));

    pool.check().await.unwrap();
    pool.check().await.unwrap();
    assert_eq!(pool.idle_count(), 1);
    assert_eq!(pool.available_permits(), 1);

    let dir = tempfile::TempDir::new().unwrap();
    let missing = ConnectionPool::new(
        Arc::new(SqliteConnector::new(dir.path().join("nope.db"))),
        PoolOptions::default(),
    );
    let err = missing.check().await.unwrap_err();
    assert!(matches!(err, StoreError::ConnectionFailed(_)));
}
