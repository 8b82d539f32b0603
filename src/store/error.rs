//! Store-specific error types.

use std::time::Duration;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the database.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not open (or lost) the connection.
    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    /// The statement was rejected or failed while running.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// No pooled connection became free in time.
    #[error("no database connection available within {0:?}")]
    PoolExhausted(Duration),

    /// The pool was shut down.
    #[error("connection pool is closed")]
    PoolClosed,

    /// A result had an unexpected shape or value type.
    #[error("unexpected result: {0}")]
    Decode(String),
}

impl StoreError {
    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Check if this error means the connection itself is unusable.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::PoolExhausted(_) | Self::PoolClosed
        )
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::QueryFailed(err.to_string())
    }
}

impl From<tiberius::error::Error> for StoreError {
    fn from(err: tiberius::error::Error) -> Self {
        use tiberius::error::Error as TdsError;
        match err {
            TdsError::Io { .. } | TdsError::Tls(_) | TdsError::Routing { .. } => {
                Self::ConnectionFailed(err.to_string())
            }
            other => Self::QueryFailed(other.to_string()),
        }
    }
}
