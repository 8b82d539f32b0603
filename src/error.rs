//! Error taxonomy for the question pipeline.
//!
//! Each component reports a specific kind of failure. The orchestrator
//! turns every one of them into a [`Diagnostic`] instead of letting it
//! reach a caller that expects a value.

use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;
use crate::store::StoreError;

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The store could not be reached.
    Connection,
    /// The language service was unreachable or answered with garbage.
    Resolution,
    /// The named table does not exist.
    NotFound,
    /// A statistics query failed.
    Profiling,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Resolution => "resolution",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Profiling => "profiling",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the inventory, resolver and profiler.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("store unavailable: {0}")]
    Connection(#[from] StoreError),

    #[error("question could not be resolved: {0}")]
    Resolution(#[from] LlmError),

    #[error("table not found: {0}")]
    NotFound(String),

    #[error("profiling {table} failed at {}: {source}", .column.as_deref().unwrap_or("row count"))]
    Profiling {
        table: String,
        /// `None` when the row count query failed.
        column: Option<String>,
        #[source]
        source: StoreError,
    },
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Connection(_) => ErrorKind::Connection,
            AgentError::Resolution(_) => ErrorKind::Resolution,
            AgentError::NotFound(_) => ErrorKind::NotFound,
            AgentError::Profiling { .. } => ErrorKind::Profiling,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// What went wrong, as reported to the caller of `handle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
