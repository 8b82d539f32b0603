//! Table metadata: inventory and the schema/profile data model.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      TableInventory                             │
//! │  - list_tables()  → Vec<TableDescriptor>, sorted by name        │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │ ConnectionPool::acquire()
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Connection::list_tables()                      │
//! │       (sys.tables / sqlite_master, per backend)                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The schema and profile types ([`TableSchema`], [`TableProfile`]) are
//! produced by [`crate::profiler::TableProfiler`].

mod inventory;
mod types;

pub use inventory::TableInventory;
pub use types::*;
