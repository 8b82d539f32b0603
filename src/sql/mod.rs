//! SQL generation module.
//!
//! - [`dialect`] - per-store quoting, placeholders, casts and catalog queries
//! - [`stats`] - the read-only statistics queries issued by the profiler

pub mod dialect;
pub mod stats;

pub use dialect::{Dialect, SqlDialect, TypeClass};
pub use stats::StatsQuery;
