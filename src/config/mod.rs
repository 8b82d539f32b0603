//! Configuration module for Querent.
//!
//! Handles connection configuration, environment variables, and settings.

mod connection;
mod settings;

pub use connection::{ConnectionConfig, ConnectionError, Driver};
pub use settings::{
    expand_env_vars, parse_duration, ConnectionSettings, LlmSettings, PoolSettings, Settings,
    SettingsError, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
