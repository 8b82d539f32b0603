//! TOML-based configuration for Querent.
//!
//! Supports a config file (querent.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.production]
//! driver = "mssql"
//! connection_string = "server=tcp:db01,1433;database=sales;user=reader;password=${SALES_DB_PASSWORD}"
//!
//! [connections.local]
//! driver = "sqlite"
//! connection_string = "./data/sales.db"
//!
//! [llm]
//! api_key = "${OPENAI_API_KEY}"
//! model = "gpt-4o-2024-08-06"
//! temperature = 0.7
//! max_tokens = 150
//!
//! [pool]
//! max_open_conns = 4
//! max_idle_conns = 1
//! acquire_timeout = "30s"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::connection::Driver;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";

/// Default chat-completions endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Invalid duration format: {0}")]
    InvalidDuration(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Named database connections.
    pub connections: HashMap<String, ConnectionSettings>,

    /// Language service configuration.
    pub llm: LlmSettings,

    /// Connection pool configuration.
    pub pool: PoolSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Database driver (mssql, sqlite).
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    ///
    /// ADO.NET style for SQL Server, a file path for SQLite.
    pub connection_string: String,
}

impl ConnectionSettings {
    /// Get the driver type.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        Driver::from_str(&self.driver)
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }
}

/// Language service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmSettings {
    /// API key (supports ${ENV_VAR} expansion).
    pub api_key: Option<String>,

    /// Model name.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Completion token cap.
    pub max_tokens: u32,

    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,

    /// Optional HTTP request timeout (e.g., "30s"). Unset means no timeout.
    pub request_timeout: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 150,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl LlmSettings {
    /// Override fields from `OPENAI_API_KEY`, `MODEL_NAME`, `TEMPERATURE`,
    /// `MAX_TOKENS` and `OPENAI_BASE_URL` when they are set.
    pub fn apply_env(&mut self) -> Result<(), SettingsError> {
        let _ = dotenvy::dotenv();

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(model) = env::var("MODEL_NAME") {
            self.model = model;
        }
        if let Ok(t) = env::var("TEMPERATURE") {
            self.temperature = t
                .parse()
                .map_err(|_| SettingsError::InvalidConfig(format!("invalid TEMPERATURE: {}", t)))?;
        }
        if let Ok(m) = env::var("MAX_TOKENS") {
            self.max_tokens = m
                .parse()
                .map_err(|_| SettingsError::InvalidConfig(format!("invalid MAX_TOKENS: {}", m)))?;
        }
        if let Ok(url) = env::var("OPENAI_BASE_URL") {
            self.base_url = url;
        }
        Ok(())
    }

    /// The API key with environment variables expanded.
    pub fn resolved_api_key(&self) -> Result<String, SettingsError> {
        match &self.api_key {
            Some(key) => expand_env_vars(key),
            None => Err(SettingsError::MissingEnvVar("OPENAI_API_KEY".to_string())),
        }
    }

    /// Parsed request timeout, if one is configured.
    pub fn request_timeout(&self) -> Result<Option<Duration>, SettingsError> {
        self.request_timeout.as_deref().map(parse_duration).transpose()
    }
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of open connections.
    pub max_open_conns: u32,

    /// Maximum number of idle connections kept after release.
    pub max_idle_conns: u32,

    /// How long `acquire` waits for a free connection (e.g., "30s", "500ms").
    pub acquire_timeout: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_open_conns: 1,
            max_idle_conns: 0,
            acquire_timeout: "30s".to_string(),
        }
    }
}

impl PoolSettings {
    /// Parsed acquire timeout.
    pub fn acquire_timeout(&self) -> Result<Duration, SettingsError> {
        parse_duration(&self.acquire_timeout)
    }

    /// Reject pools that could never hand out a connection.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_open_conns == 0 {
            return Err(SettingsError::InvalidConfig(
                "pool.max_open_conns must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `QUERENT_CONFIG`
    /// 2. `./querent.toml`
    /// 3. `~/.config/querent/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("QUERENT_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("querent.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("querent").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection ("default" if it exists, else the first by name).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Parse a duration such as `500ms`, `30s`, `5m` or `1h`.
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, SettingsError> {
    let s = s.trim();
    let invalid = || SettingsError::InvalidDuration(s.to_string());

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: u64 = number.parse().map_err(|_| invalid())?;

    match unit.trim() {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 3600)),
        _ => Err(invalid()),
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
