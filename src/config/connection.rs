//! Database connection configuration.
//!
//! Supports configuration via environment variables (a `.env` file in the
//! working directory is loaded first):
//! - `QUERENT_DB_DRIVER`: Database driver (mssql, sqlite); defaults to mssql
//! - `QUERENT_DB_HOST` / `DB_SERVER`: Server hostname, or file path for SQLite
//! - `QUERENT_DB_NAME` / `DB_NAME`: Database name
//! - `QUERENT_DB_PORT`: Port (optional, uses driver default)
//! - `QUERENT_DB_USER`, `QUERENT_DB_PASSWORD`: SQL authentication
//! - `DB_TRUSTED_CONNECTION`: `yes`/`no`

use std::env;

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported driver: {0}. Supported: mssql, sqlite")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Microsoft SQL Server
    MsSql,
    /// SQLite database file
    Sqlite,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConnectionError> {
        match s.to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => Ok(Driver::MsSql),
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(ConnectionError::UnsupportedDriver(other.to_string())),
        }
    }

    /// Get the driver name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::MsSql => "mssql",
            Driver::Sqlite => "sqlite",
        }
    }

    /// Get the default port for this driver.
    pub fn default_port(&self) -> u16 {
        match self {
            Driver::MsSql => 1433,
            Driver::Sqlite => 0, // Not applicable
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database driver.
    pub driver: Driver,
    /// Server hostname (file path for SQLite).
    pub host: String,
    /// Database name.
    pub database: String,
    /// Port (optional).
    pub port: Option<u16>,
    /// Use Windows trusted connection (SQL Server).
    pub trusted_connection: bool,
    /// Username (if not using trusted connection).
    pub username: Option<String>,
    /// Password (if not using trusted connection).
    pub password: Option<String>,
    /// Accept the server certificate without validation (SQL Server).
    pub trust_server_certificate: bool,
}

impl ConnectionConfig {
    /// Create a new connection config for SQL Server with trusted connection.
    pub fn mssql_trusted(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            driver: Driver::MsSql,
            host: host.into(),
            database: database.into(),
            port: None,
            trusted_connection: true,
            username: None,
            password: None,
            trust_server_certificate: true,
        }
    }

    /// Create a new connection config for SQL Server with SQL authentication.
    pub fn mssql_login(
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            trusted_connection: false,
            ..Self::mssql_trusted(host, database)
        }
    }

    /// Create a new connection config for a SQLite file.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: Driver::Sqlite,
            host: path.into(), // For SQLite, "host" is the file path
            database: String::new(),
            port: None,
            trusted_connection: false,
            username: None,
            password: None,
            trust_server_certificate: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables from a `.env` file are loaded first; values already present
    /// in the process environment win. All variables are optional, the
    /// defaults target a local SQL Server `master` database.
    pub fn from_env() -> Result<Self, ConnectionError> {
        let _ = dotenvy::dotenv();

        let driver = match env::var("QUERENT_DB_DRIVER") {
            Ok(s) => Driver::from_str(&s)?,
            Err(_) => Driver::MsSql,
        };

        let host = first_var(&["QUERENT_DB_HOST", "DB_SERVER"]);

        match driver {
            Driver::Sqlite => {
                let path = host.ok_or_else(|| {
                    ConnectionError::MissingEnvVar("QUERENT_DB_HOST".to_string())
                })?;
                Ok(Self::sqlite(path))
            }
            Driver::MsSql => {
                let host = host.unwrap_or_else(|| "localhost".to_string());
                let database =
                    first_var(&["QUERENT_DB_NAME", "DB_NAME"]).unwrap_or_else(|| "master".into());

                let port = match env::var("QUERENT_DB_PORT") {
                    Ok(p) => Some(p.parse().map_err(|_| {
                        ConnectionError::InvalidConfig(format!("invalid port: {}", p))
                    })?),
                    Err(_) => None,
                };

                let username = env::var("QUERENT_DB_USER").ok();
                let password = env::var("QUERENT_DB_PASSWORD").ok();

                // Trusted connection unless credentials are given or it is switched off
                let trusted_flag = env::var("DB_TRUSTED_CONNECTION")
                    .map(|v| parse_yes_no(&v))
                    .unwrap_or(true);
                let trusted_connection = trusted_flag && username.is_none();

                if !trusted_connection && (username.is_none() || password.is_none()) {
                    return Err(ConnectionError::InvalidConfig(
                        "QUERENT_DB_USER and QUERENT_DB_PASSWORD are required without a trusted connection"
                            .to_string(),
                    ));
                }

                let trust_server_certificate = env::var("QUERENT_DB_TRUST_CERT")
                    .map(|v| parse_yes_no(&v))
                    .unwrap_or(true);

                Ok(Self {
                    driver,
                    host,
                    database,
                    port,
                    trusted_connection,
                    username,
                    password,
                    trust_server_certificate,
                })
            }
        }
    }

    /// Build an ADO-style connection string, with the password masked.
    ///
    /// Used for logs and diagnostics only.
    pub fn display_string(&self) -> String {
        match self.driver {
            Driver::Sqlite => format!("sqlite:{}", self.host),
            Driver::MsSql => {
                let port = self.port.unwrap_or(self.driver.default_port());
                let mut parts = vec![
                    format!("server=tcp:{},{}", self.host, port),
                    format!("database={}", self.database),
                ];
                if self.trusted_connection {
                    parts.push("IntegratedSecurity=true".to_string());
                } else if let Some(user) = &self.username {
                    parts.push(format!("user={}", user));
                    parts.push("password=***".to_string());
                }
                if self.trust_server_certificate {
                    parts.push("TrustServerCertificate=true".to_string());
                }
                parts.join(";")
            }
        }
    }

    /// Get the driver name.
    pub fn driver_name(&self) -> &'static str {
        self.driver.as_str()
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.is_empty()))
}

fn parse_yes_no(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "true" | "1" | "on"
    )
}
