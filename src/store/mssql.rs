//! SQL Server backend over TDS.

use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{AuthMethod, Client, ColumnData, Config, FromSql, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::error::{StoreError, StoreResult};
use super::value::{Row, SqlValue};
use super::{Connection, Connector};
use crate::config::{ConnectionConfig, Driver};
use crate::metadata::TableDescriptor;
use crate::sql::Dialect;

/// User tables with their row counts from partition statistics.
const LIST_TABLES_SQL: &str = "SELECT s.name, t.name, CAST(SUM(p.rows) AS BIGINT) \
     FROM sys.tables t \
     JOIN sys.schemas s ON s.schema_id = t.schema_id \
     JOIN sys.partitions p ON p.object_id = t.object_id AND p.index_id IN (0, 1) \
     WHERE t.is_ms_shipped = 0 \
     GROUP BY s.name, t.name \
     ORDER BY t.name, s.name";

/// Opens TDS connections to one SQL Server database.
#[derive(Debug, Clone)]
pub struct MssqlConnector {
    config: Config,
    target: String,
}

impl MssqlConnector {
    /// Build from environment-style configuration.
    ///
    /// Only SQL Server authentication is supported; a trusted connection
    /// without credentials is rejected.
    pub fn from_config(cfg: &ConnectionConfig) -> StoreResult<Self> {
        let (username, password) = match (&cfg.username, &cfg.password) {
            (Some(user), Some(password)) => (user, password),
            _ => {
                return Err(StoreError::ConnectionFailed(
                    "integrated authentication is not supported; set QUERENT_DB_USER and QUERENT_DB_PASSWORD"
                        .to_string(),
                ))
            }
        };

        let port = cfg.port.unwrap_or(Driver::MsSql.default_port());
        let mut config = Config::new();
        config.host(&cfg.host);
        config.port(port);
        config.database(&cfg.database);
        config.authentication(AuthMethod::sql_server(username, password));
        if cfg.trust_server_certificate {
            config.trust_cert();
        }

        Ok(Self {
            config,
            target: format!("mssql:{}:{}/{}", cfg.host, port, cfg.database),
        })
    }

    /// Build from an ADO.NET connection string.
    pub fn from_ado_string(connection_string: &str) -> StoreResult<Self> {
        let config = Config::from_ado_string(connection_string)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        let target = format!("mssql:{}", config.get_addr());
        Ok(Self { config, target })
    }

    async fn open(config: Config) -> tiberius::Result<Client<Compat<TcpStream>>> {
        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;
        Client::connect(config, tcp.compat_write()).await
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    fn dialect(&self) -> Dialect {
        Dialect::TSql
    }

    fn describe(&self) -> String {
        self.target.clone()
    }

    async fn connect(&self) -> StoreResult<Box<dyn Connection>> {
        let client = match Self::open(self.config.clone()).await {
            Ok(client) => client,
            // Azure SQL gateways may redirect once to the actual node.
            Err(tiberius::error::Error::Routing { host, port }) => {
                tracing::debug!(%host, port, "following server redirect");
                let mut config = self.config.clone();
                config.host(&host);
                config.port(port);
                Self::open(config).await?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Box::new(MssqlConnection { client }))
    }
}

/// One open TDS session.
pub struct MssqlConnection {
    client: Client<Compat<TcpStream>>,
}

#[async_trait]
impl Connection for MssqlConnection {
    async fn list_tables(&mut self) -> StoreResult<Vec<TableDescriptor>> {
        let rows = self.query(LIST_TABLES_SQL, &[]).await?;
        rows.iter()
            .map(|row| {
                Ok(TableDescriptor::new(
                    row.str_at(0)?,
                    row.str_at(1)?,
                    row.count_at(2)?,
                ))
            })
            .collect()
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> StoreResult<Vec<Row>> {
        let bound: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let rows = self
            .client
            .query(sql, &bound)
            .await?
            .into_first_result()
            .await?;

        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(decode)
                    .collect::<StoreResult<Vec<_>>>()
                    .map(Row::new)
            })
            .collect()
    }

    async fn close(self: Box<Self>) -> StoreResult<()> {
        Ok(self.client.close().await?)
    }
}

fn decode(data: ColumnData<'static>) -> StoreResult<SqlValue> {
    let value = match &data {
        ColumnData::U8(v) => v.map(|v| SqlValue::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| SqlValue::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| SqlValue::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(SqlValue::Int),
        ColumnData::F32(v) => v.map(|v| SqlValue::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(SqlValue::Float),
        ColumnData::Bit(v) => v.map(SqlValue::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| SqlValue::Text(s.to_string())),
        ColumnData::Guid(v) => v.map(|g| SqlValue::Text(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|b| SqlValue::Bytes(b.to_vec())),
        ColumnData::Numeric(v) => v.map(|n| SqlValue::Float(f64::from(n))),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|x| SqlValue::Text(x.clone().into_owned().into_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(&data)?.map(SqlValue::DateTime)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(&data)?.map(SqlValue::Date),
        ColumnData::Time(_) => NaiveTime::from_sql(&data)?.map(SqlValue::Time),
        ColumnData::DateTimeOffset(_) => DateTime::<FixedOffset>::from_sql(&data)?
            .map(|dt| SqlValue::DateTime(dt.naive_utc())),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            SqlValue::Null => ColumnData::String(None),
            SqlValue::Bool(b) => ColumnData::Bit(Some(*b)),
            SqlValue::Int(v) => ColumnData::I64(Some(*v)),
            SqlValue::Float(v) => ColumnData::F64(Some(*v)),
            SqlValue::Text(s) => ColumnData::String(Some(Cow::Borrowed(s.as_str()))),
            SqlValue::Bytes(b) => ColumnData::Binary(Some(Cow::Borrowed(b.as_slice()))),
            SqlValue::Date(d) => d.to_sql(),
            SqlValue::Time(t) => t.to_sql(),
            SqlValue::DateTime(dt) => dt.to_sql(),
        }
    }
}
