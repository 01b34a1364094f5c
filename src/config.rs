use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::app_env;

const DEFAULT_BIND_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_SQLITE_DB_NAME: &str = "carshop";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{} {0} not available, expected one of Postgres, Sqlite, SqliteMemory", app_env::USE_DATABASE)]
    UnknownDatabase(String),
    #[error("{0} must be set when {} is {1}", app_env::USE_DATABASE)]
    Missing(&'static str, &'static str),
    #[error("{key} has an invalid value \"{value}\"")]
    Invalid { key: &'static str, value: String },
}

/// The database engine backing the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEngine {
    Postgres,
    Sqlite,
    SqliteMemory,
}

impl FromStr for DatabaseEngine {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Postgres" => Ok(Self::Postgres),
            "Sqlite" => Ok(Self::Sqlite),
            "SqliteMemory" => Ok(Self::SqliteMemory),
            other => Err(ConfigError::UnknownDatabase(other.to_owned())),
        }
    }
}

/// Settings for the database connection pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub engine: DatabaseEngine,
    pub data_source: String,
    pub max_connections: u32,
}

/// Settings for log output and OpenTelemetry export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub log_level: Option<String>,
    pub span_export_url: Option<String>,
    pub metric_export_url: Option<String>,
}

/// Application configuration, read once at startup and handed to the components that need it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub database: DatabaseConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so it can be exercised without
    /// touching the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let engine = match lookup(app_env::USE_DATABASE) {
            Some(value) => value.parse()?,
            None => DatabaseEngine::Sqlite,
        };

        let data_source = match engine {
            DatabaseEngine::Postgres => lookup(app_env::DB_URL)
                .ok_or(ConfigError::Missing(app_env::DB_URL, "Postgres"))?,
            DatabaseEngine::Sqlite => {
                let directory = lookup(app_env::SQLITE_DATA_DIR).unwrap_or_else(|| ".".into());
                let name = lookup(app_env::SQLITE_DB_NAME)
                    .unwrap_or_else(|| DEFAULT_SQLITE_DB_NAME.into());
                let db_file = PathBuf::from(directory).join(format!("{name}.db"));
                format!("sqlite://{}?mode=rwc", db_file.display())
            }
            DatabaseEngine::SqliteMemory => "sqlite::memory:".to_owned(),
        };

        // Every connection to an in-memory database sees its own empty database
        let max_connections = match engine {
            DatabaseEngine::SqliteMemory => 1,
            _ => parse_or(&lookup, app_env::DB_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS)?,
        };

        let bind_address = parse_or(&lookup, app_env::BIND_ADDRESS, DEFAULT_BIND_ADDRESS)?;

        Ok(AppConfig {
            bind_address,
            database: DatabaseConfig {
                engine,
                data_source,
                max_connections,
            },
            telemetry: TelemetryConfig {
                log_level: lookup(app_env::LOG_LEVEL),
                span_export_url: lookup(app_env::OTEL_SPAN_EXPORT_URL),
                metric_export_url: lookup(app_env::OTEL_METRIC_EXPORT_URL),
            },
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
