/// Selects the backing database engine. One of "Postgres", "Sqlite", or "SqliteMemory"
pub const USE_DATABASE: &str = "USE_DATABASE";
/// URL for accessing the PostgreSQL database when [USE_DATABASE] is "Postgres"
pub const DB_URL: &str = "DATABASE_URL";
/// Directory the SQLite database file is placed in
pub const SQLITE_DATA_DIR: &str = "SQLITE_DATA_DIR";
/// File stem of the SQLite database file, the ".db" extension is appended automatically
pub const SQLITE_DB_NAME: &str = "SQLITE_DB_NAME";
/// Maximum number of pooled database connections
pub const DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
/// Socket address the HTTP server listens on
pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
/// Log level configuration for the application. For formatting info, see [EnvFilter's documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Typically http://localhost:4317 when the service runs
/// with an OpenTelemetry collector sidecar. Span export is disabled if this is not set.
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Typically http://localhost:4317 when the service runs
/// with an OpenTelemetry collector sidecar.
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

#[cfg(any(test, feature = "integration_test"))]
pub mod test {
    /// URL for accessing the PostgreSQL database during integration tests (should not contain a database name in the path)
    pub const TEST_DB_URL: &str = "TEST_DB_URL";
}
