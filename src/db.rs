use anyhow::Context;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use sqlx::migrate::Migrator;
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, DatabaseEngine};

/// Schema migrations embedded from the "migrations" directory
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Builds a connection pool for the configured engine. The pool is engine-agnostic so the same
/// driven ports serve PostgreSQL and SQLite.
pub async fn connect_sqlx(db_config: &DatabaseConfig) -> Result<AnyPool, anyhow::Error> {
    sqlx::any::install_default_drivers();

    let mut pool_options = AnyPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(2));

    // An in-memory SQLite database lives only as long as its connection
    if db_config.engine == DatabaseEngine::SqliteMemory {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect(&db_config.data_source)
        .await
        .with_context(|| format!("connecting to {:?} database", db_config.engine))?;
    info!(engine = ?db_config.engine, "Connected to database");

    Ok(pool)
}

/// Creates or upgrades the schema. Safe to run on every startup.
pub async fn run_migrations(pool: &AnyPool) -> Result<(), anyhow::Error> {
    MIGRATOR
        .run(pool)
        .await
        .context("running database migrations")?;
    info!("Database migrations applied");

    Ok(())
}
