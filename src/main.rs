use anyhow::Context;
use carshop_rest::config::AppConfig;
use carshop_rest::{SharedData, build_router, db, logging, persistence};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if dotenv().is_err() {
        println!("Starting server without .env file.");
    }
    let config = AppConfig::from_env()?;

    let env_filter = logging::init_env_filter(config.telemetry.log_level.as_deref())?;
    let otel_exporters = logging::init_exporters(&config.telemetry)?;
    logging::setup_logging_and_tracing(env_filter, otel_exporters)?;

    let sqlx_pool = db::connect_sqlx(&config.database).await?;
    db::run_migrations(&sqlx_pool).await?;

    let router = build_router(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(sqlx_pool),
    });
    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("binding to {}", config.bind_address))?;

    info!("Starting server on {}", config.bind_address);
    axum::serve(listener, router)
        .await
        .context("serving HTTP requests")?;

    Ok(())
}
