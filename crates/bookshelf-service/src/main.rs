//! Bookshelf HTTP service.
//!
//! # Configuration
//!
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `BOOKSHELF_STORE` - `table` (default) or `memory`
//! - `BOOKSHELF_DB_PATH`, `BOOKSHELF_TABLE_NAME` - table store location
//! - `BOOKSHELF_SEED_PATH` - JSON seed for the memory store
//! - `BOOKSHELF_API_KEY` - function key; unset disables authentication
//! - `BOOKSHELF_READ_ONLY` - mount only the read operations
//! - `RUST_LOG`, `LOG_FORMAT` - logging
//! - `METRICS_ENABLED`, `METRICS_PATH` - metrics

use std::net::SocketAddr;

use tracing::{error, info};

use bookshelf_service::app;
use bookshelf_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig, ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("bookshelf");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env().map_err(|e| {
        error!(error = %e, "invalid configuration");
        e
    })?;

    info!(
        port = config.port,
        store = ?config.store,
        table = %config.table_name,
        read_only = config.read_only,
        auth = config.api_key.is_some(),
        "starting bookshelf service"
    );

    let state = AppState::load(&config).map_err(|e| {
        error!(error = %e, "failed to load application state");
        e
    })?;

    info!(state = ?state, "application state loaded");

    let app = app(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
