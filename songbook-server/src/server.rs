//! Process wiring: storage, metadata client, listener and shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use songbook_query::{QueryError, QueryResult};
use songbook_sqlite::{GroupStore, MigrationReport, SongStore, SqliteConfig, SqlitePool, migrate};

use crate::catalog::SongCatalog;
use crate::config::SongbookConfig;
use crate::metadata::HttpMetadataClient;
use crate::routes::app;
use crate::state::AppState;

/// Open the pool configured in `config`.
pub async fn connect(config: &SongbookConfig) -> QueryResult<SqlitePool> {
    let sqlite = SqliteConfig::from_url(&config.database.url)?;
    let pool = SqlitePool::builder()
        .config(sqlite)
        .max_connections(config.database.max_connections)
        .build()
        .await?;
    Ok(pool)
}

/// Apply pending migrations and log what changed.
pub async fn run_migrations(pool: &SqlitePool) -> QueryResult<MigrationReport> {
    let report = migrate(pool).await?;
    if report.has_changes() {
        info!(applied = ?report.applied, "Database migrated");
    } else {
        info!("Database schema is up to date");
    }
    Ok(report)
}

/// Build handler state over `pool`, talking to the configured metadata service.
pub fn build_state(config: &SongbookConfig, pool: SqlitePool) -> QueryResult<AppState> {
    let url = config
        .metadata
        .require_url()
        .map_err(|e| QueryError::configuration(e.to_string()))?;
    let metadata = HttpMetadataClient::new(url, config.metadata.timeout())?;

    let catalog = SongCatalog::new(
        Arc::new(SongStore::new(pool.clone())),
        Arc::new(GroupStore::new(pool)),
        Arc::new(metadata),
    )?;
    Ok(AppState::new(catalog, config.server.slow_request_threshold()))
}

/// Migrate, bind and serve until Ctrl-C.
pub async fn serve(config: SongbookConfig) -> QueryResult<()> {
    let pool = connect(&config).await?;
    run_migrations(&pool).await?;
    let state = build_state(&config, pool)?;

    let addr = config
        .server
        .socket_addr()
        .map_err(|e| QueryError::configuration(e.to_string()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| QueryError::configuration(format!("cannot bind {}", addr)).with_source(e))?;
    info!(%addr, "Songbook listening");

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| QueryError::internal("server error").with_source(e))?;

    info!("Songbook stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
