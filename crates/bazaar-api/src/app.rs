//! Application builder: wires infrastructure, services, router, and
//! middleware into a running server.

use std::net::SocketAddr;

use axum::Router;
use tracing::{info, warn};

use bazaar_cache::CacheManager;
use bazaar_core::config::AppConfig;
use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_database::Database;
use bazaar_service::build_gateway;
use bazaar_storage::build_storage;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Connect every backing service named in `config` and wire the state.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    // ── Step 1: Database ─────────────────────────────────────────
    info!(provider = %config.database.provider, "Initializing database...");
    let db = Database::connect(&config.database).await?;

    // ── Step 2: Cache ────────────────────────────────────────────
    info!(provider = %config.cache.provider, "Initializing cache...");
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 3: Object storage ───────────────────────────────────
    let storage = build_storage(&config.storage).await?;

    // ── Step 4: Payment gateway ──────────────────────────────────
    let gateway = build_gateway(&config.payment)?;

    // ── Step 5: Services ─────────────────────────────────────────
    let state = AppState::build(config, db, cache, storage, gateway)?;
    if !state.audit.has_webhook() {
        info!("Audit webhook disabled");
    }
    Ok(state)
}

/// Runs the Bazaar server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!(environment = %config.environment, "Starting Bazaar server...");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config).await?;
    let db = state.db.clone();
    let app = build_app(state);

    // ── Step 6: Bind and serve ───────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, format!("Failed to bind {addr}"), e)
    })?;
    info!("Bazaar server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    db.close().await;
    info!("Bazaar server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
