//! HTTP server

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use backrest_core::BackrestService;

use crate::error::{Error, Result};
use crate::handlers::{backup_handler, restore_handler, show_handler};

/// Default address the server listens on
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8443";

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind the server
    pub addr: SocketAddr,
}

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    /// Issuance service every request is delegated to
    pub service: Arc<BackrestService>,
}

impl AppState {
    /// Wrap a service for sharing across handlers
    pub fn new(service: BackrestService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the API router
///
/// Routes:
/// - `POST /backrestbackup` - issue backup tasks
/// - `GET /backrest/{name}?selector=` - show pgbackrest info
/// - `POST /restore` - issue a restore task
/// - `GET /healthz` - health check
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/backrestbackup", post(backup_handler))
        .route("/backrest/{name}", get(show_handler))
        .route("/restore", post(restore_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

/// Serve the API until interrupted
pub async fn start_server(config: ServerConfig, service: BackrestService) -> Result<()> {
    let app = router(AppState::new(service));

    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|e| Error::Config(format!("failed to bind {}: {}", config.addr, e)))?;

    info!(addr = %config.addr, "Starting backrest API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("backrest API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
