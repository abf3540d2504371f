//! HTTP request boundary.

pub mod analyze;
pub mod catalog;
pub mod error;
pub mod health;
pub mod translate;

use crate::error::{Result, VoxError};
use crate::service::VoiceService;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use analyze::analyze_routes;
pub use catalog::catalog_routes;
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use translate::translate_routes;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: VoiceService,
}

impl AppState {
    pub fn new(service: VoiceService) -> Self {
        Self { service }
    }
}

/// Build the application router.
pub fn build_router(state: AppState, max_upload_mb: usize) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(analyze_routes())
        .merge(translate_routes())
        .merge(catalog_routes())
        .layer(DefaultBodyLimit::max(max_upload_mb.saturating_mul(1024 * 1024)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until SIGINT or SIGTERM.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, shutting down");
        }
        res = wait_for_sigterm() => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Error setting up signal handler");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}

/// Wait for SIGTERM signal (used by systemd and container runtimes).
#[cfg(unix)]
async fn wait_for_sigterm() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate()).map_err(VoxError::Io)?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_sigterm() -> Result<()> {
    // On non-Unix, just wait forever (Ctrl+C will still work)
    std::future::pending().await
}
