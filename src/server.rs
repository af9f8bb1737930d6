//! HTTP server initialization and runtime setup.
//!
//! Handles opening the mapping store, wiring the link service and the Axum
//! server lifecycle.

use crate::application::services::LinkService;
use crate::config::Config;
use crate::domain::repositories::MappingStore;
use crate::infrastructure::persistence::FileMappingStore;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Builds the application state from configuration.
///
/// Opens (or creates) the snapshot at `config.store_path` and wires the
/// link service with the configured code policy.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or initialized.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let store = FileMappingStore::open(config.store_path.clone())
        .await
        .with_context(|| format!("Failed to open store at {}", config.store_path.display()))?;

    let store: Arc<dyn MappingStore> = Arc::new(store);
    let policy = config.code_policy();
    tracing::info!("Code policy: {}", policy.name());

    let link_service = LinkService::new(store, policy, config.base_url.clone())
        .with_max_attempts(config.max_allocation_attempts);

    Ok(AppState::new(link_service))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - File-backed mapping store
/// - Link service with the configured code policy
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be opened
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
