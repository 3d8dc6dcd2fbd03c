//! HTTP server bootstrap.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{build_router, ApiState};
use crate::config::ServerConfig;
use crate::errors::{CachetteError, Result};

/// Bind and serve the API until the token is canceled.
pub async fn start_api_server(
    config: &ServerConfig,
    state: ApiState,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| CachetteError::config(format!("invalid API address: {}", e)))?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        CachetteError::connection_with_source(
            format!("failed to bind API server on {}", addr),
            Box::new(e),
        )
    })?;

    info!(address = %addr, "starting HTTP API server");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| CachetteError::connection_with_source("API server error", Box::new(e)))?;

    info!("API server shutdown completed");
    Ok(())
}
