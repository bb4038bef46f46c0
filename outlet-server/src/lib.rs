//! HTTP surface for the outlet locator.
//!
//! Exposes the read-only [`QueryService`] as JSON over axum. Handlers never
//! write to the store.

use std::io;
use std::net::SocketAddr;

use log::{info, warn};
use outlet_core::QueryService;
use thiserror::Error;
use tokio::net::TcpListener;

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{build_app, build_router};

/// Errors raised while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be opened.
    #[error("failed to bind {addr}")]
    Bind {
        /// Requested listen address.
        addr: SocketAddr,
        /// Socket error.
        #[source]
        source: io::Error,
    },
    /// The accept loop stopped with an IO error.
    #[error("HTTP server failed")]
    Serve(#[source] io::Error),
}

/// Bind `addr` and serve until interrupted.
pub async fn run(addr: SocketAddr, service: QueryService) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    serve(listener, service).await
}

/// Serve on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, service: QueryService) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!("serving outlet API on http://{addr}");
    }
    axum::serve(listener, build_app(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;
    info!("outlet API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
