//! Authoritative state server for the synchronized desktop.
//!
//! The [`WindowRegistry`] owns the canonical window set. Clients mutate it through the HTTP
//! command gateway and observe it through the `/ws` snapshot push channel.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod gateway;
pub mod logging;
pub mod reducer;
pub mod registry;
pub mod sync_channel;

use std::{future::Future, sync::Arc};

use anyhow::Context;
use axum::{http::HeaderValue, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub use config::ServerConfig;
pub use reducer::{RegistryCommand, RegistryError};
pub use registry::WindowRegistry;

/// Builds the full application: gateway, push channel, CORS, and request tracing.
pub fn app(registry: Arc<WindowRegistry>, allowed_origins: &[String]) -> Router {
    gateway::router(registry)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(origin = %origin, error = %err, "ignoring invalid allowed origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Serves the application on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error when the listener fails.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<WindowRegistry>,
    allowed_origins: &[String],
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, "desktop sync server listening");
    axum::serve(listener, app(registry, allowed_origins))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server terminated")
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error when the address cannot be bound or the server fails.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let registry = Arc::new(WindowRegistry::new(config.broadcast_capacity));
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    serve(listener, registry, &config.allowed_origins, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
