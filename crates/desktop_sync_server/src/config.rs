//! Command-line and environment configuration for the sync server.

use std::net::SocketAddr;

use clap::Parser;

use crate::registry::DEFAULT_BROADCAST_CAPACITY;

/// Runtime configuration for the sync server.
#[derive(Debug, Clone, Parser)]
#[command(name = "desktop_sync_server", version, about)]
pub struct ServerConfig {
    /// Address the gateway and push channel listen on.
    #[arg(long, env = "DESKTOP_SYNC_BIND", default_value = "127.0.0.1:3001")]
    pub bind: SocketAddr,

    /// Browser origins allowed to call the gateway.
    #[arg(
        long = "allowed-origin",
        env = "DESKTOP_SYNC_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3002"
    )]
    pub allowed_origins: Vec<String>,

    /// Pushes buffered per subscriber before it is treated as lagging.
    #[arg(long, env = "DESKTOP_SYNC_BROADCAST_CAPACITY", default_value_t = DEFAULT_BROADCAST_CAPACITY)]
    pub broadcast_capacity: usize,

    /// Log filter directive; `RUST_LOG` wins when set.
    #[arg(long, env = "DESKTOP_SYNC_LOG", default_value = "info")]
    pub log_filter: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "DESKTOP_SYNC_LOG_JSON")]
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3001)),
            allowed_origins: vec!["http://localhost:3002".to_string()],
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}
