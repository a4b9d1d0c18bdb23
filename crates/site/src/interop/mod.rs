//! Browser bridge for the push channel, gateway requests, and the host clock.
//!
//! This module routes calls to target-specific implementations so the rest of the shell stays
//! free of `cfg` branches. Off wasm32 every browser API reports itself unavailable.

use desktop_runtime::CommandRequest;
use desktop_sync_contract::CommandAck;

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub use imp::SyncSocket;

/// Server used when the page URL carries no `server` query parameter.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

/// Callbacks invoked by an open [`SyncSocket`].
pub struct SyncSocketHandlers {
    /// The socket finished its handshake.
    pub on_open: Box<dyn Fn()>,
    /// A text frame arrived.
    pub on_text: Box<dyn Fn(String)>,
    /// The socket closed or failed.
    pub on_close: Box<dyn Fn()>,
}

/// Returns the sync server base URL: the page's `?server=` parameter, else [`DEFAULT_SERVER_URL`].
pub fn server_url() -> String {
    imp::query_param("server")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

/// Opens the push channel at `url`.
pub fn open_sync_socket(url: &str, handlers: SyncSocketHandlers) -> Result<SyncSocket, String> {
    imp::open_sync_socket(url, handlers)
}

/// Sends a gateway request and decodes the acknowledgment.
pub async fn send_command(base: &str, request: &CommandRequest) -> Result<CommandAck, String> {
    imp::send_command(base, request).await
}

/// Monotonic host clock in whole milliseconds.
pub fn now_ms() -> u64 {
    imp::now_ms()
}

/// Joins the server base URL and a gateway path.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn join_url_avoids_double_slash() {
        assert_eq!(
            join_url("http://localhost:3001/", "/api/windows"),
            "http://localhost:3001/api/windows"
        );
    }
}
