use thiserror::Error;

/// Errors raised by the native sync client.
#[derive(Debug, Error)]
pub enum SyncClientError {
    /// The configured server URL is not usable.
    #[error("invalid server url `{0}`: expected http:// or https://")]
    InvalidUrl(String),
    /// The HTTP request could not be completed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },
    /// The push channel failed.
    #[error("sync channel error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    /// A payload could not be encoded or decoded.
    #[error("malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),
    /// The push channel closed.
    #[error("sync channel lost")]
    ChannelLost,
}
