//! HTTP delivery of gateway commands.

use desktop_runtime::{
    CommandFuture, CommandMethod, CommandRequest, CommandTransport, OutboundCommand,
};
use desktop_sync_contract::{routes, CommandAck, SnapshotMessage, CORRELATION_ID_HEADER};
use reqwest::Method;
use tracing::debug;

use crate::{error::SyncClientError, url::normalize_base};

/// Gateway client over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCommandTransport {
    client: reqwest::Client,
    base: String,
}

impl HttpCommandTransport {
    /// Creates a transport for the server at `server_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncClientError::InvalidUrl`] for non-HTTP URLs.
    pub fn new(server_url: &str) -> Result<Self, SyncClientError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base: normalize_base(server_url)?,
        })
    }

    /// Sends a command and decodes the acknowledgment.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success statuses, and undecodable bodies.
    pub async fn execute(&self, command: &OutboundCommand) -> Result<CommandAck, SyncClientError> {
        let request = command.to_request()?;
        self.execute_request(request).await
    }

    async fn execute_request(&self, request: CommandRequest) -> Result<CommandAck, SyncClientError> {
        let method = match request.method {
            CommandMethod::Post => Method::POST,
            CommandMethod::Put => Method::PUT,
            CommandMethod::Patch => Method::PATCH,
            CommandMethod::Delete => Method::DELETE,
        };
        debug!(method = %method, path = %request.path, correlation_id = %request.correlation_id, "sending command");
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base, request.path))
            .header(CORRELATION_ID_HEADER, request.correlation_id);
        if let Some(body) = request.body {
            builder = builder.json(&body);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncClientError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Fetches the current snapshot over HTTP.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and undecodable bodies.
    pub async fn fetch_state(&self) -> Result<SnapshotMessage, SyncClientError> {
        let response = self
            .client
            .get(format!("{}{}", self.base, routes::STATE))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl CommandTransport for HttpCommandTransport {
    fn send<'a>(
        &'a self,
        command: &'a OutboundCommand,
    ) -> CommandFuture<'a, Result<CommandAck, String>> {
        Box::pin(async move { self.execute(command).await.map_err(|err| err.to_string()) })
    }
}
