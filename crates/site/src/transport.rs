//! Browser `fetch` delivery of gateway commands.

use desktop_runtime::{CommandFuture, CommandTransport, OutboundCommand};
use desktop_sync_contract::CommandAck;

use crate::interop;

#[derive(Debug, Clone, PartialEq, Eq)]
/// [`CommandTransport`] that posts commands to the gateway with `fetch`.
pub struct FetchCommandTransport {
    base: String,
}

impl FetchCommandTransport {
    /// Creates a transport for the server at `base`.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Returns the server base URL.
    pub fn base(&self) -> &str {
        &self.base
    }
}

impl CommandTransport for FetchCommandTransport {
    fn send<'a>(
        &'a self,
        command: &'a OutboundCommand,
    ) -> CommandFuture<'a, Result<CommandAck, String>> {
        Box::pin(async move {
            let request = command.to_request().map_err(|err| err.to_string())?;
            interop::send_command(&self.base, &request).await
        })
    }
}
