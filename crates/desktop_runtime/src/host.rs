//! Host boundary for delivering outbound commands.
//!
//! The reducer only describes commands. Browser and native hosts implement [`CommandTransport`]
//! over their own HTTP stacks; tests use [`MemoryCommandTransport`].

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use desktop_sync_contract::CommandAck;

use crate::{model::OutboundCommand, reducer::DesktopAction};

/// Object-safe boxed future used by [`CommandTransport`].
pub type CommandFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service that delivers commands to the gateway.
pub trait CommandTransport {
    /// Sends `command` and resolves with the gateway acknowledgment.
    ///
    /// Errors are reported as display strings. Either way the result goes back to the reducer as
    /// [`DesktopAction::CommandSettled`]; see [`deliver`].
    fn send<'a>(&'a self, command: &'a OutboundCommand)
        -> CommandFuture<'a, Result<CommandAck, String>>;
}

/// Sends `command` and wraps the result as [`DesktopAction::CommandSettled`].
pub async fn deliver<T>(transport: &T, command: &OutboundCommand) -> DesktopAction
where
    T: CommandTransport + ?Sized,
{
    DesktopAction::CommandSettled {
        correlation_id: command.correlation_id().to_string(),
        outcome: transport.send(command).await,
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Transport that drops every command, for hosts without a server.
pub struct NoopCommandTransport;

impl CommandTransport for NoopCommandTransport {
    fn send<'a>(
        &'a self,
        _command: &'a OutboundCommand,
    ) -> CommandFuture<'a, Result<CommandAck, String>> {
        Box::pin(async { Err("command transport unavailable".to_string()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory transport that records every command and acknowledges it.
pub struct MemoryCommandTransport {
    sent: Rc<RefCell<Vec<OutboundCommand>>>,
}

impl MemoryCommandTransport {
    /// Returns the commands sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundCommand> {
        self.sent.borrow().clone()
    }
}

impl CommandTransport for MemoryCommandTransport {
    fn send<'a>(
        &'a self,
        command: &'a OutboundCommand,
    ) -> CommandFuture<'a, Result<CommandAck, String>> {
        Box::pin(async move {
            let mut sent = self.sent.borrow_mut();
            sent.push(command.clone());
            Ok(CommandAck {
                correlation_id: Some(command.correlation_id().to_string()),
                outcome: desktop_sync_contract::CommandOutcome::Applied,
                version: u64::try_from(sent.len()).unwrap_or(u64::MAX),
                window_id: command.window_id().cloned(),
            })
        })
    }
}
