//! Client-side desktop state: the last accepted snapshot, connection status, and pending commands.

use std::collections::BTreeMap;

use desktop_sync_contract::{
    routes, CommandKind, CreateWindowRequest, SetThemeRequest, SystemState, Theme, WindowId,
    WindowPatch, WindowRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Pointer coordinates in client pixels.
pub struct PointerPosition {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// State of the push channel as seen by the client.
pub enum ConnectionStatus {
    /// No channel has been opened yet.
    #[default]
    Connecting,
    /// The channel is open and pushes are being applied.
    Connected,
    /// The channel dropped; the local snapshot is stale until the next connect-time push.
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Command sent to the gateway whose effect has not yet reached the local snapshot.
pub struct PendingCommand {
    /// Command kind.
    pub kind: CommandKind,
    /// Window the command targets, if any.
    pub window_id: Option<WindowId>,
    /// Set for content edits already written into the local snapshot.
    pub edits_content: bool,
    /// Registry version from the gateway acknowledgment; the entry clears once a push reaches it.
    pub acked_version: Option<u64>,
}

impl PendingCommand {
    pub(crate) fn is_reflected_by(&self, version: u64) -> bool {
        self.acked_version.is_some_and(|acked| acked <= version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Top-level client state owned by the desktop reducer.
pub struct DesktopState {
    /// Last accepted registry snapshot.
    pub snapshot: Option<SystemState>,
    /// Version of [`Self::snapshot`]; `None` until the first push after a (re)connect.
    pub version: Option<u64>,
    /// Push channel status.
    pub connection: ConnectionStatus,
    /// Commands awaiting their receipt or acknowledgment, keyed by correlation id.
    pub pending: BTreeMap<String, PendingCommand>,
    next_correlation: u64,
}

impl DesktopState {
    /// Returns `true` while pushes are being applied.
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionStatus::Connected
    }

    /// Returns `true` when the local snapshot may be out of date.
    pub fn is_stale(&self) -> bool {
        !self.is_connected() || self.snapshot.is_none()
    }

    /// Returns the current theme, or the default before the first snapshot.
    pub fn theme(&self) -> Theme {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.theme)
            .unwrap_or_default()
    }

    /// Finds a window in the local snapshot.
    pub fn window(&self, window_id: &WindowId) -> Option<&WindowRecord> {
        self.snapshot.as_ref()?.window(window_id)
    }

    pub(crate) fn next_correlation_id(&mut self) -> String {
        self.next_correlation = self.next_correlation.saturating_add(1);
        format!("c-{}", self.next_correlation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Mutation request emitted by the reducer for the host transport to deliver.
pub enum OutboundCommand {
    /// Create a window.
    CreateWindow {
        /// Client correlation id.
        correlation_id: String,
        /// Creation payload.
        request: CreateWindowRequest,
    },
    /// Merge a partial update into a window.
    UpdateWindow {
        /// Client correlation id.
        correlation_id: String,
        /// Target window.
        window_id: WindowId,
        /// Fields to merge.
        patch: WindowPatch,
    },
    /// Remove a window.
    CloseWindow {
        /// Client correlation id.
        correlation_id: String,
        /// Target window.
        window_id: WindowId,
    },
    /// Raise a window to the top of the stack.
    FocusWindow {
        /// Client correlation id.
        correlation_id: String,
        /// Target window.
        window_id: WindowId,
    },
    /// Replace the theme flag.
    SetTheme {
        /// Client correlation id.
        correlation_id: String,
        /// New theme.
        theme: Theme,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// HTTP verb used to deliver an [`OutboundCommand`].
pub enum CommandMethod {
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl CommandMethod {
    /// Returns the verb as an uppercase token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Transport-neutral description of a gateway request.
pub struct CommandRequest {
    /// HTTP verb.
    pub method: CommandMethod,
    /// Path relative to the server base URL.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Value for the correlation id header.
    pub correlation_id: String,
}

impl OutboundCommand {
    /// Returns the client correlation id.
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::CreateWindow { correlation_id, .. }
            | Self::UpdateWindow { correlation_id, .. }
            | Self::CloseWindow { correlation_id, .. }
            | Self::FocusWindow { correlation_id, .. }
            | Self::SetTheme { correlation_id, .. } => correlation_id,
        }
    }

    /// Returns the receipt kind the server will attach to the resulting push.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::CreateWindow { .. } => CommandKind::CreateWindow,
            Self::UpdateWindow { .. } => CommandKind::UpdateWindow,
            Self::CloseWindow { .. } => CommandKind::CloseWindow,
            Self::FocusWindow { .. } => CommandKind::FocusWindow,
            Self::SetTheme { .. } => CommandKind::SetTheme,
        }
    }

    /// Returns the targeted window, if any.
    pub fn window_id(&self) -> Option<&WindowId> {
        match self {
            Self::UpdateWindow { window_id, .. }
            | Self::CloseWindow { window_id, .. }
            | Self::FocusWindow { window_id, .. } => Some(window_id),
            Self::CreateWindow { .. } | Self::SetTheme { .. } => None,
        }
    }

    /// Maps the command onto the gateway route that accepts it.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a body cannot be encoded as JSON.
    pub fn to_request(&self) -> Result<CommandRequest, serde_json::Error> {
        let (method, path, body) = match self {
            Self::CreateWindow { request, .. } => (
                CommandMethod::Post,
                routes::WINDOWS.to_string(),
                Some(serde_json::to_value(request)?),
            ),
            Self::UpdateWindow {
                window_id, patch, ..
            } => (
                CommandMethod::Patch,
                routes::window(window_id.as_str()),
                Some(serde_json::to_value(patch)?),
            ),
            Self::CloseWindow { window_id, .. } => (
                CommandMethod::Delete,
                routes::window(window_id.as_str()),
                None,
            ),
            Self::FocusWindow { window_id, .. } => (
                CommandMethod::Post,
                routes::window_focus(window_id.as_str()),
                None,
            ),
            Self::SetTheme { theme, .. } => (
                CommandMethod::Put,
                routes::THEME.to_string(),
                Some(serde_json::to_value(SetThemeRequest { theme: *theme })?),
            ),
        };
        Ok(CommandRequest {
            method,
            path,
            body,
            correlation_id: self.correlation_id().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use desktop_sync_contract::Point;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn commands_map_onto_gateway_routes() {
        let update = OutboundCommand::UpdateWindow {
            correlation_id: "c-3".to_string(),
            window_id: WindowId::new("window-2"),
            patch: WindowPatch::position(Point { x: 5, y: 6 }),
        };
        let request = update.to_request().expect("request");
        assert_eq!(request.method, CommandMethod::Patch);
        assert_eq!(request.path, "/api/windows/window-2");
        assert_eq!(request.body, Some(json!({ "x": 5, "y": 6 })));
        assert_eq!(request.correlation_id, "c-3");

        let theme = OutboundCommand::SetTheme {
            correlation_id: "c-4".to_string(),
            theme: Theme::WindowsXp,
        };
        let request = theme.to_request().expect("request");
        assert_eq!(request.method, CommandMethod::Put);
        assert_eq!(request.body, Some(json!({ "theme": "windows-xp" })));

        let close = OutboundCommand::CloseWindow {
            correlation_id: "c-5".to_string(),
            window_id: WindowId::new("window-1"),
        };
        let request = close.to_request().expect("request");
        assert_eq!(request.method.as_str(), "DELETE");
        assert_eq!(request.body, None);
    }

    #[test]
    fn correlation_ids_are_sequential() {
        let mut state = DesktopState::default();
        assert_eq!(state.next_correlation_id(), "c-1");
        assert_eq!(state.next_correlation_id(), "c-2");
        assert!(state.is_stale());
        assert_eq!(state.theme(), Theme::System7);
    }
}
