//! Render model derived from the reducer state.

use desktop_sync_contract::{Theme, WindowId};

use crate::{
    content::{render_content, ContentView},
    interaction::DragResizeController,
    model::{ConnectionStatus, DesktopState},
};

/// Stacking level of the window under an active pointer interaction.
pub const INTERACTION_Z_INDEX: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One visible window as drawn on the desktop surface.
pub struct WindowView {
    /// Window id.
    pub id: WindowId,
    /// Title bar text.
    pub title: String,
    /// Left edge, optimistic while dragged.
    pub x: i32,
    /// Top edge, optimistic while dragged.
    pub y: i32,
    /// Width, optimistic while resized.
    pub width: i32,
    /// Height, optimistic while resized.
    pub height: i32,
    /// Stacking order, 1-based from the back.
    pub z_index: u32,
    /// Whether this is the top window.
    pub focused: bool,
    /// Whether a pointer interaction targets this window.
    pub interacting: bool,
    /// Window body.
    pub content: ContentView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Entry for a minimized window that can be restored.
pub struct MinimizedWindow {
    /// Window id.
    pub id: WindowId,
    /// Title.
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Connection indicator shown over the desktop.
pub enum ConnectionBanner {
    /// Waiting for the first snapshot.
    Connecting,
    /// The channel dropped; what is shown may be out of date.
    Disconnected,
}

impl ConnectionBanner {
    /// Returns the banner text.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Disconnected => "Disconnected. Changes are paused until the connection returns.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Full render model of the desktop.
pub struct DesktopView {
    /// Theme flag.
    pub theme: Theme,
    /// Visible windows, back to front.
    pub windows: Vec<WindowView>,
    /// Minimized windows in stacking order.
    pub minimized: Vec<MinimizedWindow>,
    /// Connection indicator, absent while connected and in sync.
    pub banner: Option<ConnectionBanner>,
}

/// Builds the render model for the current state.
pub fn render_desktop(state: &DesktopState, interaction: &DragResizeController) -> DesktopView {
    let banner = match state.connection {
        ConnectionStatus::Connected if state.snapshot.is_some() => None,
        ConnectionStatus::Disconnected => Some(ConnectionBanner::Disconnected),
        ConnectionStatus::Connected | ConnectionStatus::Connecting => {
            Some(ConnectionBanner::Connecting)
        }
    };

    let Some(snapshot) = state.snapshot.as_ref() else {
        return DesktopView {
            banner,
            ..DesktopView::default()
        };
    };

    let top = snapshot.visible_windows().last().map(|w| w.id.clone());
    let windows = snapshot
        .windows
        .iter()
        .enumerate()
        .filter(|(_, window)| !window.minimized)
        .map(|(index, window)| {
            let position = interaction
                .optimistic_position(&window.id)
                .unwrap_or_else(|| window.position());
            let size = interaction
                .optimistic_size(&window.id)
                .unwrap_or_else(|| window.size());
            let interacting = interaction.active_window() == Some(&window.id);
            WindowView {
                id: window.id.clone(),
                title: window.title.clone(),
                x: position.x,
                y: position.y,
                width: size.width,
                height: size.height,
                z_index: if interacting {
                    INTERACTION_Z_INDEX
                } else {
                    u32::try_from(index + 1).unwrap_or(u32::MAX)
                },
                focused: top.as_ref() == Some(&window.id),
                interacting,
                content: render_content(window),
            }
        })
        .collect();

    let minimized = snapshot
        .windows
        .iter()
        .filter(|window| window.minimized)
        .map(|window| MinimizedWindow {
            id: window.id.clone(),
            title: window.title.clone(),
        })
        .collect();

    DesktopView {
        theme: snapshot.theme,
        windows,
        minimized,
        banner,
    }
}
