//! Shared wire contracts between the desktop sync server, the desktop runtime, and its clients.
//!
//! This crate is intentionally runtime-agnostic. It defines the canonical window record, the
//! full-state snapshot pushed over the sync channel, and the command payloads accepted by the
//! command gateway, without depending on an async runtime, HTTP stack, or browser APIs.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum allowed window width.
pub const MIN_WINDOW_WIDTH: i32 = 300;
/// Minimum allowed window height.
pub const MIN_WINDOW_HEIGHT: i32 = 200;
/// Width assigned to newly created windows.
pub const DEFAULT_WINDOW_WIDTH: i32 = 600;
/// Height assigned to newly created windows.
pub const DEFAULT_WINDOW_HEIGHT: i32 = 400;
/// Base offset of the creation cascade.
pub const DEFAULT_ORIGIN: i32 = 100;
/// Per-window step of the creation cascade.
pub const CASCADE_STEP: i32 = 20;
/// Initial content of a freshly created text editor window.
pub const TEXT_EDITOR_WELCOME: &str = "Welcome to the Text Editor!\n\nStart typing here...";
/// Request header carrying an optional client-generated command correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Well-known content-provider tags.
pub mod window_types {
    /// Editable text bound two-way to the window content.
    pub const TEXT_EDITOR: &str = "text-editor";
    /// Static browser placeholder.
    pub const BROWSER: &str = "browser";
    /// Static file manager placeholder.
    pub const FILE_MANAGER: &str = "file-manager";
}

/// HTTP and WebSocket paths served by the sync server.
pub mod routes {
    /// Current snapshot (read-only).
    pub const STATE: &str = "/api/state";
    /// Window collection (create).
    pub const WINDOWS: &str = "/api/windows";
    /// Theme flag (set).
    pub const THEME: &str = "/api/theme";
    /// File-listing placeholder (list / append).
    pub const FILES: &str = "/api/files";
    /// Snapshot push channel.
    pub const SYNC: &str = "/ws";
    /// Liveness probe.
    pub const HEALTH: &str = "/health";

    /// Path of a single window resource.
    pub fn window(id: &str) -> String {
        format!("{WINDOWS}/{id}")
    }

    /// Path of the focus action for a single window.
    pub fn window_focus(id: &str) -> String {
        format!("{WINDOWS}/{id}/focus")
    }
}

/// Server URL that is not an `http://` or `https://` base.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid server url `{0}`: expected http:// or https://")]
pub struct InvalidServerUrl(pub String);

/// Trims whitespace and trailing slashes from an `http(s)` server base URL.
///
/// # Errors
///
/// Returns [`InvalidServerUrl`] for any other scheme.
pub fn server_base(server_url: &str) -> Result<&str, InvalidServerUrl> {
    let trimmed = server_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed)
    } else {
        Err(InvalidServerUrl(server_url.to_string()))
    }
}

/// Maps an `http(s)` server base URL onto the `ws(s)` push channel URL.
///
/// # Errors
///
/// Returns [`InvalidServerUrl`] for any other scheme.
pub fn sync_url(server_url: &str) -> Result<String, InvalidServerUrl> {
    let base = server_base(server_url)?;
    let ws_base = match base.strip_prefix("https://") {
        Some(rest) => format!("wss://{rest}"),
        None => format!("ws://{}", base.trim_start_matches("http://")),
    };
    Ok(format!("{ws_base}{}", routes::SYNC))
}

/// Registry-assigned window identifier (`window-<n>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    /// Wraps an identifier received from the wire.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Builds the identifier for the `sequence`-th created window.
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("window-{sequence}"))
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Top-left anchored window position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

/// Window dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Size {
    /// Clamps the size up to [`MIN_WINDOW_WIDTH`] x [`MIN_WINDOW_HEIGHT`].
    pub fn clamped_min(self) -> Self {
        Self {
            width: self.width.max(MIN_WINDOW_WIDTH),
            height: self.height.max(MIN_WINDOW_HEIGHT),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

/// Canonical shape of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Registry-assigned identifier.
    pub id: WindowId,
    /// Display title, immutable after creation.
    pub title: String,
    /// Content-provider tag (see [`window_types`]).
    #[serde(rename = "type")]
    pub kind: String,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width, never below [`MIN_WINDOW_WIDTH`].
    pub width: i32,
    /// Height, never below [`MIN_WINDOW_HEIGHT`].
    pub height: i32,
    /// Whether the window is hidden from the rendered surface.
    pub minimized: bool,
    /// Opaque provider-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl WindowRecord {
    /// Returns the top-left position.
    pub fn position(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    /// Returns the current dimensions.
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Replaces the position pair.
    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Replaces the size pair, clamping to the minimum window size.
    pub fn set_size(&mut self, size: Size) {
        let size = size.clamped_min();
        self.width = size.width;
        self.height = size.height;
    }

    /// Merges a validated update into the record.
    pub fn apply_update(&mut self, update: &WindowUpdate) {
        if let Some(position) = update.position {
            self.set_position(position);
        }
        if let Some(size) = update.size {
            self.set_size(size);
        }
        if let Some(minimized) = update.minimized {
            self.minimized = minimized;
        }
        if let Some(content) = update.content.as_ref() {
            self.content = Some(content.clone());
        }
    }
}

/// Desktop-wide theme flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    /// Classic monochrome look.
    #[default]
    System7,
    /// Blue-and-green look.
    WindowsXp,
}

impl Theme {
    /// Returns the other theme. Toggling never produces a third value.
    pub const fn toggled(self) -> Self {
        match self {
            Self::System7 => Self::WindowsXp,
            Self::WindowsXp => Self::System7,
        }
    }

    /// Returns the stable wire token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System7 => "system7",
            Self::WindowsXp => "windows-xp",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme name that is neither `system7` nor `windows-xp`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown theme `{0}`; expected `system7` or `windows-xp`")]
pub struct ParseThemeError(pub String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "system7" => Ok(Self::System7),
            "windows-xp" => Ok(Self::WindowsXp),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// Entry of the file-listing placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name.
    pub name: String,
    /// Free-form file type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional file body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Modification stamp as supplied by the client.
    #[serde(default)]
    pub modified: String,
}

/// Aggregate state broadcast to clients.
///
/// `windows` is kept in z-order: back to front, the last record is on top.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemState {
    /// Window records in stacking order.
    pub windows: Vec<WindowRecord>,
    /// File-listing placeholder.
    pub files: Vec<FileEntry>,
    /// Theme flag.
    pub theme: Theme,
}

impl SystemState {
    /// Finds a window by id.
    pub fn window(&self, id: &WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| &w.id == id)
    }

    /// Finds a window by id for mutation.
    pub fn window_mut(&mut self, id: &WindowId) -> Option<&mut WindowRecord> {
        self.windows.iter_mut().find(|w| &w.id == id)
    }

    /// Returns the non-minimized windows in stacking order.
    pub fn visible_windows(&self) -> impl Iterator<Item = &WindowRecord> {
        self.windows.iter().filter(|w| !w.minimized)
    }
}

/// Request body for window creation.
///
/// Only `title` and `type` are authoritative. The id is always assigned by the registry and the
/// remaining fields are proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWindowRequest {
    /// Display title.
    pub title: String,
    /// Content-provider tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Client-proposed id; ignored by the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Proposed left edge (requires `y`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    /// Proposed top edge (requires `x`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    /// Proposed width (requires `height`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    /// Proposed height (requires `width`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Proposed initial minimized flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimized: Option<bool>,
    /// Proposed initial content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CreateWindowRequest {
    /// Creates a request carrying only the authoritative fields.
    pub fn new(kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: kind.into(),
            id: None,
            x: None,
            y: None,
            width: None,
            height: None,
            minimized: None,
            content: None,
        }
    }

    /// Returns the proposed position when both halves are present.
    pub fn proposed_position(&self) -> Option<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point { x, y }),
            _ => None,
        }
    }

    /// Returns the proposed size when both halves are present.
    pub fn proposed_size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Size { width, height }),
            _ => None,
        }
    }
}

/// Errors produced when validating a [`WindowPatch`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Only one of `x`/`y` was supplied.
    #[error("position update must carry both x and y")]
    HalfPosition,
    /// Only one of `width`/`height` was supplied.
    #[error("size update must carry both width and height")]
    HalfSize,
}

/// Partial window update as sent over the command gateway.
///
/// Identity fields (`id`, `title`, `type`) are not part of the patch and are ignored when a client
/// sends a full record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowPatch {
    /// New left edge (requires `y`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    /// New top edge (requires `x`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    /// New width (requires `height`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    /// New height (requires `width`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// New minimized flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimized: Option<bool>,
    /// New content payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl WindowPatch {
    /// Patch moving the window.
    pub fn position(position: Point) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Self::default()
        }
    }

    /// Patch resizing the window.
    pub fn size(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
            ..Self::default()
        }
    }

    /// Patch setting the minimized flag.
    pub fn minimized(minimized: bool) -> Self {
        Self {
            minimized: Some(minimized),
            ..Self::default()
        }
    }

    /// Patch replacing the content payload.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Returns `true` when the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validates the geometry pairs and converts the patch into a [`WindowUpdate`].
    ///
    /// Sizes are clamped to the minimum window size; an undersized request is never rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError`] when only one half of a geometry pair is present.
    pub fn into_update(self) -> Result<WindowUpdate, PatchError> {
        let position = match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point { x, y }),
            (None, None) => None,
            _ => return Err(PatchError::HalfPosition),
        };
        let size = match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Size { width, height }.clamped_min()),
            (None, None) => None,
            _ => return Err(PatchError::HalfSize),
        };
        Ok(WindowUpdate {
            position,
            size,
            minimized: self.minimized,
            content: self.content,
        })
    }
}

/// Validated window update with geometry grouped into atomic pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowUpdate {
    /// Replacement position.
    pub position: Option<Point>,
    /// Replacement size, already clamped.
    pub size: Option<Size>,
    /// Replacement minimized flag.
    pub minimized: Option<bool>,
    /// Replacement content.
    pub content: Option<String>,
}

/// Request body for the theme endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetThemeRequest {
    /// New theme.
    pub theme: Theme,
}

/// Kind of command that produced a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Window creation.
    CreateWindow,
    /// Partial window update.
    UpdateWindow,
    /// Window removal.
    CloseWindow,
    /// Raise a window to the top of the stack.
    FocusWindow,
    /// Theme replacement.
    SetTheme,
    /// File placeholder append.
    AddFile,
}

/// Result of applying a command to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The command changed canonical state.
    Applied,
    /// The command targeted a window that no longer exists; state is unchanged.
    NotFound,
}

/// Attribution of a pushed snapshot to the command that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReceipt {
    /// Client-generated correlation id, when one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Command kind.
    pub command: CommandKind,
    /// Window affected by the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
    /// Command outcome.
    pub outcome: CommandOutcome,
}

/// Optional acknowledgment body returned by the command gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    /// Echo of the request correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Command outcome.
    pub outcome: CommandOutcome,
    /// Registry version after the command.
    pub version: u64,
    /// Window affected by the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
}

/// Full-state push sent over the sync channel.
///
/// The [`SystemState`] fields are flattened so the wire names stay `windows`, `files`, `theme`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    /// Monotonic registry version; increases by one per committed mutation.
    pub version: u64,
    /// Complete canonical state.
    #[serde(flatten)]
    pub state: SystemState,
    /// Command whose commit produced this push, absent for connect/resync pushes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<CommandReceipt>,
}

/// Messages accepted from clients on the sync channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for a fresh full snapshot.
    Resync,
}
