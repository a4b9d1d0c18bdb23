//! Registry commands and the transition logic applied to the canonical desktop state.

use desktop_sync_contract::{
    window_types, CommandKind, CreateWindowRequest, FileEntry, PatchError, Point, Size,
    SystemState, Theme, WindowId, WindowPatch, WindowRecord, CASCADE_STEP, DEFAULT_ORIGIN,
    TEXT_EDITOR_WELCOME,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
/// Mutations accepted by [`apply_command`].
pub enum RegistryCommand {
    /// Create a window; the id is assigned here.
    CreateWindow(CreateWindowRequest),
    /// Merge a partial update into an existing window.
    UpdateWindow {
        /// Target window.
        window_id: WindowId,
        /// Fields to merge.
        patch: WindowPatch,
    },
    /// Remove a window.
    CloseWindow {
        /// Target window.
        window_id: WindowId,
    },
    /// Raise a window to the top of the stack.
    FocusWindow {
        /// Target window.
        window_id: WindowId,
    },
    /// Replace the theme flag.
    SetTheme {
        /// New theme.
        theme: Theme,
    },
    /// Append an entry to the file-listing placeholder.
    AddFile(FileEntry),
}

impl RegistryCommand {
    /// Returns the receipt kind for this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::CreateWindow(_) => CommandKind::CreateWindow,
            Self::UpdateWindow { .. } => CommandKind::UpdateWindow,
            Self::CloseWindow { .. } => CommandKind::CloseWindow,
            Self::FocusWindow { .. } => CommandKind::FocusWindow,
            Self::SetTheme { .. } => CommandKind::SetTheme,
            Self::AddFile(_) => CommandKind::AddFile,
        }
    }

    /// Returns the window targeted by the command, if it targets an existing one.
    pub fn target(&self) -> Option<&WindowId> {
        match self {
            Self::UpdateWindow { window_id, .. }
            | Self::CloseWindow { window_id }
            | Self::FocusWindow { window_id } => Some(window_id),
            Self::CreateWindow(_) | Self::SetTheme { .. } | Self::AddFile(_) => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors raised while applying a [`RegistryCommand`].
pub enum RegistryError {
    /// The target window is not (or no longer) in the registry.
    #[error("window `{0}` not found")]
    NotFound(WindowId),
    /// The update carried only one half of a geometry pair.
    #[error("invalid window patch: {0}")]
    InvalidPatch(#[from] PatchError),
    /// A desktop-wide command was asked for the window it produced.
    #[error("command did not produce a window record")]
    NoWindow,
}

/// Canonical state owned by the registry plus its id and version counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryState {
    /// Sequence number handed to the next created window.
    pub next_window_seq: u64,
    /// Number of committed mutations.
    pub version: u64,
    /// Aggregate state broadcast to clients.
    pub state: SystemState,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            next_window_seq: 1,
            version: 0,
            state: SystemState::default(),
        }
    }
}

/// Result of a committed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Window touched by the command.
    pub window_id: Option<WindowId>,
    /// Record as it stands after the command (`None` for closes and non-window commands).
    pub record: Option<WindowRecord>,
}

impl Commit {
    fn window(record: &WindowRecord) -> Self {
        Self {
            window_id: Some(record.id.clone()),
            record: Some(record.clone()),
        }
    }

    fn desktop() -> Self {
        Self {
            window_id: None,
            record: None,
        }
    }

    /// Returns the committed record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for a removed window and [`RegistryError::NoWindow`]
    /// for desktop-wide commands.
    pub fn into_record(self) -> Result<WindowRecord, RegistryError> {
        match (self.record, self.window_id) {
            (Some(record), _) => Ok(record),
            (None, Some(window_id)) => Err(RegistryError::NotFound(window_id)),
            (None, None) => Err(RegistryError::NoWindow),
        }
    }
}

/// Applies a [`RegistryCommand`] to the registry state.
///
/// The version counter is not touched here; the caller bumps it once per committed command so
/// that every broadcast carries a distinct version.
///
/// # Errors
///
/// Returns [`RegistryError::NotFound`] when the command references a window that is not present
/// and [`RegistryError::InvalidPatch`] for torn geometry pairs. State is unchanged on error.
pub fn apply_command(
    registry: &mut RegistryState,
    command: RegistryCommand,
) -> Result<Commit, RegistryError> {
    match command {
        RegistryCommand::CreateWindow(request) => {
            let window_id = next_window_id(registry);
            let record = build_window(window_id, cascade_offset(registry), request);
            let commit = Commit::window(&record);
            registry.state.windows.push(record);
            Ok(commit)
        }
        RegistryCommand::UpdateWindow { window_id, patch } => {
            let update = patch.into_update()?;
            let window = find_window_mut(&mut registry.state, &window_id)?;
            window.apply_update(&update);
            Ok(Commit::window(window))
        }
        RegistryCommand::CloseWindow { window_id } => {
            let before_len = registry.state.windows.len();
            registry.state.windows.retain(|w| w.id != window_id);
            if registry.state.windows.len() == before_len {
                return Err(RegistryError::NotFound(window_id));
            }
            Ok(Commit {
                window_id: Some(window_id),
                record: None,
            })
        }
        RegistryCommand::FocusWindow { window_id } => {
            raise_window(&mut registry.state, &window_id)?;
            let commit = registry
                .state
                .windows
                .last()
                .map(Commit::window)
                .unwrap_or_else(Commit::desktop);
            Ok(commit)
        }
        RegistryCommand::SetTheme { theme } => {
            registry.state.theme = theme;
            Ok(Commit::desktop())
        }
        RegistryCommand::AddFile(file) => {
            registry.state.files.push(file);
            Ok(Commit::desktop())
        }
    }
}

fn next_window_id(registry: &mut RegistryState) -> WindowId {
    let id = WindowId::from_sequence(registry.next_window_seq);
    registry.next_window_seq = registry.next_window_seq.saturating_add(1);
    id
}

// The counter has already advanced past the new window, so step back one to get its index.
fn cascade_offset(registry: &RegistryState) -> Point {
    let index = registry.next_window_seq.saturating_sub(1);
    let step = i32::try_from(index)
        .unwrap_or(i32::MAX)
        .saturating_mul(CASCADE_STEP);
    let origin = DEFAULT_ORIGIN.saturating_add(step);
    Point {
        x: origin,
        y: origin,
    }
}

fn build_window(id: WindowId, cascade: Point, request: CreateWindowRequest) -> WindowRecord {
    let position = request.proposed_position().unwrap_or(cascade);
    let size = request
        .proposed_size()
        .unwrap_or_default()
        .clamped_min();
    let content = match request.content {
        Some(content) => Some(content),
        None if request.kind == window_types::TEXT_EDITOR => Some(TEXT_EDITOR_WELCOME.to_string()),
        None => None,
    };
    let Size { width, height } = size;
    WindowRecord {
        id,
        title: request.title,
        kind: request.kind,
        x: position.x,
        y: position.y,
        width,
        height,
        minimized: request.minimized.unwrap_or(false),
        content,
    }
}

fn find_window_mut<'a>(
    state: &'a mut SystemState,
    window_id: &WindowId,
) -> Result<&'a mut WindowRecord, RegistryError> {
    state
        .window_mut(window_id)
        .ok_or_else(|| RegistryError::NotFound(window_id.clone()))
}

fn raise_window(state: &mut SystemState, window_id: &WindowId) -> Result<(), RegistryError> {
    let index = state
        .windows
        .iter()
        .position(|w| &w.id == window_id)
        .ok_or_else(|| RegistryError::NotFound(window_id.clone()))?;
    if index + 1 == state.windows.len() {
        return Ok(());
    }
    let window = state.windows.remove(index);
    state.windows.push(window);
    Ok(())
}
