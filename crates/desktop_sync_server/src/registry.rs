//! Injectable owner of the canonical desktop state.
//!
//! Every mutation goes through one mutex-guarded entry point. The commit and its broadcast happen
//! under the same lock, so subscribers observe snapshots in exactly the order they were committed
//! and never see a partially applied command.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use desktop_sync_contract::{
    CommandAck, CommandOutcome, CommandReceipt, CreateWindowRequest, FileEntry, SnapshotMessage,
    Theme, WindowId, WindowPatch, WindowRecord,
};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::reducer::{apply_command, Commit, RegistryCommand, RegistryError, RegistryState};

/// Default number of snapshots buffered per subscriber before it is considered lagging.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Shared snapshot handed to every subscriber of one commit.
pub type SharedSnapshot = Arc<SnapshotMessage>;

/// Authoritative window registry.
pub struct WindowRegistry {
    inner: Mutex<RegistryState>,
    updates: broadcast::Sender<SharedSnapshot>,
    next_session_id: AtomicU64,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl std::fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRegistry")
            .field("version", &self.inner.lock().version)
            .field("subscribers", &self.updates.receiver_count())
            .finish()
    }
}

impl WindowRegistry {
    /// Creates an empty registry whose subscribers may buffer up to `broadcast_capacity` pushes.
    pub fn new(broadcast_capacity: usize) -> Self {
        let (updates, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            inner: Mutex::new(RegistryState::default()),
            updates,
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Returns the current state as a push payload without a receipt.
    pub fn snapshot(&self) -> SnapshotMessage {
        let registry = self.inner.lock();
        SnapshotMessage {
            version: registry.version,
            state: registry.state.clone(),
            receipt: None,
        }
    }

    /// Returns the current snapshot together with a receiver for every later commit.
    ///
    /// Both are taken under the mutation lock, so the receiver starts exactly after the returned
    /// snapshot: no commit is missed and none is delivered twice.
    pub fn subscribe(&self) -> (SnapshotMessage, broadcast::Receiver<SharedSnapshot>) {
        let registry = self.inner.lock();
        let receiver = self.updates.subscribe();
        let snapshot = SnapshotMessage {
            version: registry.version,
            state: registry.state.clone(),
            receipt: None,
        };
        (snapshot, receiver)
    }

    /// Returns the number of live sync-channel subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.updates.receiver_count()
    }

    /// Allocates an id for logging a sync-channel session.
    pub fn next_session_id(&self) -> u64 {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Applies a command, bumps the version, and broadcasts the resulting snapshot.
    ///
    /// Returns the commit together with the version it produced.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] without broadcasting when the command is not applied.
    pub fn commit(
        &self,
        command: RegistryCommand,
        correlation_id: Option<String>,
    ) -> Result<(Commit, u64), RegistryError> {
        let kind = command.kind();
        let mut registry = self.inner.lock();
        let commit = apply_command(&mut registry, command)?;
        registry.version = registry.version.saturating_add(1);

        let snapshot = Arc::new(SnapshotMessage {
            version: registry.version,
            state: registry.state.clone(),
            receipt: Some(CommandReceipt {
                correlation_id,
                command: kind,
                window_id: commit.window_id.clone(),
                outcome: CommandOutcome::Applied,
            }),
        });
        // A send error only means nobody is subscribed right now.
        let delivered = self.updates.send(snapshot).unwrap_or(0);
        info!(
            command = ?kind,
            window = ?commit.window_id.as_ref().map(WindowId::as_str),
            version = registry.version,
            subscribers = delivered,
            "committed registry command"
        );
        Ok((commit, registry.version))
    }

    /// Applies a command on behalf of the command gateway.
    ///
    /// A missing target window is absorbed: the returned ack reports
    /// [`CommandOutcome::NotFound`], nothing is broadcast, and state is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPatch`] for torn geometry updates.
    pub fn submit(
        &self,
        command: RegistryCommand,
        correlation_id: Option<String>,
    ) -> Result<CommandAck, RegistryError> {
        let kind = command.kind();
        let target = command.target().cloned();
        match self.commit(command, correlation_id.clone()) {
            Ok((commit, version)) => Ok(CommandAck {
                correlation_id,
                outcome: CommandOutcome::Applied,
                version,
                window_id: commit.window_id,
            }),
            Err(RegistryError::NotFound(window_id)) => {
                debug!(command = ?kind, window = %window_id, "absorbed command for missing window");
                Ok(CommandAck {
                    correlation_id,
                    outcome: CommandOutcome::NotFound,
                    version: self.version(),
                    window_id: target,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Returns the number of committed mutations.
    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    /// Creates a window and returns its record.
    ///
    /// # Errors
    ///
    /// Creation itself cannot fail; an error here means the reducer produced no record.
    pub fn create(&self, request: CreateWindowRequest) -> Result<WindowRecord, RegistryError> {
        let (commit, _) = self.commit(RegistryCommand::CreateWindow(request), None)?;
        commit.into_record()
    }

    /// Merges a partial update into a window.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the window is gone and
    /// [`RegistryError::InvalidPatch`] for torn geometry pairs.
    pub fn update(
        &self,
        window_id: &WindowId,
        patch: WindowPatch,
    ) -> Result<WindowRecord, RegistryError> {
        let command = RegistryCommand::UpdateWindow {
            window_id: window_id.clone(),
            patch,
        };
        let (commit, _) = self.commit(command, None)?;
        commit.into_record()
    }

    /// Removes a window.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the window was already closed.
    pub fn close(&self, window_id: &WindowId) -> Result<(), RegistryError> {
        let command = RegistryCommand::CloseWindow {
            window_id: window_id.clone(),
        };
        self.commit(command, None).map(|_| ())
    }

    /// Raises a window to the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the window is gone.
    pub fn focus(&self, window_id: &WindowId) -> Result<WindowRecord, RegistryError> {
        let command = RegistryCommand::FocusWindow {
            window_id: window_id.clone(),
        };
        let (commit, _) = self.commit(command, None)?;
        commit.into_record()
    }

    /// Replaces the theme flag and returns the new version.
    ///
    /// # Errors
    ///
    /// Never fails for a well-formed [`Theme`].
    pub fn set_theme(&self, theme: Theme) -> Result<u64, RegistryError> {
        self.commit(RegistryCommand::SetTheme { theme }, None)
            .map(|(_, version)| version)
    }

    /// Appends an entry to the file-listing placeholder and returns the new version.
    ///
    /// # Errors
    ///
    /// Never fails; appending has no precondition.
    pub fn add_file(&self, file: FileEntry) -> Result<u64, RegistryError> {
        self.commit(RegistryCommand::AddFile(file), None)
            .map(|(_, version)| version)
    }

    /// Returns the file-listing placeholder.
    pub fn files(&self) -> Vec<FileEntry> {
        self.inner.lock().state.files.clone()
    }
}
