//! Reducer actions, side-effect intents, and transition logic for the desktop client.
//!
//! The reducer never mutates windows directly. Window changes leave as [`OutboundCommand`]s and
//! come back as pushed snapshots, which replace the local copy wholesale.

use desktop_sync_contract::{
    CommandAck, CommandOutcome, CreateWindowRequest, Size, SnapshotMessage, SystemState, Theme,
    WindowId, WindowPatch, WindowRecord,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    content::{content_patch, ContentInput},
    interaction::{DragResizeController, InteractionEffect},
    model::{ConnectionStatus, DesktopState, OutboundCommand, PendingCommand, PointerPosition},
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`].
pub enum DesktopAction {
    /// The push channel opened.
    ChannelOpened,
    /// A full-state push arrived.
    SnapshotReceived(SnapshotMessage),
    /// The push channel dropped.
    ChannelLost,
    /// Ask the registry for a new window.
    CreateWindow {
        /// Content-provider tag.
        kind: String,
        /// Display title.
        title: String,
    },
    /// Flip the minimized flag of a window.
    ToggleMinimize {
        /// Target window.
        window_id: WindowId,
    },
    /// Un-minimize a window and raise it.
    RestoreWindow {
        /// Target window.
        window_id: WindowId,
    },
    /// Close a window.
    CloseWindow {
        /// Target window.
        window_id: WindowId,
    },
    /// Raise a window to the top of the stack.
    FocusWindow {
        /// Target window.
        window_id: WindowId,
    },
    /// Forward input from a window body to its content provider.
    EditContent {
        /// Target window.
        window_id: WindowId,
        /// Body input.
        input: ContentInput,
    },
    /// Flip the desktop theme.
    ToggleTheme,
    /// Pointer pressed on a window header.
    BeginMove {
        /// Window being dragged.
        window_id: WindowId,
        /// Pointer position at press time.
        pointer: PointerPosition,
    },
    /// Pointer pressed on a window resize handle.
    BeginResize {
        /// Window being resized.
        window_id: WindowId,
        /// Pointer position at press time.
        pointer: PointerPosition,
    },
    /// Global pointer move while an interaction is active.
    PointerMove {
        /// Current pointer position.
        pointer: PointerPosition,
        /// Host clock in milliseconds.
        now_ms: u64,
    },
    /// Global pointer release.
    PointerRelease,
    /// Pointer capture lost (cancel, blur).
    PointerCancel,
    /// A timer requested by [`RuntimeEffect::ScheduleFlush`] fired.
    FlushPointer {
        /// Host clock in milliseconds.
        now_ms: u64,
    },
    /// The transport finished delivering a command.
    CommandSettled {
        /// Correlation id of the delivered command.
        correlation_id: String,
        /// Gateway acknowledgment, or the transport error text.
        outcome: Result<CommandAck, String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the host to execute.
pub enum RuntimeEffect {
    /// Deliver a command to the gateway.
    SendCommand(OutboundCommand),
    /// Start listening for global pointer-move/pointer-release events.
    AcquirePointerListeners,
    /// Stop listening for global pointer events.
    ReleasePointerListeners,
    /// Ask the push channel for a fresh snapshot.
    RequestResync,
    /// Dispatch [`DesktopAction::FlushPointer`] after `delay_ms`.
    ScheduleFlush {
        /// Milliseconds to wait.
        delay_ms: u64,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for actions that cannot start.
pub enum ReducerError {
    /// The target window is not in the local snapshot.
    #[error("window `{0}` not found")]
    WindowNotFound(WindowId),
    /// Mutations are suspended until the push channel reconnects.
    #[error("desktop is disconnected")]
    Disconnected,
    /// Minimized windows have no pointer target.
    #[error("window `{0}` is minimized")]
    WindowMinimized(WindowId),
}

/// Applies a [`DesktopAction`] to the client state and collects resulting side effects.
///
/// # Errors
///
/// Returns [`ReducerError`] when an action references a window missing from the local snapshot
/// or a mutation is attempted while disconnected. State is unchanged on error.
pub fn reduce_desktop(
    state: &mut DesktopState,
    interaction: &mut DragResizeController,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::ChannelOpened => {
            let reconnect = state.connection == ConnectionStatus::Disconnected;
            state.connection = ConnectionStatus::Connected;
            // A restarted registry counts from zero again.
            state.version = None;
            info!(reconnect, "sync channel opened");
            if reconnect {
                effects.push(RuntimeEffect::RequestResync);
            }
        }
        DesktopAction::SnapshotReceived(message) => {
            apply_snapshot(state, interaction, message, &mut effects);
        }
        DesktopAction::ChannelLost => {
            state.connection = ConnectionStatus::Disconnected;
            info!(pending = state.pending.len(), "sync channel lost");
            state.pending.clear();
            if !interaction.is_idle() {
                push_interaction_effects(&mut effects, interaction.cancel());
            }
        }
        DesktopAction::CreateWindow { kind, title } => {
            ensure_connected(state)?;
            let correlation_id = state.next_correlation_id();
            let request = CreateWindowRequest::new(kind, title);
            send(
                state,
                &mut effects,
                OutboundCommand::CreateWindow {
                    correlation_id,
                    request,
                },
            );
        }
        DesktopAction::ToggleMinimize { window_id } => {
            ensure_connected(state)?;
            let minimized = find_window(state, &window_id)?.minimized;
            if !minimized && interaction.active_window() == Some(&window_id) {
                push_interaction_effects(&mut effects, interaction.cancel());
            }
            update_window(
                state,
                &mut effects,
                window_id,
                WindowPatch::minimized(!minimized),
            );
        }
        DesktopAction::RestoreWindow { window_id } => {
            ensure_connected(state)?;
            let minimized = find_window(state, &window_id)?.minimized;
            if minimized {
                update_window(
                    state,
                    &mut effects,
                    window_id.clone(),
                    WindowPatch::minimized(false),
                );
            }
            focus_window(state, &mut effects, window_id);
        }
        DesktopAction::CloseWindow { window_id } => {
            ensure_connected(state)?;
            find_window(state, &window_id)?;
            if interaction.active_window() == Some(&window_id) {
                push_interaction_effects(&mut effects, interaction.cancel());
            }
            let correlation_id = state.next_correlation_id();
            send(
                state,
                &mut effects,
                OutboundCommand::CloseWindow {
                    correlation_id,
                    window_id,
                },
            );
        }
        DesktopAction::FocusWindow { window_id } => {
            ensure_connected(state)?;
            find_window(state, &window_id)?;
            focus_window(state, &mut effects, window_id);
        }
        DesktopAction::EditContent { window_id, input } => {
            ensure_connected(state)?;
            let window = find_window(state, &window_id)?;
            if let Some(patch) = content_patch(window, input) {
                let text = patch.content.clone();
                let correlation_id = update_window(state, &mut effects, window_id.clone(), patch);
                // Pushes keep the locally typed text until this edit settles.
                if let Some(text) = text {
                    if let Some(record) = state
                        .snapshot
                        .as_mut()
                        .and_then(|snapshot| snapshot.window_mut(&window_id))
                    {
                        record.content = Some(text);
                    }
                    if let Some(pending) = state.pending.get_mut(&correlation_id) {
                        pending.edits_content = true;
                    }
                }
            }
        }
        DesktopAction::ToggleTheme => {
            ensure_connected(state)?;
            let theme: Theme = state.theme().toggled();
            let correlation_id = state.next_correlation_id();
            send(
                state,
                &mut effects,
                OutboundCommand::SetTheme {
                    correlation_id,
                    theme,
                },
            );
        }
        DesktopAction::BeginMove { window_id, pointer } => {
            ensure_connected(state)?;
            let origin = pointer_target(state, &window_id)?.position();
            if !interaction.is_idle() {
                debug!(window = %window_id, "ignoring press during active interaction");
                return Ok(effects);
            }
            focus_window(state, &mut effects, window_id.clone());
            push_interaction_effects(
                &mut effects,
                interaction.begin_move(window_id, pointer, origin),
            );
        }
        DesktopAction::BeginResize { window_id, pointer } => {
            ensure_connected(state)?;
            let start: Size = pointer_target(state, &window_id)?.size();
            if !interaction.is_idle() {
                debug!(window = %window_id, "ignoring press during active interaction");
                return Ok(effects);
            }
            focus_window(state, &mut effects, window_id.clone());
            push_interaction_effects(
                &mut effects,
                interaction.begin_resize(window_id, pointer, start),
            );
        }
        DesktopAction::PointerMove { pointer, now_ms } => {
            let produced = interaction.pointer_move(pointer, now_ms);
            push_geometry_sends(state, &mut effects, produced);
        }
        DesktopAction::PointerRelease => {
            let produced = interaction.release();
            push_geometry_sends(state, &mut effects, produced);
        }
        DesktopAction::PointerCancel => {
            push_interaction_effects(&mut effects, interaction.cancel());
        }
        DesktopAction::FlushPointer { now_ms } => {
            let produced = interaction.flush_due(now_ms);
            push_geometry_sends(state, &mut effects, produced);
        }
        DesktopAction::CommandSettled {
            correlation_id,
            outcome,
        } => settle_command(state, &correlation_id, outcome),
    }
    Ok(effects)
}

fn apply_snapshot(
    state: &mut DesktopState,
    interaction: &mut DragResizeController,
    message: SnapshotMessage,
    effects: &mut Vec<RuntimeEffect>,
) {
    // A receipt settles its command even when the push carrying it is stale.
    if let Some(correlation_id) = message
        .receipt
        .as_ref()
        .and_then(|receipt| receipt.correlation_id.as_deref())
    {
        state.pending.remove(correlation_id);
    }

    if let Some(current) = state.version {
        if message.version <= current {
            debug!(
                version = message.version,
                current, "ignoring stale snapshot"
            );
            return;
        }
    }

    state
        .pending
        .retain(|_, pending| !pending.is_reflected_by(message.version));

    let vanished = interaction
        .active_window()
        .is_some_and(|window_id| message.state.window(window_id).is_none());
    if vanished {
        debug!("interaction target closed remotely");
        push_interaction_effects(effects, interaction.cancel());
    }

    let mut incoming = message.state;
    keep_unsettled_edits(state, &mut incoming);

    state.version = Some(message.version);
    state.connection = ConnectionStatus::Connected;
    state.snapshot = Some(incoming);
}

fn keep_unsettled_edits(state: &DesktopState, incoming: &mut SystemState) {
    let edited = state
        .pending
        .values()
        .filter(|pending| pending.edits_content)
        .filter_map(|pending| pending.window_id.as_ref());
    for window_id in edited {
        let local = state.window(window_id).and_then(|window| window.content.clone());
        if let (Some(text), Some(record)) = (local, incoming.window_mut(window_id)) {
            record.content = Some(text);
        }
    }
}

fn settle_command(
    state: &mut DesktopState,
    correlation_id: &str,
    outcome: Result<CommandAck, String>,
) {
    let last_seen = state.version;
    let Some(pending) = state.pending.get_mut(correlation_id) else {
        return;
    };
    match outcome {
        Ok(ack)
            if matches!(ack.outcome, CommandOutcome::Applied)
                && last_seen.map_or(true, |version| version < ack.version) =>
        {
            // Applied but not pushed yet; the push that reaches `ack.version` clears it.
            pending.acked_version = Some(ack.version);
            return;
        }
        Ok(ack) => debug!(correlation_id, outcome = ?ack.outcome, "command settled"),
        Err(err) => warn!(correlation_id, error = %err, "command failed"),
    }
    state.pending.remove(correlation_id);
}

fn ensure_connected(state: &DesktopState) -> Result<(), ReducerError> {
    if state.is_connected() {
        Ok(())
    } else {
        Err(ReducerError::Disconnected)
    }
}

fn find_window<'a>(
    state: &'a DesktopState,
    window_id: &WindowId,
) -> Result<&'a WindowRecord, ReducerError> {
    state
        .window(window_id)
        .ok_or_else(|| ReducerError::WindowNotFound(window_id.clone()))
}

fn pointer_target<'a>(
    state: &'a DesktopState,
    window_id: &WindowId,
) -> Result<&'a WindowRecord, ReducerError> {
    let window = find_window(state, window_id)?;
    if window.minimized {
        return Err(ReducerError::WindowMinimized(window_id.clone()));
    }
    Ok(window)
}

fn send(state: &mut DesktopState, effects: &mut Vec<RuntimeEffect>, command: OutboundCommand) {
    state.pending.insert(
        command.correlation_id().to_string(),
        PendingCommand {
            kind: command.kind(),
            window_id: command.window_id().cloned(),
            edits_content: false,
            acked_version: None,
        },
    );
    effects.push(RuntimeEffect::SendCommand(command));
}

fn update_window(
    state: &mut DesktopState,
    effects: &mut Vec<RuntimeEffect>,
    window_id: WindowId,
    patch: WindowPatch,
) -> String {
    let correlation_id = state.next_correlation_id();
    send(
        state,
        effects,
        OutboundCommand::UpdateWindow {
            correlation_id: correlation_id.clone(),
            window_id,
            patch,
        },
    );
    correlation_id
}

fn focus_window(state: &mut DesktopState, effects: &mut Vec<RuntimeEffect>, window_id: WindowId) {
    // Raising the current top window would only bump the version.
    let already_top = state
        .snapshot
        .as_ref()
        .and_then(|snapshot| snapshot.windows.last())
        .is_some_and(|top| top.id == window_id);
    if already_top {
        return;
    }
    let correlation_id = state.next_correlation_id();
    send(
        state,
        effects,
        OutboundCommand::FocusWindow {
            correlation_id,
            window_id,
        },
    );
}

fn push_interaction_effects(effects: &mut Vec<RuntimeEffect>, produced: Vec<InteractionEffect>) {
    for effect in produced {
        match effect {
            InteractionEffect::AcquirePointerListeners => {
                effects.push(RuntimeEffect::AcquirePointerListeners)
            }
            InteractionEffect::ReleasePointerListeners => {
                effects.push(RuntimeEffect::ReleasePointerListeners)
            }
            InteractionEffect::ScheduleFlush { delay_ms } => {
                effects.push(RuntimeEffect::ScheduleFlush { delay_ms })
            }
            // Callers that can send route through `push_geometry_sends`.
            InteractionEffect::Send(update) => {
                debug!(window = %update.window_id(), "dropping geometry update");
            }
        }
    }
}

fn push_geometry_sends(
    state: &mut DesktopState,
    effects: &mut Vec<RuntimeEffect>,
    produced: Vec<InteractionEffect>,
) {
    for effect in produced {
        match effect {
            InteractionEffect::Send(update) => {
                let (window_id, patch) = update.into_patch();
                if state.is_connected() {
                    update_window(state, effects, window_id, patch);
                }
            }
            InteractionEffect::AcquirePointerListeners => {
                effects.push(RuntimeEffect::AcquirePointerListeners)
            }
            InteractionEffect::ReleasePointerListeners => {
                effects.push(RuntimeEffect::ReleasePointerListeners)
            }
            InteractionEffect::ScheduleFlush { delay_ms } => {
                effects.push(RuntimeEffect::ScheduleFlush { delay_ms })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use desktop_sync_contract::{
        window_types, CommandKind, CommandOutcome, CommandReceipt, Point, SystemState,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(id: &str, x: i32, y: i32) -> WindowRecord {
        WindowRecord {
            id: WindowId::new(id),
            title: id.to_string(),
            kind: window_types::BROWSER.to_string(),
            x,
            y,
            width: 600,
            height: 400,
            minimized: false,
            content: None,
        }
    }

    fn push(version: u64, windows: Vec<WindowRecord>) -> SnapshotMessage {
        SnapshotMessage {
            version,
            state: SystemState {
                windows,
                ..SystemState::default()
            },
            receipt: None,
        }
    }

    fn connected(windows: Vec<WindowRecord>) -> (DesktopState, DragResizeController) {
        let mut state = DesktopState::default();
        let mut interaction = DragResizeController::new(0);
        reduce_desktop(&mut state, &mut interaction, DesktopAction::ChannelOpened)
            .expect("open");
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(1, windows)),
        )
        .expect("snapshot");
        (state, interaction)
    }

    fn commands(effects: &[RuntimeEffect]) -> Vec<OutboundCommand> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                RuntimeEffect::SendCommand(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn stale_snapshots_are_ignored() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(3, vec![record("window-1", 30, 30)])),
        )
        .expect("newer");
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(2, vec![record("window-1", 20, 20)])),
        )
        .expect("older");

        assert_eq!(state.version, Some(3));
        let window = state.window(&WindowId::new("window-1")).expect("window");
        assert_eq!((window.x, window.y), (30, 30));
    }

    #[test]
    fn reconnect_accepts_restarted_registry_snapshot() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        reduce_desktop(&mut state, &mut interaction, DesktopAction::ChannelLost).expect("lost");
        assert!(state.is_stale());

        let effects = reduce_desktop(&mut state, &mut interaction, DesktopAction::ChannelOpened)
            .expect("reopen");
        assert_eq!(effects, vec![RuntimeEffect::RequestResync]);
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(0, Vec::new())),
        )
        .expect("fresh");

        assert_eq!(state.version, Some(0));
        assert!(state.snapshot.as_ref().expect("snapshot").windows.is_empty());
    }

    #[test]
    fn mutations_are_refused_while_disconnected() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        reduce_desktop(&mut state, &mut interaction, DesktopAction::ChannelLost).expect("lost");
        let before = state.clone();

        let err = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: WindowId::new("window-1"),
                pointer: PointerPosition { x: 5, y: 5 },
            },
        )
        .expect_err("refused");
        assert_eq!(err, ReducerError::Disconnected);
        assert_eq!(state, before);
        assert!(interaction.is_idle());

        let effects = reduce_desktop(&mut state, &mut interaction, DesktopAction::PointerRelease)
            .expect("release always succeeds");
        assert_eq!(effects, vec![RuntimeEffect::ReleasePointerListeners]);
    }

    #[test]
    fn drag_focuses_then_sends_anchor_relative_positions() {
        let (mut state, mut interaction) =
            connected(vec![record("window-1", 100, 100), record("window-2", 0, 0)]);
        let target = WindowId::new("window-1");

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: target.clone(),
                pointer: PointerPosition { x: 110, y: 105 },
            },
        )
        .expect("begin");
        assert!(matches!(
            effects.as_slice(),
            [
                RuntimeEffect::SendCommand(OutboundCommand::FocusWindow { .. }),
                RuntimeEffect::AcquirePointerListeners
            ]
        ));

        // A push for another window mid-drag must not disturb the anchor.
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(
                2,
                vec![record("window-2", 400, 400), record("window-1", 100, 100)],
            )),
        )
        .expect("push");

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::PointerMove {
                pointer: PointerPosition { x: 210, y: 305 },
                now_ms: 1,
            },
        )
        .expect("move");
        assert!(matches!(
            commands(&effects).as_slice(),
            [OutboundCommand::UpdateWindow { window_id, patch, .. }]
                if window_id == &target && patch == &WindowPatch::position(Point { x: 200, y: 300 })
        ));
        assert_eq!(
            interaction.optimistic_position(&target),
            Some(Point { x: 200, y: 300 })
        );

        let effects = reduce_desktop(&mut state, &mut interaction, DesktopAction::PointerRelease)
            .expect("release");
        assert_eq!(effects, vec![RuntimeEffect::ReleasePointerListeners]);
    }

    #[test]
    fn window_closed_remotely_mid_drag_releases_listeners() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: WindowId::new("window-1"),
                pointer: PointerPosition { x: 1, y: 1 },
            },
        )
        .expect("begin");

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(2, Vec::new())),
        )
        .expect("push");
        assert_eq!(effects, vec![RuntimeEffect::ReleasePointerListeners]);
        assert!(interaction.is_idle());
    }

    #[test]
    fn minimize_toggles_and_receipts_clear_pending() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        let target = WindowId::new("window-1");

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::ToggleMinimize {
                window_id: target.clone(),
            },
        )
        .expect("minimize");
        let sent = commands(&effects);
        assert_eq!(
            sent,
            vec![OutboundCommand::UpdateWindow {
                correlation_id: "c-1".to_string(),
                window_id: target.clone(),
                patch: WindowPatch::minimized(true),
            }]
        );
        assert!(state.pending.contains_key("c-1"));

        let mut minimized = record("window-1", 0, 0);
        minimized.minimized = true;
        let mut message = push(2, vec![minimized]);
        message.receipt = Some(CommandReceipt {
            correlation_id: Some("c-1".to_string()),
            command: CommandKind::UpdateWindow,
            window_id: Some(target.clone()),
            outcome: CommandOutcome::Applied,
        });
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(message),
        )
        .expect("push");

        assert!(state.pending.is_empty());
        assert!(state.window(&target).expect("still present").minimized);

        let err = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::BeginResize {
                window_id: target,
                pointer: PointerPosition { x: 0, y: 0 },
            },
        )
        .expect_err("minimized windows have no pointer target");
        assert!(matches!(err, ReducerError::WindowMinimized(_)));
    }

    #[test]
    fn toggle_theme_requests_the_other_value() {
        let (mut state, mut interaction) = connected(Vec::new());
        let effects = reduce_desktop(&mut state, &mut interaction, DesktopAction::ToggleTheme)
            .expect("toggle");
        assert!(matches!(
            commands(&effects).as_slice(),
            [OutboundCommand::SetTheme { theme: Theme::WindowsXp, .. }]
        ));
    }

    #[test]
    fn editing_text_updates_locally_and_sends_content() {
        let mut editor = record("window-1", 0, 0);
        editor.kind = window_types::TEXT_EDITOR.to_string();
        editor.content = Some("a".to_string());
        let (mut state, mut interaction) = connected(vec![editor]);
        let target = WindowId::new("window-1");

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::EditContent {
                window_id: target.clone(),
                input: ContentInput::TextChanged("ab".to_string()),
            },
        )
        .expect("edit");

        assert_eq!(commands(&effects).len(), 1);
        assert_eq!(
            state.window(&target).and_then(|w| w.content.as_deref()),
            Some("ab")
        );
    }

    fn ack(outcome: CommandOutcome, version: u64) -> CommandAck {
        CommandAck {
            correlation_id: None,
            outcome,
            version,
            window_id: None,
        }
    }

    fn minimize(state: &mut DesktopState, interaction: &mut DragResizeController) {
        reduce_desktop(
            state,
            interaction,
            DesktopAction::ToggleMinimize {
                window_id: WindowId::new("window-1"),
            },
        )
        .expect("minimize");
    }

    #[test]
    fn not_found_acks_and_transport_errors_clear_pending() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        minimize(&mut state, &mut interaction);
        minimize(&mut state, &mut interaction);
        assert_eq!(state.pending.len(), 2);

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::CommandSettled {
                correlation_id: "c-1".to_string(),
                outcome: Ok(ack(CommandOutcome::NotFound, 1)),
            },
        )
        .expect("not found");
        assert!(effects.is_empty());
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::CommandSettled {
                correlation_id: "c-2".to_string(),
                outcome: Err("gateway returned 400".to_string()),
            },
        )
        .expect("rejected");

        assert!(state.pending.is_empty());
    }

    #[test]
    fn applied_ack_clears_once_a_push_reaches_its_version() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        minimize(&mut state, &mut interaction);
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::CommandSettled {
                correlation_id: "c-1".to_string(),
                outcome: Ok(ack(CommandOutcome::Applied, 5)),
            },
        )
        .expect("applied");
        assert_eq!(
            state.pending.get("c-1").and_then(|pending| pending.acked_version),
            Some(5)
        );

        // Lag and resync snapshots carry no receipt.
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(4, vec![record("window-1", 0, 0)])),
        )
        .expect("older push");
        assert!(state.pending.contains_key("c-1"));
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(7, vec![record("window-1", 0, 0)])),
        )
        .expect("resync push");
        assert!(state.pending.is_empty());
    }

    #[test]
    fn applied_ack_behind_local_version_clears_immediately() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        minimize(&mut state, &mut interaction);
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(3, vec![record("window-1", 0, 0)])),
        )
        .expect("push");
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::CommandSettled {
                correlation_id: "c-1".to_string(),
                outcome: Ok(ack(CommandOutcome::Applied, 2)),
            },
        )
        .expect("late ack");
        assert!(state.pending.is_empty());
    }

    #[test]
    fn receipt_on_stale_push_still_settles_command() {
        let (mut state, mut interaction) = connected(vec![record("window-1", 0, 0)]);
        minimize(&mut state, &mut interaction);
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(3, vec![record("window-1", 0, 0)])),
        )
        .expect("newer");

        let mut late = push(2, vec![record("window-1", 50, 50)]);
        late.receipt = Some(CommandReceipt {
            correlation_id: Some("c-1".to_string()),
            command: CommandKind::UpdateWindow,
            window_id: Some(WindowId::new("window-1")),
            outcome: CommandOutcome::Applied,
        });
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(late),
        )
        .expect("stale");

        assert!(state.pending.is_empty());
        assert_eq!(state.version, Some(3));
        let window = state.window(&WindowId::new("window-1")).expect("window");
        assert_eq!((window.x, window.y), (0, 0));
    }

    #[test]
    fn held_drag_sample_is_sent_when_the_flush_timer_fires() {
        let (mut state, _) = connected(vec![record("window-1", 0, 0)]);
        let mut interaction = DragResizeController::new(16);
        let target = WindowId::new("window-1");
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: target.clone(),
                pointer: PointerPosition { x: 0, y: 0 },
            },
        )
        .expect("begin");
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::PointerMove {
                pointer: PointerPosition { x: 5, y: 5 },
                now_ms: 0,
            },
        )
        .expect("first move");

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::PointerMove {
                pointer: PointerPosition { x: 9, y: 9 },
                now_ms: 4,
            },
        )
        .expect("held move");
        assert_eq!(effects, vec![RuntimeEffect::ScheduleFlush { delay_ms: 12 }]);

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::FlushPointer { now_ms: 16 },
        )
        .expect("flush");
        assert!(matches!(
            commands(&effects).as_slice(),
            [OutboundCommand::UpdateWindow { window_id, patch, .. }]
                if window_id == &target && patch == &WindowPatch::position(Point { x: 9, y: 9 })
        ));
        assert!(!interaction.is_idle());
    }

    #[test]
    fn pushes_keep_typed_text_until_the_edit_settles() {
        let mut editor = record("window-1", 0, 0);
        editor.kind = window_types::TEXT_EDITOR.to_string();
        editor.content = Some("a".to_string());
        let (mut state, mut interaction) = connected(vec![editor.clone()]);
        let target = WindowId::new("window-1");
        let with_text = |text: &str| {
            let mut window = editor.clone();
            window.content = Some(text.to_string());
            window
        };

        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::EditContent {
                window_id: target.clone(),
                input: ContentInput::TextChanged("ab".to_string()),
            },
        )
        .expect("edit");

        // Someone else moved a window; the push still carries the old text.
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(2, vec![with_text("a")])),
        )
        .expect("intervening push");
        assert_eq!(
            state.window(&target).and_then(|w| w.content.as_deref()),
            Some("ab")
        );

        let mut confirmed = push(3, vec![with_text("ab")]);
        confirmed.receipt = Some(CommandReceipt {
            correlation_id: Some("c-1".to_string()),
            command: CommandKind::UpdateWindow,
            window_id: Some(target.clone()),
            outcome: CommandOutcome::Applied,
        });
        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(confirmed),
        )
        .expect("receipt");
        assert!(state.pending.is_empty());

        reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::SnapshotReceived(push(4, vec![with_text("abc")])),
        )
        .expect("remote edit");
        assert_eq!(
            state.window(&target).and_then(|w| w.content.as_deref()),
            Some("abc")
        );
    }

    #[test]
    fn unknown_window_is_reported() {
        let (mut state, mut interaction) = connected(Vec::new());
        let err = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::CloseWindow {
                window_id: WindowId::new("window-9"),
            },
        )
        .expect_err("missing");
        assert_eq!(err, ReducerError::WindowNotFound(WindowId::new("window-9")));
    }
}
