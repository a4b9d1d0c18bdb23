use desktop_runtime::{
    DesktopAction, DesktopController, MemoryCommandTransport, NoopCommandTransport,
    OutboundCommand, PointerPosition, RuntimeEffect,
};
use desktop_sync_contract::{
    window_types, CommandKind, CommandOutcome, CommandReceipt, Point, SnapshotMessage, SystemState,
    WindowId, WindowPatch, WindowRecord,
};
use futures::executor::block_on;
use pretty_assertions::assert_eq;

fn editor(x: i32, y: i32) -> WindowRecord {
    WindowRecord {
        id: WindowId::new("window-1"),
        title: "Text Editor".to_string(),
        kind: window_types::TEXT_EDITOR.to_string(),
        x,
        y,
        width: 600,
        height: 400,
        minimized: false,
        content: Some("hi".to_string()),
    }
}

fn snapshot(
    version: u64,
    windows: Vec<WindowRecord>,
    correlation_id: Option<&str>,
) -> SnapshotMessage {
    SnapshotMessage {
        version,
        state: SystemState {
            windows,
            ..SystemState::default()
        },
        receipt: correlation_id.map(|id| CommandReceipt {
            correlation_id: Some(id.to_string()),
            command: CommandKind::UpdateWindow,
            window_id: Some(WindowId::new("window-1")),
            outcome: CommandOutcome::Applied,
        }),
    }
}

fn connected(min_send_interval_ms: u64) -> DesktopController {
    let mut controller = DesktopController::new(min_send_interval_ms);
    controller.dispatch(DesktopAction::ChannelOpened).expect("open");
    controller
        .dispatch(DesktopAction::SnapshotReceived(snapshot(1, vec![editor(100, 100)], None)))
        .expect("snapshot");
    controller
}

#[test]
fn coalesced_drag_delivers_final_position_and_converges_on_push() {
    let transport = MemoryCommandTransport::default();
    let mut controller = connected(16);

    let target = WindowId::new("window-1");
    let effects = controller
        .dispatch(DesktopAction::BeginMove {
            window_id: target.clone(),
            pointer: PointerPosition { x: 120, y: 110 },
        })
        .expect("begin");
    assert_eq!(effects, vec![RuntimeEffect::AcquirePointerListeners]);

    for (now_ms, x) in [(0_u64, 130), (5, 140), (10, 150)] {
        let effects = controller
            .dispatch(DesktopAction::PointerMove {
                pointer: PointerPosition { x, y: 110 },
                now_ms,
            })
            .expect("move");
        block_on(controller.execute(&transport, effects));
    }
    let effects = controller
        .dispatch(DesktopAction::PointerRelease)
        .expect("release");
    let remaining = block_on(controller.execute(&transport, effects));
    assert_eq!(remaining, vec![RuntimeEffect::ReleasePointerListeners]);

    let sent = transport.sent();
    let positions: Vec<_> = sent
        .iter()
        .filter_map(|command| match command {
            OutboundCommand::UpdateWindow { patch, .. } => Some(patch.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        positions,
        vec![
            WindowPatch::position(Point { x: 110, y: 100 }),
            WindowPatch::position(Point { x: 130, y: 100 }),
        ]
    );

    let last_id = sent.last().expect("sent").correlation_id().to_string();
    controller
        .dispatch(DesktopAction::SnapshotReceived(snapshot(
            3,
            vec![editor(130, 100)],
            Some(&last_id),
        )))
        .expect("push");

    let view = controller.view();
    assert_eq!((view.windows[0].x, view.windows[0].y), (130, 100));
    assert!(controller.state().pending.is_empty());
    assert!(controller.interaction().is_idle());
}

#[test]
fn failed_delivery_settles_the_pending_command() {
    let mut controller = connected(0);
    let effects = controller
        .dispatch(DesktopAction::CreateWindow {
            kind: window_types::TEXT_EDITOR.to_string(),
            title: "Notes".to_string(),
        })
        .expect("create");
    assert_eq!(controller.state().pending.len(), 1);

    let remaining = block_on(controller.execute(&NoopCommandTransport, effects));

    assert!(remaining.is_empty());
    assert!(controller.state().pending.is_empty());
}
