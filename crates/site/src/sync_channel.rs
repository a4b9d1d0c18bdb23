//! Browser side of the push channel: connect, decode pushes, reconnect with backoff.

use desktop_runtime::{Backoff, DesktopAction};
use desktop_sync_contract::{sync_url, ClientMessage, SnapshotMessage};
use leptos::*;

use crate::{
    interop::{self, SyncSocket, SyncSocketHandlers},
    runtime_context::DesktopRuntimeContext,
};

#[derive(Default)]
pub(crate) struct ChannelSlot {
    socket: Option<SyncSocket>,
    backoff: Backoff,
    shut_down: bool,
}

/// Opens the push channel and wires its events into the reducer.
pub fn connect(runtime: DesktopRuntimeContext) {
    let base = runtime.transport.with_value(|transport| transport.base().to_string());
    let url = match sync_url(&base) {
        Ok(url) => url,
        Err(err) => {
            logging::warn!("sync channel disabled: {err}");
            runtime.dispatch_action(DesktopAction::ChannelLost);
            return;
        }
    };

    let handlers = SyncSocketHandlers {
        on_open: Box::new(move || {
            runtime.channel.try_update_value(|slot| slot.backoff.reset());
            logging::log!("sync channel connected");
            runtime.dispatch_action(DesktopAction::ChannelOpened);
        }),
        on_text: Box::new(move |text| match serde_json::from_str::<SnapshotMessage>(&text) {
            Ok(message) => runtime.dispatch_action(DesktopAction::SnapshotReceived(message)),
            Err(err) => logging::warn!("dropping malformed push: {err}"),
        }),
        on_close: Box::new(move || {
            runtime.dispatch_action(DesktopAction::ChannelLost);
            schedule_reconnect(runtime);
        }),
    };

    match interop::open_sync_socket(&url, handlers) {
        Ok(socket) => {
            runtime.channel.try_update_value(|slot| slot.socket = Some(socket));
        }
        Err(err) => {
            logging::warn!("sync channel failed to open: {err}");
            runtime.dispatch_action(DesktopAction::ChannelLost);
            schedule_reconnect(runtime);
        }
    }
}

fn schedule_reconnect(runtime: DesktopRuntimeContext) {
    let delay = runtime.channel.try_update_value(|slot| {
        (!slot.shut_down).then(|| slot.backoff.next_delay())
    });
    let Some(delay) = delay.flatten() else {
        return;
    };

    logging::log!("sync channel reconnecting in {} ms", delay.as_millis());
    set_timeout(
        move || {
            let live = runtime
                .channel
                .try_update_value(|slot| {
                    slot.socket = None;
                    !slot.shut_down
                })
                .unwrap_or(false);
            if live {
                connect(runtime);
            }
        },
        delay,
    );
}

/// Asks the server for a fresh snapshot over the open socket.
pub fn request_resync(runtime: DesktopRuntimeContext) {
    let frame = match serde_json::to_string(&ClientMessage::Resync) {
        Ok(frame) => frame,
        Err(err) => {
            logging::warn!("resync encode failed: {err}");
            return;
        }
    };
    runtime.channel.try_with_value(|slot| {
        if let Some(Err(err)) = slot.socket.as_ref().map(|socket| socket.send_text(&frame)) {
            logging::warn!("resync request failed: {err}");
        }
    });
}

/// Closes the socket and stops reconnecting.
pub fn shutdown(runtime: DesktopRuntimeContext) {
    runtime.channel.try_update_value(|slot| {
        slot.shut_down = true;
        slot.socket = None;
    });
}
