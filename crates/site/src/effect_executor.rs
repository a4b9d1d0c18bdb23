//! Explicit runtime effect-queue executor for reducer-emitted side effects.

use std::time::Duration;

use desktop_runtime::{deliver, DesktopAction, PointerPosition, RuntimeEffect};
use leptos::*;

use crate::{interop, runtime_context::DesktopRuntimeContext, sync_channel};

/// Installs the effect executor that drains reducer-emitted runtime effects in order.
pub fn install(runtime: DesktopRuntimeContext) {
    // Clear the queue before running so effects that dispatch enqueue a fresh batch.
    create_effect(move |_| {
        let queued = runtime.effects.get();
        if queued.is_empty() {
            return;
        }

        runtime.effects.set(Vec::new());

        for effect in queued {
            run_runtime_effect(runtime, effect);
        }
    });
}

fn run_runtime_effect(runtime: DesktopRuntimeContext, effect: RuntimeEffect) {
    match effect {
        RuntimeEffect::SendCommand(command) => {
            let transport = runtime.transport.get_value();
            spawn_local(async move {
                let settled = deliver(&transport, &command).await;
                if let DesktopAction::CommandSettled {
                    correlation_id,
                    outcome: Err(err),
                } = &settled
                {
                    logging::warn!("command {correlation_id} failed: {err}");
                }
                runtime.dispatch_action(settled);
            });
        }
        RuntimeEffect::AcquirePointerListeners => acquire_pointer_listeners(runtime),
        RuntimeEffect::ReleasePointerListeners => release_pointer_listeners(runtime),
        RuntimeEffect::RequestResync => sync_channel::request_resync(runtime),
        RuntimeEffect::ScheduleFlush { delay_ms } => set_timeout(
            move || {
                runtime.dispatch_action(DesktopAction::FlushPointer {
                    now_ms: interop::now_ms(),
                });
            },
            Duration::from_millis(delay_ms),
        ),
    }
}

fn acquire_pointer_listeners(runtime: DesktopRuntimeContext) {
    release_pointer_listeners(runtime);

    let on_move = window_event_listener(ev::pointermove, move |ev| {
        runtime.dispatch_action(DesktopAction::PointerMove {
            pointer: PointerPosition {
                x: ev.client_x(),
                y: ev.client_y(),
            },
            now_ms: interop::now_ms(),
        });
    });
    let on_release = window_event_listener(ev::pointerup, move |_| {
        runtime.dispatch_action(DesktopAction::PointerRelease);
    });
    let on_cancel = window_event_listener(ev::pointercancel, move |_| {
        runtime.dispatch_action(DesktopAction::PointerCancel);
    });
    let on_blur = window_event_listener(ev::blur, move |_| {
        runtime.dispatch_action(DesktopAction::PointerCancel);
    });

    runtime
        .pointer_listeners
        .update_value(|handles| handles.extend([on_move, on_release, on_cancel, on_blur]));
}

/// Removes the global pointer listeners, if any are installed.
pub fn release_pointer_listeners(runtime: DesktopRuntimeContext) {
    runtime.pointer_listeners.try_update_value(|handles| {
        for handle in handles.drain(..) {
            handle.remove();
        }
    });
}
