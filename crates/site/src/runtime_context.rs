//! Runtime provider and context wiring for the desktop shell.
//!
//! This module owns the reactive copy of the reducer state, the runtime effect queue, and the
//! push-channel connection. UI composition stays in [`crate::components`].

use desktop_runtime::{
    reduce_desktop, DesktopAction, DesktopState, DragResizeController, RuntimeEffect,
    DEFAULT_MIN_SEND_INTERVAL_MS,
};
use leptos::{leptos_dom::helpers::WindowListenerHandle, *};

use crate::{
    effect_executor,
    sync_channel::{self, ChannelSlot},
    transport::FetchCommandTransport,
};

#[derive(Clone, Copy)]
/// Leptos context for reading desktop state and dispatching [`DesktopAction`] values.
pub struct DesktopRuntimeContext {
    /// Gateway command delivery.
    pub transport: StoredValue<FetchCommandTransport>,
    /// Reactive reducer state.
    pub state: RwSignal<DesktopState>,
    /// Reactive pointer drag/resize state.
    pub interaction: RwSignal<DragResizeController>,
    /// Queue of runtime effects emitted by the reducer and drained by the effect executor.
    pub effects: RwSignal<Vec<RuntimeEffect>>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<DesktopAction>,
    pub(crate) channel: StoredValue<ChannelSlot>,
    pub(crate) pointer_listeners: StoredValue<Vec<WindowListenerHandle>>,
}

impl DesktopRuntimeContext {
    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: DesktopAction) {
        self.dispatch.call(action);
    }
}

#[component]
/// Provides [`DesktopRuntimeContext`] to descendant components and connects to the sync server.
pub fn DesktopProvider(
    /// Base URL of the sync server, e.g. `http://localhost:3001`.
    server_url: String,
    children: Children,
) -> impl IntoView {
    let transport = store_value(FetchCommandTransport::new(server_url));
    let state = create_rw_signal(DesktopState::default());
    let interaction = create_rw_signal(DragResizeController::new(DEFAULT_MIN_SEND_INTERVAL_MS));
    let effects = create_rw_signal(Vec::<RuntimeEffect>::new());

    let dispatch = Callback::new(move |action: DesktopAction| {
        let mut desktop = state.get_untracked();
        let mut ui = interaction.get_untracked();
        let previous_desktop = desktop.clone();
        let previous_ui = ui.clone();

        match reduce_desktop(&mut desktop, &mut ui, action) {
            Ok(new_effects) => {
                if desktop != previous_desktop {
                    state.set(desktop);
                }
                if ui != previous_ui {
                    interaction.set(ui);
                }
                if !new_effects.is_empty() {
                    let mut queue = effects.get_untracked();
                    queue.extend(new_effects);
                    effects.set(queue);
                }
            }
            Err(err) => logging::warn!("desktop reducer error: {err}"),
        }
    });

    let runtime = DesktopRuntimeContext {
        transport,
        state,
        interaction,
        effects,
        dispatch,
        channel: store_value(ChannelSlot::default()),
        pointer_listeners: store_value(Vec::new()),
    };

    provide_context(runtime);

    effect_executor::install(runtime);
    sync_channel::connect(runtime);
    on_cleanup(move || {
        sync_channel::shutdown(runtime);
        effect_executor::release_pointer_listeners(runtime);
    });

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}
