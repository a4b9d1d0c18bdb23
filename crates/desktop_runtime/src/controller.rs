//! Owned reducer container for hosts that do not bring their own reactive store.

use tracing::debug;

use crate::{
    host::{deliver, CommandTransport},
    interaction::DragResizeController,
    model::DesktopState,
    reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect},
    view::{render_desktop, DesktopView},
};

#[derive(Debug, Clone, Default)]
/// Top-level client aggregate: last accepted snapshot plus the pointer interaction.
pub struct DesktopController {
    state: DesktopState,
    interaction: DragResizeController,
}

impl DesktopController {
    /// Creates a controller whose drag sends are spaced at least `min_send_interval_ms` apart.
    pub fn new(min_send_interval_ms: u64) -> Self {
        Self {
            state: DesktopState::default(),
            interaction: DragResizeController::new(min_send_interval_ms),
        }
    }

    /// Applies `action`, returning the effects the host must execute.
    ///
    /// # Errors
    ///
    /// Propagates [`ReducerError`]; state is unchanged on error.
    pub fn dispatch(&mut self, action: DesktopAction) -> Result<Vec<RuntimeEffect>, ReducerError> {
        reduce_desktop(&mut self.state, &mut self.interaction, action)
    }

    /// Delivers the [`RuntimeEffect::SendCommand`]s in `effects` one by one and settles each with
    /// its acknowledgment. The other effects are returned for the host.
    pub async fn execute<T>(
        &mut self,
        transport: &T,
        effects: Vec<RuntimeEffect>,
    ) -> Vec<RuntimeEffect>
    where
        T: CommandTransport + ?Sized,
    {
        let mut remaining = Vec::new();
        for effect in effects {
            let command = match effect {
                RuntimeEffect::SendCommand(command) => command,
                other => {
                    remaining.push(other);
                    continue;
                }
            };
            match self.dispatch(deliver(transport, &command).await) {
                Ok(more) => remaining.extend(more),
                Err(err) => debug!(error = %err, "settle rejected"),
            }
        }
        remaining
    }

    /// Returns the reducer state.
    pub fn state(&self) -> &DesktopState {
        &self.state
    }

    /// Returns the pointer interaction state.
    pub fn interaction(&self) -> &DragResizeController {
        &self.interaction
    }

    /// Builds the current render model.
    pub fn view(&self) -> DesktopView {
        render_desktop(&self.state, &self.interaction)
    }
}
