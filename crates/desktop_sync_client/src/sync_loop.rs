//! Push-channel follower with capped exponential reconnect.

use std::future::Future;

use desktop_runtime::{Backoff, DesktopAction, DesktopController, DesktopView, RuntimeEffect};
use desktop_sync_contract::{ClientMessage, SnapshotMessage};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::{error::SyncClientError, url::sync_url};

/// Follows the push channel until `shutdown` resolves, calling `on_view` after every accepted
/// change.
///
/// Connection failures never end the loop; they mark the desktop disconnected and reconnect after
/// a capped exponential delay.
///
/// # Errors
///
/// Returns [`SyncClientError::InvalidUrl`] when `server_url` cannot be turned into a push URL.
pub async fn follow<F>(
    server_url: &str,
    controller: &mut DesktopController,
    mut on_view: F,
    shutdown: impl Future<Output = ()>,
) -> Result<(), SyncClientError>
where
    F: FnMut(&DesktopView),
{
    let url = sync_url(server_url)?;
    let mut backoff = Backoff::default();
    tokio::pin!(shutdown);

    loop {
        let session = run_session(&url, controller, &mut on_view, &mut backoff);
        tokio::select! {
            _ = &mut shutdown => {
                info!("sync loop stopping");
                return Ok(());
            }
            result = session => {
                if let Err(err) = result {
                    warn!(error = %err, "sync channel dropped");
                }
            }
        }

        if let Err(err) = controller.dispatch(DesktopAction::ChannelLost) {
            debug!(error = %err, "channel-lost action rejected");
        }
        on_view(&controller.view());

        let delay = backoff.next_delay();
        info!(?delay, "reconnecting");
        tokio::select! {
            _ = &mut shutdown => {
                info!("sync loop stopping");
                return Ok(());
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn run_session<F>(
    url: &str,
    controller: &mut DesktopController,
    on_view: &mut F,
    backoff: &mut Backoff,
) -> Result<(), SyncClientError>
where
    F: FnMut(&DesktopView),
{
    let (socket, _) = connect_async(url).await?;
    let (mut sender, mut receiver) = socket.split();
    info!(%url, "sync channel connected");
    backoff.reset();

    let effects = controller
        .dispatch(DesktopAction::ChannelOpened)
        .unwrap_or_default();
    if effects.contains(&RuntimeEffect::RequestResync) {
        let resync = serde_json::to_string(&ClientMessage::Resync)?;
        sender.send(Message::Text(resync)).await?;
    }

    while let Some(frame) = receiver.next().await {
        match frame? {
            Message::Text(text) => {
                let message = match serde_json::from_str::<SnapshotMessage>(&text) {
                    Ok(message) => message,
                    Err(err) => {
                        warn!(error = %err, "dropping malformed push");
                        continue;
                    }
                };
                let version = message.version;
                let before = controller.state().version;
                if let Err(err) = controller.dispatch(DesktopAction::SnapshotReceived(message)) {
                    warn!(error = %err, "snapshot rejected");
                    continue;
                }
                if controller.state().version != before {
                    debug!(version, "snapshot applied");
                    on_view(&controller.view());
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    Err(SyncClientError::ChannelLost)
}
