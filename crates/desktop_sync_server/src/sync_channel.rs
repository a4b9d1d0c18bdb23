//! Snapshot push channel.
//!
//! Each connection receives the full state on connect and after every committed mutation. The
//! only inbound message is a resync request; anything else is logged and dropped.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use desktop_sync_contract::{ClientMessage, SnapshotMessage};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, error, info, warn};

use crate::registry::WindowRegistry;

const RESYNC_QUEUE: usize = 8;

/// Upgrades the request and starts a push session.
pub async fn handle_websocket(
    State(registry): State<Arc<WindowRegistry>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(registry, socket))
}

async fn handle_socket(registry: Arc<WindowRegistry>, socket: WebSocket) {
    let session = registry.next_session_id();
    let (mut sender, mut receiver) = socket.split();
    let (initial, mut updates) = registry.subscribe();
    info!(
        session,
        version = initial.version,
        subscribers = registry.subscriber_count(),
        "sync channel opened"
    );

    let (resync_tx, mut resync_rx) = mpsc::channel::<()>(RESYNC_QUEUE);
    let push_registry = Arc::clone(&registry);
    let push_task = tokio::spawn(async move {
        if send_snapshot(&mut sender, &initial).await.is_err() {
            return;
        }
        loop {
            let outgoing = tokio::select! {
                update = updates.recv() => match next_push(&push_registry, session, update) {
                    Some(snapshot) => snapshot,
                    None => break,
                },
                request = resync_rx.recv() => match request {
                    Some(()) => Arc::new(push_registry.snapshot()),
                    None => break,
                },
            };
            if send_snapshot(&mut sender, &outgoing).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                warn!(session, error = %err, "sync channel error");
                break;
            }
        };

        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Resync) => {
                    debug!(session, "resync requested");
                    if resync_tx.try_send(()).is_err() {
                        debug!(session, "resync already queued");
                    }
                }
                Err(err) => {
                    warn!(session, error = %err, text = %text, "dropping malformed client message");
                }
            },
            Message::Binary(bytes) => {
                warn!(session, len = bytes.len(), "dropping binary frame");
            }
            Message::Close(_) => {
                debug!(session, "sync channel closed by peer");
                break;
            }
            // Ping/pong replies are handled by axum.
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    push_task.abort();
    info!(session, "sync channel closed");
}

/// Picks the snapshot to push for a broadcast result; `None` once the registry is gone.
///
/// A lagging subscriber skips the missed snapshots and gets the current state instead.
fn next_push(
    registry: &WindowRegistry,
    session: u64,
    update: Result<Arc<SnapshotMessage>, RecvError>,
) -> Option<Arc<SnapshotMessage>> {
    match update {
        Ok(snapshot) => Some(snapshot),
        Err(RecvError::Lagged(skipped)) => {
            warn!(session, skipped, "sync subscriber lagged; sending fresh snapshot");
            Some(Arc::new(registry.snapshot()))
        }
        Err(RecvError::Closed) => None,
    }
}

async fn send_snapshot(
    sender: &mut SplitSink<WebSocket, Message>,
    snapshot: &SnapshotMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(snapshot) {
        Ok(json) => json,
        Err(err) => {
            error!(error = %err, "failed to serialize snapshot");
            return Ok(());
        }
    };
    sender.send(Message::Text(json)).await
}

#[cfg(test)]
mod tests {
    use desktop_sync_contract::{window_types, CreateWindowRequest};
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn lagging_subscriber_gets_the_current_snapshot() {
        let registry = WindowRegistry::new(1);
        let (_, mut updates) = registry.subscribe();
        for title in ["One", "Two", "Three"] {
            registry
                .create(CreateWindowRequest::new(window_types::TEXT_EDITOR, title))
                .expect("create");
        }

        let update = updates.recv().await;
        assert!(matches!(update, Err(RecvError::Lagged(_))));

        let pushed = next_push(&registry, 1, update).expect("fresh snapshot");
        assert_eq!(pushed.version, 3);
        assert_eq!(pushed.state.windows.len(), 3);
        assert_eq!(pushed.receipt, None);
    }

    #[test]
    fn closed_broadcast_ends_the_push_loop() {
        let registry = WindowRegistry::default();
        assert!(next_push(&registry, 1, Err(RecvError::Closed)).is_none());
    }
}
