/// DispatchCore — single-owner event loop for application state.
///
/// The input task sends `CoreEvent`s to this loop.  DispatchCore owns the
/// `Store` exclusively; nothing else ever touches the current snapshot.
///
/// After each dispatch it broadcasts either the new snapshot or the reason
/// the dispatch failed.  SET_SOCKET envelopes only carry an address; the
/// core connects it before handing the action to the store.
use std::sync::Arc;
use std::time::Duration;

use jukebox_proto::config::Config;
use jukebox_proto::protocol::{Action as WireAction, ActionMessage, DecodeError, SocketSpec};
use jukebox_state::{AppState, Socket, Store};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use crate::socket::TcpSocket;

// ── Events ────────────────────────────────────────────────────────────────────

/// All inputs into the DispatchCore loop.
#[derive(Debug)]
pub enum CoreEvent {
    /// One action envelope read from the input stream.
    Message(ActionMessage),
    /// Input is exhausted; close up and stop.
    Shutdown,
}

/// What the core tells its listeners after every dispatch.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    StateUpdated(Arc<AppState>),
    DispatchFailed(String),
}

// ── DispatchCore ──────────────────────────────────────────────────────────────

pub struct DispatchCore {
    store: Store,
    connect_timeout: Duration,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
}

impl DispatchCore {
    pub fn new(config: &Config, broadcast_tx: broadcast::Sender<BroadcastMessage>) -> Self {
        Self {
            store: Store::new(AppState::with_catalogs(&config.catalog)),
            connect_timeout: Duration::from_millis(config.socket.connect_timeout_ms),
            broadcast_tx,
        }
    }

    /// Run until a `Shutdown` event arrives or every sender is gone.  The
    /// live socket, if any, is closed on the way out.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<CoreEvent>) -> anyhow::Result<()> {
        info!("DispatchCore: starting event loop");

        loop {
            match event_rx.recv().await {
                None => {
                    info!("DispatchCore: event channel closed, shutting down");
                    break;
                }
                Some(CoreEvent::Shutdown) => {
                    info!("DispatchCore: shutdown requested");
                    break;
                }
                Some(CoreEvent::Message(message)) => self.handle_message(message).await,
            }
        }

        self.store.close_socket();
        Ok(())
    }

    async fn handle_message(&mut self, message: ActionMessage) {
        let decoded = message.decode();

        // SET_SOCKET only names an address; connect it before resolving
        let mut live = None;
        if let Ok(WireAction::SetSocket { socket }) = &decoded {
            match self.connect(socket).await {
                Some(handle) => live = Some(handle),
                None => return,
            }
        }
        let decoded = decoded.and_then(|action| {
            action.try_map_socket(|spec| {
                live.ok_or_else(|| DecodeError::UnresolvedSocket(spec.address))
            })
        });
        let result = self.store.dispatch_decoded(&message, decoded);

        let update = match result {
            Ok(state) => BroadcastMessage::StateUpdated(state),
            Err(e) => {
                error!("{} failed: {}", message.kind, e);
                BroadcastMessage::DispatchFailed(format!("{}: {}", message.kind, e))
            }
        };
        // No receivers is fine
        let _ = self.broadcast_tx.send(update);
    }

    async fn connect(&self, spec: &SocketSpec) -> Option<Socket> {
        match TcpSocket::connect(&spec.address, self.connect_timeout).await {
            Ok(socket) => {
                let socket: Socket = Arc::new(socket);
                Some(socket)
            }
            Err(e) => {
                warn!("SET_SOCKET dropped: {:#}", e);
                let _ = self
                    .broadcast_tx
                    .send(BroadcastMessage::DispatchFailed(format!("SET_SOCKET: {:#}", e)));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn message(value: serde_json::Value) -> CoreEvent {
        CoreEvent::Message(serde_json::from_value(value).unwrap())
    }

    fn spawn_core() -> (
        mpsc::Sender<CoreEvent>,
        broadcast::Receiver<BroadcastMessage>,
        tokio::task::JoinHandle<anyhow::Result<()>>,
    ) {
        let (broadcast_tx, broadcast_rx) = broadcast::channel(64);
        let (event_tx, event_rx) = mpsc::channel(64);
        let core = DispatchCore::new(&Config::default(), broadcast_tx);
        let handle = tokio::spawn(core.run(event_rx));
        (event_tx, broadcast_rx, handle)
    }

    async fn next_state(rx: &mut broadcast::Receiver<BroadcastMessage>) -> Arc<AppState> {
        match rx.recv().await.unwrap() {
            BroadcastMessage::StateUpdated(state) => state,
            BroadcastMessage::DispatchFailed(reason) => panic!("dispatch failed: {}", reason),
        }
    }

    #[tokio::test]
    async fn test_messages_produce_snapshots() {
        let (tx, mut rx, handle) = spawn_core();

        tx.send(message(json!({"type": "SET_SONGS", "args": {"songs": [
            {"id": 4, "songTitle": "Clair de Lune", "notes": "Db"}
        ]}})))
        .await
        .unwrap();
        tx.send(message(json!({"type": "PLAY_SONG", "args": {"id": 4}})))
            .await
            .unwrap();

        assert_eq!(next_state(&mut rx).await.songs.len(), 1);
        assert_eq!(next_state(&mut rx).await.notes, Some(json!("Db")));

        tx.send(CoreEvent::Shutdown).await.unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failed_lookup_is_broadcast() {
        let (tx, mut rx, handle) = spawn_core();

        tx.send(message(json!({"type": "SET_ALBUM_SONGS", "args": {"index": 0}})))
            .await
            .unwrap();
        match rx.recv().await.unwrap() {
            BroadcastMessage::DispatchFailed(reason) => {
                assert!(reason.starts_with("SET_ALBUM_SONGS"));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        drop(tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_undecodable_message_keeps_state() {
        let (tx, mut rx, handle) = spawn_core();

        tx.send(message(json!({"type": "SET_SONGS", "args": {"songs": ["a"]}})))
            .await
            .unwrap();
        tx.send(message(json!({"type": "BOGUS", "args": {"x": 1}})))
            .await
            .unwrap();
        tx.send(message(json!({"type": "PLAY_SONG", "args": {}})))
            .await
            .unwrap();

        let before = next_state(&mut rx).await;
        assert!(Arc::ptr_eq(&next_state(&mut rx).await, &before));
        assert!(Arc::ptr_eq(&next_state(&mut rx).await, &before));

        drop(tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_replacing_socket_closes_previous_connection() {
        let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let first_addr = first.local_addr().unwrap().to_string();
        let second_addr = second.local_addr().unwrap().to_string();

        let (tx, mut rx, handle) = spawn_core();

        tx.send(message(json!({"type": "SET_SOCKET", "args": {"socket": {"address": &first_addr}}})))
            .await
            .unwrap();
        let state = next_state(&mut rx).await;
        assert!(state.socket.is_some());
        let (mut first_peer, _) = first.accept().await.unwrap();

        tx.send(message(json!({"type": "SET_SOCKET", "args": {"socket": {"address": &second_addr}}})))
            .await
            .unwrap();
        let state = next_state(&mut rx).await;
        assert_eq!(
            state.socket.as_ref().unwrap().describe(),
            format!("tcp://{}", second_addr)
        );
        let (mut second_peer, _) = second.accept().await.unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(first_peer.read(&mut buf).await.unwrap(), 0);

        // The survivor is closed at shutdown
        tx.send(CoreEvent::Shutdown).await.unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(second_peer.read(&mut buf).await.unwrap(), 0);
    }
}
