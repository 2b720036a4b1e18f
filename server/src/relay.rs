use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outbound channel depth per peer. A peer slower than this drops frames
/// rather than stalling the fan-out (at-most-once delivery, no retry).
const PEER_CHANNEL_CAPACITY: usize = 64;

/// Interval between liveness pings. A peer that sends nothing between two
/// pings is considered dead and dropped.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Shared fan-out hub. Holds no durable state and performs no interpretation:
/// every received frame is forwarded verbatim to every other connected peer.
#[derive(Default)]
pub struct RelayHub {
    peers: RwLock<HashMap<Uuid, mpsc::Sender<Message>>>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn peer_count(&self) -> usize {
        self.peers.read().await.len()
    }

    async fn register(&self, id: Uuid, tx: mpsc::Sender<Message>) {
        self.peers.write().await.insert(id, tx);
    }

    async fn unregister(&self, id: Uuid) {
        self.peers.write().await.remove(&id);
    }

    /// Forwards one frame to every peer except the sender. Full or closed
    /// peer channels drop the frame for that peer only.
    async fn fan_out(&self, sender: Uuid, message: Message) {
        let peers = self.peers.read().await;
        for (id, tx) in peers.iter() {
            if *id == sender {
                continue;
            }
            if let Err(e) = tx.try_send(message.clone()) {
                debug!("dropping frame for peer {}: {}", id, e);
            }
        }
    }
}

/// Runs one relay connection to completion: registers the peer, forwards its
/// frames to everyone else, and delivers everyone else's frames to it.
pub async fn handle_relay_socket(
    socket: WebSocket,
    hub: Arc<RelayHub>,
    cancellation_token: CancellationToken,
) {
    let peer_id = Uuid::new_v4();
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (peer_tx, mut peer_rx) = mpsc::channel::<Message>(PEER_CHANNEL_CAPACITY);

    hub.register(peer_id, peer_tx).await;
    info!("relay peer {} connected ({} total)", peer_id, hub.peer_count().await);

    // Forward queued fan-out frames to this peer's socket.
    let forward_task = tokio::spawn(async move {
        while let Some(msg) = peer_rx.recv().await {
            if let Err(e) = ws_sink.send(msg).await {
                warn!("relay send to {} failed: {}", peer_id, e);
                break;
            }
        }
    });

    let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
    keepalive.tick().await; // first tick completes immediately
    let mut seen_since_ping = true;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                debug!("relay peer {}: shutdown requested", peer_id);
                break;
            }
            _ = keepalive.tick() => {
                if !seen_since_ping {
                    warn!("relay peer {} unresponsive, dropping", peer_id);
                    break;
                }
                seen_since_ping = false;
                if hub.peers.read().await.get(&peer_id)
                    .map(|tx| tx.try_send(Message::Ping(Vec::new())).is_err())
                    .unwrap_or(true)
                {
                    break;
                }
            }
            inbound = ws_stream.next() => {
                match inbound {
                    Some(Ok(msg)) => {
                        seen_since_ping = true;
                        match msg {
                            // Game frames travel as text; forward them untouched.
                            Message::Text(_) | Message::Binary(_) => {
                                hub.fan_out(peer_id, msg).await;
                            }
                            Message::Ping(_) | Message::Pong(_) => {}
                            Message::Close(_) => {
                                debug!("relay peer {} closed", peer_id);
                                break;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        debug!("relay peer {} read error: {}", peer_id, e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    hub.unregister(peer_id).await;
    forward_task.abort();
    info!("relay peer {} disconnected ({} left)", peer_id, hub.peer_count().await);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fan_out_skips_the_sender() {
        let hub = RelayHub::new();
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let (sender_tx, mut sender_rx) = mpsc::channel(4);
        let (receiver_tx, mut receiver_rx) = mpsc::channel(4);
        hub.register(sender, sender_tx).await;
        hub.register(receiver, receiver_tx).await;

        hub.fan_out(sender, Message::Text("hello".to_string())).await;

        assert_eq!(
            receiver_rx.recv().await,
            Some(Message::Text("hello".to_string()))
        );
        assert!(sender_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregistered_peer_no_longer_receives() {
        let hub = RelayHub::new();
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let (sender_tx, _sender_rx) = mpsc::channel(4);
        let (receiver_tx, mut receiver_rx) = mpsc::channel(4);
        hub.register(sender, sender_tx).await;
        hub.register(receiver, receiver_tx).await;
        hub.unregister(receiver).await;

        hub.fan_out(sender, Message::Text("gone".to_string())).await;

        assert_eq!(hub.peer_count().await, 1);
        assert!(receiver_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn slow_peer_drops_frames_without_stalling() {
        let hub = RelayHub::new();
        let sender = Uuid::new_v4();
        let slow = Uuid::new_v4();
        let (sender_tx, _sender_rx) = mpsc::channel(4);
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        hub.register(sender, sender_tx).await;
        hub.register(slow, slow_tx).await;

        // Second frame overflows the slow peer's channel; fan_out must return.
        hub.fan_out(sender, Message::Text("one".to_string())).await;
        hub.fan_out(sender, Message::Text("two".to_string())).await;
    }
}
