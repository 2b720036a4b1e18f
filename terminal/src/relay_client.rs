use anyhow::{anyhow, Result};
use async_trait::async_trait;
use common::{EventChannel, RelayEnvelope};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use crate::ui::{lock_ui, SharedUi};

/// Derives the relay endpoint from the API base URL (http -> ws, https -> wss).
pub fn websocket_url(base_url: &Url) -> Result<Url> {
    let mut ws_url = base_url.join("/ws")?;
    let scheme = match base_url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(anyhow!("unsupported scheme: {}", other)),
    };
    ws_url
        .set_scheme(scheme)
        .map_err(|_| anyhow!("failed to set websocket scheme"))?;
    Ok(ws_url)
}

/// Outbound half of the relay connection. Once the connection drops, sends
/// are silently swallowed and the session continues single-player.
pub struct RelayChannel {
    tx: mpsc::Sender<Message>,
}

#[async_trait]
impl EventChannel for RelayChannel {
    async fn broadcast(&mut self, envelope: RelayEnvelope) {
        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize relay event: {}", e);
                return;
            }
        };
        if self.tx.send(Message::Text(json)).await.is_err() {
            debug!("relay channel closed, dropping {} event", envelope.event_type);
        }
    }
}

/// Opens the long-lived relay connection. Inbound peer events are rendered
/// straight into the event log; they never touch the game state machine.
///
/// On connection failure the returned channel is already closed: peer
/// notifications simply stop and broadcasts become no-ops. No reconnect.
pub async fn connect(ws_url: Url, ui: SharedUi) -> RelayChannel {
    let (tx, mut outbound_rx) = mpsc::channel::<Message>(16);

    let stream = match connect_async(ws_url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            debug!("relay connection failed: {}", e);
            lock_ui(&ui).push_notice("game disconnected".to_string());
            return RelayChannel { tx };
        }
    };

    lock_ui(&ui).push_notice("game connected".to_string());
    let (mut ws_sink, mut ws_stream) = stream.split();

    // Writer: forward broadcasts to the socket.
    tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = ws_sink.send(msg).await {
                debug!("relay send failed: {}", e);
                break;
            }
        }
    });

    // Reader: render peer events until the connection closes.
    tokio::spawn(async move {
        while let Some(frame) = ws_stream.next().await {
            match frame {
                Ok(Message::Text(text)) => handle_frame(&ui, &text),
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("relay read error: {}", e);
                    break;
                }
            }
        }
        lock_ui(&ui).push_notice("game disconnected".to_string());
    });

    RelayChannel { tx }
}

/// Decodes one inbound frame. Malformed frames and unknown kinds are dropped,
/// never surfaced as errors.
fn handle_frame(ui: &SharedUi, text: &str) {
    let envelope: RelayEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!("ignoring malformed relay frame: {}", e);
            return;
        }
    };
    match envelope.decode() {
        Some(event) => lock_ui(ui).push_notice(event.notice()),
        None => debug!("ignoring relay event kind {:?}", envelope.event_type),
    }
}
