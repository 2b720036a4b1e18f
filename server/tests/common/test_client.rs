use ::common::RelayEnvelope;
use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Relay client wrapper for easier testing.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = connect_async(url).await?;
        Ok(TestClient { ws })
    }

    pub async fn send_envelope(&mut self, envelope: &RelayEnvelope) -> Result<()> {
        let json = serde_json::to_string(envelope)?;
        self.send_text(&json).await
    }

    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Waits for the next text frame, ignoring control frames.
    pub async fn receive_text(&mut self, timeout: Duration) -> Result<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline
                .checked_duration_since(tokio::time::Instant::now())
                .ok_or_else(|| anyhow::anyhow!("timed out waiting for relay frame"))?;
            match tokio::time::timeout(remaining, self.ws.next()).await {
                Ok(Some(Ok(Message::Text(text)))) => return Ok(text),
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(None) => return Err(anyhow::anyhow!("relay connection closed")),
                Err(_) => return Err(anyhow::anyhow!("timed out waiting for relay frame")),
            }
        }
    }

    pub async fn receive_envelope(&mut self, timeout: Duration) -> Result<RelayEnvelope> {
        let text = self.receive_text(timeout).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Asserts that nothing arrives within the window.
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        match self.receive_text(window).await {
            Ok(text) => Err(anyhow::anyhow!("unexpected relay frame: {}", text)),
            Err(_) => Ok(()),
        }
    }

    pub async fn disconnect(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
