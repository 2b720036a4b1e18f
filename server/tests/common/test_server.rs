use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use server::http_server::run_http_server_with_listener;
use server::score_store::MemoryScoreStore;

/// One EchoTiles server on an ephemeral port, torn down on shutdown().
pub struct TestServer {
    addr: SocketAddr,
    cancellation_token: CancellationToken,
    handle: JoinHandle<Result<()>>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let store = Arc::new(MemoryScoreStore::new());
        let cancellation_token = CancellationToken::new();

        let token = cancellation_token.clone();
        let handle =
            tokio::spawn(
                async move { run_http_server_with_listener(listener, store, token).await },
            );

        Ok(TestServer {
            addr,
            cancellation_token,
            handle,
        })
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn shutdown(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.handle.await??;
        Ok(())
    }
}
