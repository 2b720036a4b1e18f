use std::env;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use server::http_server::run_http_server;
use server::score_store::MemoryScoreStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if exists
    dotenv::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let bind = env::var("ECHOTILES_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("ECHOTILES_PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", bind, port);

    let store = Arc::new(MemoryScoreStore::new());

    let cancellation_token = CancellationToken::new();
    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            shutdown_token.cancel();
        }
    });

    run_http_server(&addr, store, cancellation_token).await
}
