use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::api::scores;
use crate::relay::{handle_relay_socket, RelayHub};
use crate::score_store::ScoreStore;

/// Shared state for the API handlers and the relay endpoint.
#[derive(Clone)]
pub struct HttpServerState {
    pub store: Arc<dyn ScoreStore>,
    pub hub: Arc<RelayHub>,
    pub cancellation_token: CancellationToken,
    pub connection_count: Arc<AtomicUsize>,
}

/// Runs the combined HTTP server: score API plus the websocket relay.
pub async fn run_http_server(
    addr: &str,
    store: Arc<dyn ScoreStore>,
    cancellation_token: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    run_http_server_with_listener(listener, store, cancellation_token).await
}

/// Same as [`run_http_server`] but over a pre-bound listener, so tests can
/// bind to an ephemeral port.
pub async fn run_http_server_with_listener(
    listener: TcpListener,
    store: Arc<dyn ScoreStore>,
    cancellation_token: CancellationToken,
) -> Result<()> {
    let state = HttpServerState {
        store,
        hub: Arc::new(RelayHub::new()),
        cancellation_token: cancellation_token.clone(),
        connection_count: Arc::new(AtomicUsize::new(0)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket_handler))
        .route("/api/score", post(scores::submit_score))
        .route("/api/scores", get(scores::get_scores))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    info!(
        "HTTP server (score API + relay) listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancellation_token.cancelled().await;
            info!("HTTP server received shutdown signal");
        })
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
}

/// WebSocket upgrade handler for the relay endpoint.
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<HttpServerState>,
) -> impl IntoResponse {
    let count = state.connection_count.fetch_add(1, Ordering::Relaxed) + 1;
    debug!("relay connection opened, total connections: {}", count);

    let connection_count = state.connection_count.clone();

    ws.on_upgrade(move |socket| async move {
        handle_relay_socket(socket, state.hub, state.cancellation_token).await;

        let count = connection_count.fetch_sub(1, Ordering::Relaxed) - 1;
        debug!("relay connection closed, total connections: {}", count);
    })
}

async fn health_check() -> &'static str {
    "OK"
}
