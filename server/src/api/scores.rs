use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use common::{RankedScoreList, ScoreRecord};
use tracing::error;

use crate::http_server::HttpServerState;

/// `POST /api/score` — stores the submitted record and returns the
/// authoritative ranked top-10. The client overwrites its cache with this
/// body verbatim.
pub async fn submit_score(
    State(state): State<HttpServerState>,
    Json(record): Json<ScoreRecord>,
) -> Result<Json<RankedScoreList>, StatusCode> {
    if let Err(e) = state.store.add_score(record).await {
        error!("failed to store score: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    ranked(&state).await
}

/// `GET /api/scores` — the ranked top-10 for the leaderboard view.
pub async fn get_scores(
    State(state): State<HttpServerState>,
) -> Result<Json<RankedScoreList>, StatusCode> {
    ranked(&state).await
}

async fn ranked(state: &HttpServerState) -> Result<Json<RankedScoreList>, StatusCode> {
    match state.store.high_scores().await {
        Ok(scores) => Ok(Json(scores)),
        Err(e) => {
            error!("failed to read high scores: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
