use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use common::ScoreEntry;
use serde::Serialize;
use tracing::{error, info, warn};

use super::ApiError;
use crate::cache::{JsonFile, ScoreCache};
use crate::mirror::RemoteMirror;
use crate::submission::{into_entry, parse_submission};

#[derive(Clone)]
pub struct ProxyState {
    pub cache: JsonFile<ScoreCache>,
    pub mirror: Arc<dyn RemoteMirror>,
}

#[derive(Debug, Serialize)]
pub struct ScoresResponse {
    pub success: bool,
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Serialize)]
pub struct SaveScoreResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "githubSync")]
    pub github_sync: bool,
}

/// Every cached score, in submission order.
pub async fn list_scores(State(state): State<ProxyState>) -> Json<ScoresResponse> {
    Json(ScoresResponse {
        success: true,
        scores: state.cache.read().await.0,
    })
}

/// Validates, appends to the local cache, then mirrors the whole cache.
/// Answers 201 when the mirror took the update and 200 when it did not.
pub async fn save_score(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SaveScoreResponse>), ApiError> {
    let submission = parse_submission(&body)?;
    let entry = into_entry(&submission);

    let mut cache = state.cache.read().await;
    cache.0.push(entry);
    let scores = &cache.0;
    if let Err(e) = state.cache.write(&cache).await {
        error!("Error writing score cache: {:#}", e);
    }
    info!(
        name = %submission.name,
        score = submission.score,
        level = submission.level,
        "Score cached ({} total)",
        scores.len()
    );

    let synced = match state.mirror.publish(scores).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Remote mirror not updated: {:#}", e);
            false
        }
    };

    let status = if synced { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(SaveScoreResponse {
            success: true,
            message: "Score saved".to_string(),
            github_sync: synced,
        }),
    ))
}
