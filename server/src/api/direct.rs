use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use common::{
    LEADERBOARD_VIEW_LIMIT, LeaderboardDocument, LeaderboardStats, RankedEntry, TOP_TEN,
    compute_stats, rank_top, sort_by_score,
};
use serde::Serialize;
use tracing::{error, info};

use super::ApiError;
use crate::cache::JsonFile;
use crate::submission::{into_entry, parse_submission};

#[derive(Clone)]
pub struct DirectState {
    pub db: JsonFile<LeaderboardDocument>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub success: bool,
    pub leaderboard: Vec<RankedEntry>,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    #[serde(flatten)]
    pub stats: LeaderboardStats,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsBody,
}

async fn ranked_view(state: &DirectState, limit: usize) -> Json<LeaderboardResponse> {
    let mut entries = state.db.read().await.leaderboard;
    sort_by_score(&mut entries);
    Json(LeaderboardResponse {
        success: true,
        leaderboard: rank_top(&entries, limit),
    })
}

pub async fn leaderboard(State(state): State<DirectState>) -> Json<LeaderboardResponse> {
    ranked_view(&state, LEADERBOARD_VIEW_LIMIT).await
}

pub async fn top_ten(State(state): State<DirectState>) -> Json<LeaderboardResponse> {
    ranked_view(&state, TOP_TEN).await
}

/// Appends the submission to the stored list. The list itself is never
/// truncated; only the views are capped.
pub async fn save_score(
    State(state): State<DirectState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SavedResponse>), ApiError> {
    let submission = parse_submission(&body)?;

    let mut document = state.db.read().await;
    document.leaderboard.push(into_entry(&submission));
    document.touch();
    if let Err(e) = state.db.write(&document).await {
        error!("Error writing leaderboard file: {:#}", e);
    }
    info!(
        name = %submission.name,
        score = submission.score,
        level = submission.level,
        "Score saved ({} stored)",
        document.leaderboard.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(SavedResponse {
            success: true,
            message: "Score saved".to_string(),
        }),
    ))
}

pub async fn stats(State(state): State<DirectState>) -> Json<StatsResponse> {
    let document = state.db.read().await;
    Json(StatsResponse {
        success: true,
        stats: StatsBody {
            stats: compute_stats(&document.leaderboard),
            last_updated: document.last_updated,
        },
    })
}
