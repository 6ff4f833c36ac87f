use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::api::{
    ApiResponse, HighScorePayload, LeaderboardEntry, LeaderboardPayload, SavedScorePayload,
    StatsPayload, UserScoreEntry, UserScoresPayload, UserStats,
};
use serde::Deserialize;
use serde_json::Value;

use super::score_view;
use crate::app_state::AppState;
use crate::auth::{AuthUser, OptionalUser};
use crate::error::ApiError;
use crate::leaderboard::{LeaderboardError, parse_limit};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/score", post(submit_score))
        .route("/leaderboard", get(leaderboard))
        .route("/user-scores", get(user_scores))
        .route("/high-score", get(high_score))
        .route("/stats", get(stats))
}

#[derive(Debug, Default, Deserialize)]
struct LimitQuery {
    limit: Option<String>,
}

/// Storage failures get a route-specific public message.
fn failed(public: &'static str) -> impl FnOnce(LeaderboardError) -> ApiError {
    move |err| match err {
        LeaderboardError::Store(store_err) => ApiError::internal(public, store_err),
        other => other.into(),
    }
}

/// The body is inspected by hand so that a missing score and a malformed
/// one produce different messages.
async fn submit_score(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SavedScorePayload>>), ApiError> {
    let Json(body) = payload?;

    let score = match body.get("score") {
        None | Some(Value::Null) => return Err(ApiError::validation("Please provide a score")),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| ApiError::Validation(LeaderboardError::InvalidScore.to_string()))?,
    };

    let record = state
        .leaderboard
        .record_score(&user.id, &user.username, score)
        .map_err(failed("Error saving score"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            "Score saved successfully",
            SavedScorePayload {
                score: score_view(&record),
            },
        )),
    ))
}

async fn leaderboard(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<LeaderboardPayload>>, ApiError> {
    let limit = parse_limit(query.limit.as_deref())?;
    let ranked = state
        .leaderboard
        .top_scores(limit)
        .map_err(failed("Error fetching leaderboard"))?;

    let leaderboard = ranked
        .into_iter()
        .map(|entry| LeaderboardEntry {
            rank: entry.rank,
            is_current_user: viewer
                .as_ref()
                .is_some_and(|user| user.id == entry.record.user_id),
            username: entry.record.username,
            score: entry.record.score,
            date: entry.record.game_date,
        })
        .collect();

    Ok(Json(ApiResponse::ok(LeaderboardPayload { leaderboard })))
}

async fn user_scores(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<UserScoresPayload>>, ApiError> {
    let limit = parse_limit(query.limit.as_deref())?;
    let scores = state
        .leaderboard
        .user_scores(&user.id, limit)
        .map_err(failed("Error fetching user scores"))?
        .into_iter()
        .map(|record| UserScoreEntry {
            score: record.score,
            game_date: record.game_date,
        })
        .collect();

    Ok(Json(ApiResponse::ok(UserScoresPayload { scores })))
}

async fn high_score(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<HighScorePayload>>, ApiError> {
    let high_score = state
        .leaderboard
        .user_high_score(&user.id)
        .map_err(failed("Error fetching high score"))?;

    Ok(Json(ApiResponse::ok(HighScorePayload { high_score })))
}

async fn stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<StatsPayload>>, ApiError> {
    let stats = state
        .leaderboard
        .user_stats(&user.id)
        .map_err(failed("Error fetching statistics"))?;

    Ok(Json(ApiResponse::ok(StatsPayload {
        stats: UserStats {
            total_games: stats.total_games,
            high_score: stats.high_score,
            average_score: stats.average_score,
        },
    })))
}
