//! HTTP surface: `/api/auth`, `/api/game`, a health route and a JSON 404.

mod auth;
mod game;


use axum::http::header;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::{Json, Router};
use common::api::{ApiResponse, Endpoints, HealthPayload, ScoreRecordView, UserView};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::{enforce_timeout, log_request, security_headers};
use crate::rate_limiter::rate_limit;
use crate::store::{ScoreRecord, UserRecord};

pub fn build_router(state: AppState) -> Router {
    let auth_routes = auth::router().layer(from_fn_with_state(
        state.auth_limiter.clone(),
        rate_limit,
    ));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/game", game::router());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let router = Router::new()
        .route("/", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(from_fn_with_state(state.global_limiter.clone(), rate_limit))
        .layer(from_fn(security_headers))
        .layer(from_fn_with_state(state.request_timeout, enforce_timeout))
        .layer(cors);

    let router = if state.log_requests {
        router.layer(from_fn(log_request))
    } else {
        router
    };

    router.with_state(state)
}

async fn health() -> Json<ApiResponse<HealthPayload>> {
    Json(ApiResponse::ok_with_message(
        "Snake Game API is running!",
        HealthPayload {
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints: Endpoints {
                auth: "/api/auth".to_string(),
                game: "/api/game".to_string(),
            },
        },
    ))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn user_view(user: &UserRecord) -> UserView {
    UserView {
        id: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        high_score: user.high_score,
    }
}

fn score_view(record: &ScoreRecord) -> ScoreRecordView {
    ScoreRecordView {
        id: record.id.clone(),
        user_id: record.user_id.clone(),
        username: record.username.clone(),
        score: record.score,
        game_date: record.game_date,
    }
}
