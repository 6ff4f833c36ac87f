use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::api::{ApiResponse, AuthPayload, LoginRequest, RegisterRequest, VerifyPayload};
use common::log;

use super::user_view;
use crate::app_state::AppState;
use crate::auth::{AuthUser, Session, validate_registration};
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify", get(verify))
}

fn auth_payload(session: &Session) -> AuthPayload {
    AuthPayload {
        token: session.token.clone(),
        user: user_view(&session.user),
    }
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>), ApiError> {
    let Json(request) = payload?;
    let registration = validate_registration(request).map_err(ApiError::Validation)?;

    // Password hashing is CPU-bound.
    let auth = state.auth.clone();
    let session = tokio::task::spawn_blocking(move || auth.register(registration))
        .await
        .map_err(|e| ApiError::internal("Error registering user", e))??;

    log!("Registered user {} ({})", session.user.username, session.user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            "User registered successfully",
            auth_payload(&session),
        )),
    ))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthPayload>>, ApiError> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("Please provide email and password"));
    }

    let auth = state.auth.clone();
    let session = tokio::task::spawn_blocking(move || auth.login(&request.email, &request.password))
        .await
        .map_err(|e| ApiError::internal("Error logging in", e))??;

    Ok(Json(ApiResponse::ok_with_message(
        "Login successful",
        auth_payload(&session),
    )))
}

async fn verify(AuthUser(user): AuthUser) -> Json<ApiResponse<VerifyPayload>> {
    Json(ApiResponse::ok(VerifyPayload {
        user: user_view(&user),
    }))
}
