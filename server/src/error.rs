use std::time::Duration;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use common::api::ApiResponse;
use common::log_error;
use thiserror::Error;

use crate::auth::AuthError;
use crate::leaderboard::LeaderboardError;
use crate::store::{DuplicateField, StoreError};

/// Every failure a route can report. Rendered as `{success: false, message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("Route not found")]
    NotFound,
    #[error("{message}")]
    RateLimited { message: String, retry_after: Duration },
    #[error("Request timed out, please retry")]
    Timeout { retry_after: Duration },
    #[error("{public}")]
    Internal { public: String, detail: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        ApiError::Auth(message.into())
    }

    pub fn internal(public: impl Into<String>, detail: impl ToString) -> Self {
        ApiError::Internal {
            public: public.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited { retry_after, .. } | ApiError::Timeout { retry_after } => {
                Some(*retry_after)
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { ref public, ref detail } = self {
            log_error!("{}: {}", public, detail);
        }

        let status = self.status();
        let retry_after = self.retry_after();
        let mut response = (status, Json(ApiResponse::error(self.to_string()))).into_response();

        if let Some(retry_after) = retry_after {
            let seconds = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field: DuplicateField::Email } => {
                ApiError::validation("Email already registered")
            }
            StoreError::Duplicate { field: DuplicateField::Username } => {
                ApiError::validation("Username already taken")
            }
            other => ApiError::internal("Internal server error", other),
        }
    }
}

impl From<LeaderboardError> for ApiError {
    fn from(err: LeaderboardError) -> Self {
        match err {
            LeaderboardError::InvalidScore | LeaderboardError::InvalidLimit { .. } => {
                ApiError::Validation(err.to_string())
            }
            LeaderboardError::Store(store_err) => store_err.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Hashing(_) | AuthError::Signing(_) => {
                ApiError::internal("Internal server error", err)
            }
            AuthError::Store(store_err) => store_err.into(),
            _ => ApiError::Auth(err.to_string()),
        }
    }
}
