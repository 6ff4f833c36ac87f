use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use common::log_warn;

use super::AuthError;
use crate::app_state::AppState;
use crate::error::ApiError;
use crate::store::UserRecord;

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Rejects the request with 401 unless it carries a valid token.
pub struct AuthUser(pub UserRecord);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let user = state.auth.authenticate(token)?;
        Ok(AuthUser(user))
    }
}

/// Like [`AuthUser`], but any token problem just means an anonymous caller.
pub struct OptionalUser(pub Option<UserRecord>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(OptionalUser(None));
        };

        match state.auth.authenticate(token) {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(AuthError::Store(err)) => {
                log_warn!("Optional auth lookup failed: {}", err);
                Ok(OptionalUser(None))
            }
            Err(_) => Ok(OptionalUser(None)),
        }
    }
}
