use std::time::Duration;

use common::api::{
    ApiResponse, AuthPayload, LeaderboardEntry, LeaderboardPayload, LoginRequest,
    RegisterRequest, SavedScorePayload, ScoreRecordView, SubmitScoreRequest, UserScoreEntry,
    UserScoresPayload, UserView, VerifyPayload,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Cannot reach the server: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}

/// Thin typed wrapper over the leaderboard REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ClientError> {
        self.send(self.http.post(self.url("auth/register")).json(request))
            .await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ClientError> {
        self.send(self.http.post(self.url("auth/login")).json(request))
            .await
    }

    pub async fn verify(&self, token: &str) -> Result<UserView, ClientError> {
        let payload: VerifyPayload = self
            .send(self.http.get(self.url("auth/verify")).bearer_auth(token))
            .await?;
        Ok(payload.user)
    }

    pub async fn submit_score(&self, token: &str, score: u32) -> Result<ScoreRecordView, ClientError> {
        let payload: SavedScorePayload = self
            .send(
                self.http
                    .post(self.url("game/score"))
                    .bearer_auth(token)
                    .json(&SubmitScoreRequest { score }),
            )
            .await?;
        Ok(payload.score)
    }

    pub async fn leaderboard(
        &self,
        token: Option<&str>,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let mut request = self
            .http
            .get(self.url("game/leaderboard"))
            .query(&[("limit", limit)]);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let payload: LeaderboardPayload = self.send(request).await?;
        Ok(payload.leaderboard)
    }

    pub async fn user_scores(
        &self,
        token: &str,
        limit: usize,
    ) -> Result<Vec<UserScoreEntry>, ClientError> {
        let payload: UserScoresPayload = self
            .send(
                self.http
                    .get(self.url("game/user-scores"))
                    .query(&[("limit", limit)])
                    .bearer_auth(token),
            )
            .await?;
        Ok(payload.scores)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode_envelope(status, &body)
    }
}

/// Unwraps `{success, message?, data?}`. Error statuses become typed errors,
/// with 401 singled out so callers can drop the session.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ClientError> {
    let envelope = serde_json::from_slice::<ApiResponse<T>>(body);

    if !status.is_success() {
        let message = envelope
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        return Err(if status == StatusCode::UNAUTHORIZED {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Api {
                status: status.as_u16(),
                message,
            }
        });
    }

    let envelope = envelope.map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
    if !envelope.success {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: envelope.message.unwrap_or_else(|| "Request failed".to_string()),
        });
    }
    envelope
        .data
        .ok_or_else(|| ClientError::InvalidResponse("response has no data".to_string()))
}
