use common::api::{LoginRequest, RegisterRequest};
use common::{log, log_warn};
use tokio::sync::mpsc;

use crate::api_client::{ApiClient, ClientError};
use crate::state::{ApiEvent, ClientCommand, SharedState};

pub const LEADERBOARD_SIZE: usize = 10;
pub const RECENT_SCORES: usize = 5;

/// Serves UI commands until the sender is dropped. Each command runs on
/// its own task so a slow request never holds up the others.
pub async fn api_task(
    client: ApiClient,
    shared_state: SharedState,
    mut command_rx: mpsc::UnboundedReceiver<ClientCommand>,
) {
    while let Some(command) = command_rx.recv().await {
        let client = client.clone();
        let shared_state = shared_state.clone();
        tokio::spawn(async move {
            handle_command(&client, &shared_state, command).await;
        });
    }
    log!("API task stopped");
}

fn auth_event(result: Result<common::api::AuthPayload, ClientError>) -> ApiEvent {
    match result {
        Ok(payload) => ApiEvent::Authenticated {
            token: payload.token,
            user: payload.user,
        },
        Err(err) => ApiEvent::AuthFailed(err.to_string()),
    }
}

async fn handle_command(client: &ApiClient, shared_state: &SharedState, command: ClientCommand) {
    let label = command.label();

    let event = match command {
        ClientCommand::Login { email, password } => {
            auth_event(client.login(&LoginRequest { email, password }).await)
        }
        ClientCommand::Register {
            username,
            email,
            password,
        } => auth_event(
            client
                .register(&RegisterRequest {
                    username,
                    email,
                    password,
                })
                .await,
        ),
        ClientCommand::VerifySession { token } => match client.verify(&token).await {
            Ok(user) => ApiEvent::SessionVerified(user),
            Err(err) if err.is_unauthorized() => ApiEvent::SessionExpired(err.to_string()),
            Err(err) => ApiEvent::VerifyUnavailable(err.to_string()),
        },
        ClientCommand::SubmitScore { token, score } => {
            match client.submit_score(&token, score).await {
                Ok(record) => ApiEvent::ScoreSaved(record),
                Err(err) => {
                    // The game-over screen is already up; a lost save is only logged.
                    log_warn!("Dropping score {}: {}", score, err);
                    return;
                }
            }
        }
        ClientCommand::RefreshLeaderboard { token } => {
            match client.leaderboard(token.as_deref(), LEADERBOARD_SIZE).await {
                Ok(entries) => ApiEvent::LeaderboardLoaded(entries),
                Err(err) => ApiEvent::LeaderboardFailed(err.to_string()),
            }
        }
        ClientCommand::RefreshUserScores { token } => {
            match client.user_scores(&token, RECENT_SCORES).await {
                Ok(scores) => ApiEvent::UserScoresLoaded(scores),
                Err(err) if err.is_unauthorized() => ApiEvent::SessionExpired(err.to_string()),
                Err(err) => ApiEvent::UserScoresFailed(err.to_string()),
            }
        }
    };

    if let ApiEvent::AuthFailed(message)
    | ApiEvent::SessionExpired(message)
    | ApiEvent::VerifyUnavailable(message)
    | ApiEvent::LeaderboardFailed(message)
    | ApiEvent::UserScoresFailed(message) = &event
    {
        log_warn!("{} failed: {}", label, message);
    }

    shared_state.push_event(event);
}
