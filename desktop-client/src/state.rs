use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::api::{LeaderboardEntry, ScoreRecordView, UserScoreEntry, UserView};
use eframe::egui;
use tokio::sync::mpsc;

/// Work for the background API task.
#[derive(Clone)]
pub enum ClientCommand {
    Login { email: String, password: String },
    Register { username: String, email: String, password: String },
    VerifySession { token: String },
    SubmitScore { token: String, score: u32 },
    RefreshLeaderboard { token: Option<String> },
    RefreshUserScores { token: String },
}

impl ClientCommand {
    /// Short name for logs. Never includes credentials.
    pub fn label(&self) -> &'static str {
        match self {
            ClientCommand::Login { .. } => "login",
            ClientCommand::Register { .. } => "register",
            ClientCommand::VerifySession { .. } => "verify session",
            ClientCommand::SubmitScore { .. } => "submit score",
            ClientCommand::RefreshLeaderboard { .. } => "refresh leaderboard",
            ClientCommand::RefreshUserScores { .. } => "refresh user scores",
        }
    }
}

/// Results posted back to the UI thread.
#[derive(Debug, Clone)]
pub enum ApiEvent {
    Authenticated { token: String, user: UserView },
    AuthFailed(String),
    SessionVerified(UserView),
    SessionExpired(String),
    VerifyUnavailable(String),
    ScoreSaved(ScoreRecordView),
    LeaderboardLoaded(Vec<LeaderboardEntry>),
    LeaderboardFailed(String),
    UserScoresLoaded(Vec<UserScoreEntry>),
    UserScoresFailed(String),
}

#[derive(Clone)]
pub struct CommandSender {
    inner: mpsc::UnboundedSender<ClientCommand>,
}

impl CommandSender {
    pub fn new(inner: mpsc::UnboundedSender<ClientCommand>) -> Self {
        Self { inner }
    }

    /// Returns false once the API task has gone away.
    pub fn send(&self, command: ClientCommand) -> bool {
        self.inner.send(command).is_ok()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mailbox between the API task and the UI. The task pushes events and
/// wakes the UI; the UI drains them once per frame.
#[derive(Clone, Default)]
pub struct SharedState {
    events: Arc<Mutex<VecDeque<ApiEvent>>>,
    context: Arc<Mutex<Option<egui::Context>>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_context(&self) -> bool {
        lock(&self.context).is_some()
    }

    pub fn set_context(&self, ctx: egui::Context) {
        *lock(&self.context) = Some(ctx);
    }

    pub fn push_event(&self, event: ApiEvent) {
        lock(&self.events).push_back(event);
        if let Some(ctx) = lock(&self.context).as_ref() {
            ctx.request_repaint();
        }
    }

    pub fn drain_events(&self) -> Vec<ApiEvent> {
        lock(&self.events).drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_drain_in_order() {
        let state = SharedState::new();
        state.push_event(ApiEvent::AuthFailed("first".to_string()));
        state.clone().push_event(ApiEvent::LeaderboardFailed("second".to_string()));

        let events = state.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], ApiEvent::AuthFailed(m) if m == "first"));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_labels_hide_credentials() {
        let command = ClientCommand::Login {
            email: "a@b.co".to_string(),
            password: "hunter2".to_string(),
        };
        assert_eq!(command.label(), "login");
    }
}
