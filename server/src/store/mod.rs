//! Document-store abstraction for users and score records. Ranking and
//! validation live above this layer; stores only persist and filter.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

use chrono::{DateTime, Utc};
use common::{ScoreId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{field} already exists")]
    Duplicate { field: DuplicateField },
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("store is unavailable: {0}")]
    Unavailable(String),
    #[error("failed to persist store snapshot: {0}")]
    Persist(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateField {
    Email,
    Username,
}

impl std::fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateField::Email => write!(f, "email"),
            DuplicateField::Username => write!(f, "username"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Cache only; raised opportunistically when a better score is recorded.
    pub high_score: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Immutable once stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: ScoreId,
    pub user_id: UserId,
    pub username: String,
    pub score: u32,
    pub game_date: DateTime<Utc>,
    /// Insertion order, used to order records that share a timestamp.
    pub sequence: u64,
}

#[derive(Clone, Debug)]
pub struct NewScore {
    pub user_id: UserId,
    pub username: String,
    pub score: u32,
    pub game_date: DateTime<Utc>,
}

pub trait UserStore: Send + Sync {
    /// Email is checked for uniqueness before username.
    fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StoreError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError>;
    /// Sets the cached high score to `max(current, score)`.
    fn raise_high_score(&self, id: &UserId, score: u32) -> Result<(), StoreError>;
}

pub trait ScoreStore: Send + Sync {
    /// Every call appends a distinct record.
    fn insert_score(&self, new_score: NewScore) -> Result<ScoreRecord, StoreError>;
    fn all_scores(&self) -> Result<Vec<ScoreRecord>, StoreError>;
    fn scores_for_user(&self, user_id: &UserId) -> Result<Vec<ScoreRecord>, StoreError>;
}

pub trait Store: UserStore + ScoreStore {
    fn kind(&self) -> &'static str;
}
