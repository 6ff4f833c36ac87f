use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use common::{ScoreId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    DuplicateField, NewScore, NewUser, ScoreRecord, ScoreStore, Store, StoreError, UserRecord,
    UserStore,
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(super) struct StoreData {
    pub users: Vec<UserRecord>,
    pub scores: Vec<ScoreRecord>,
    pub next_sequence: u64,
}

#[derive(Default)]
struct Indexes {
    user_by_id: HashMap<UserId, usize>,
    user_by_email: HashMap<String, usize>,
    user_by_username: HashMap<String, usize>,
}

impl Indexes {
    fn build(data: &StoreData) -> Self {
        let mut indexes = Self::default();
        for (position, user) in data.users.iter().enumerate() {
            indexes.insert(user, position);
        }
        indexes
    }

    fn insert(&mut self, user: &UserRecord, position: usize) {
        self.user_by_id.insert(user.id.clone(), position);
        self.user_by_email.insert(user.email.clone(), position);
        self.user_by_username.insert(user.username.clone(), position);
    }
}

struct Inner {
    data: StoreData,
    indexes: Indexes,
}

/// Process-local store. Every operation holds one lock, so concurrent
/// submissions are serialized and each one lands as its own record.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::from_data(StoreData::default())
    }

    pub(super) fn from_data(data: StoreData) -> Self {
        let indexes = Indexes::build(&data);
        Self {
            inner: Mutex::new(Inner { data, indexes }),
        }
    }

    pub(super) fn snapshot(&self) -> Result<StoreData, StoreError> {
        Ok(self.lock()?.data.clone())
    }

    /// Replaces the whole contents, rebuilding the lookup indexes.
    pub(super) fn restore(&self, data: StoreData) -> Result<(), StoreError> {
        let indexes = Indexes::build(&data);
        *self.lock()? = Inner { data, indexes };
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl UserStore for InMemoryStore {
    fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.lock()?;

        if inner.indexes.user_by_email.contains_key(&new_user.email) {
            return Err(StoreError::Duplicate { field: DuplicateField::Email });
        }
        if inner.indexes.user_by_username.contains_key(&new_user.username) {
            return Err(StoreError::Duplicate { field: DuplicateField::Username });
        }

        let user = UserRecord {
            id: UserId::new(Uuid::new_v4().simple().to_string()),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            high_score: 0,
            created_at: Utc::now(),
        };

        let position = inner.data.users.len();
        inner.indexes.insert(&user, position);
        inner.data.users.push(user.clone());
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .indexes
            .user_by_email
            .get(email)
            .map(|&position| inner.data.users[position].clone()))
    }

    fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .indexes
            .user_by_id
            .get(id)
            .map(|&position| inner.data.users[position].clone()))
    }

    fn raise_high_score(&self, id: &UserId, score: u32) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let position = *inner
            .indexes
            .user_by_id
            .get(id)
            .ok_or_else(|| StoreError::UserNotFound(id.clone()))?;
        let user = &mut inner.data.users[position];
        user.high_score = user.high_score.max(score);
        Ok(())
    }
}

impl ScoreStore for InMemoryStore {
    fn insert_score(&self, new_score: NewScore) -> Result<ScoreRecord, StoreError> {
        let mut inner = self.lock()?;
        let sequence = inner.data.next_sequence;
        inner.data.next_sequence += 1;

        let record = ScoreRecord {
            id: ScoreId::new(Uuid::new_v4().simple().to_string()),
            user_id: new_score.user_id,
            username: new_score.username,
            score: new_score.score,
            game_date: new_score.game_date,
            sequence,
        };
        inner.data.scores.push(record.clone());
        Ok(record)
    }

    fn all_scores(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.lock()?.data.scores.clone())
    }

    fn scores_for_user(&self, user_id: &UserId) -> Result<Vec<ScoreRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .data
            .scores
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl Store for InMemoryStore {
    fn kind(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[test]
    fn test_duplicate_email_is_reported_before_username() {
        let store = InMemoryStore::new();
        store.create_user(new_user("alice", "alice@example.com")).unwrap();

        let both = store.create_user(new_user("alice", "alice@example.com")).unwrap_err();
        assert!(matches!(both, StoreError::Duplicate { field: DuplicateField::Email }));

        let name_only = store.create_user(new_user("alice", "other@example.com")).unwrap_err();
        assert!(matches!(name_only, StoreError::Duplicate { field: DuplicateField::Username }));
    }

    #[test]
    fn test_lookup_by_email_and_id() {
        let store = InMemoryStore::new();
        let created = store.create_user(new_user("bob", "bob@example.com")).unwrap();
        assert_eq!(store.find_user_by_email("bob@example.com").unwrap(), Some(created.clone()));
        assert_eq!(store.find_user_by_id(&created.id).unwrap(), Some(created));
        assert_eq!(store.find_user_by_email("nobody@example.com").unwrap(), None);
    }

    #[test]
    fn test_raise_high_score_never_lowers() {
        let store = InMemoryStore::new();
        let user = store.create_user(new_user("carol", "carol@example.com")).unwrap();
        store.raise_high_score(&user.id, 12).unwrap();
        store.raise_high_score(&user.id, 5).unwrap();
        assert_eq!(store.find_user_by_id(&user.id).unwrap().unwrap().high_score, 12);
        assert!(matches!(
            store.raise_high_score(&UserId::from("missing"), 1),
            Err(StoreError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_inserts_are_all_kept() {
        let store = Arc::new(InMemoryStore::new());
        let user_id = UserId::from("u1");
        let now = Utc::now();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let user_id = user_id.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store
                            .insert_score(NewScore {
                                user_id: user_id.clone(),
                                username: "dave".to_string(),
                                score: i,
                                game_date: now,
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let scores = store.scores_for_user(&user_id).unwrap();
        assert_eq!(scores.len(), 200);
        let mut sequences: Vec<u64> = scores.iter().map(|s| s.sequence).collect();
        sequences.sort_unstable();
        sequences.dedup();
        assert_eq!(sequences.len(), 200);
    }
}
