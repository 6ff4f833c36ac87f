use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use common::{UserId, log, log_error};

use super::memory::{InMemoryStore, StoreData};
use super::{NewScore, NewUser, ScoreRecord, ScoreStore, Store, StoreError, UserRecord, UserStore};

/// In-memory store that rewrites a JSON snapshot after every mutation.
/// The snapshot is written to a sibling temp file and renamed into place.
pub struct JsonFileStore {
    path: PathBuf,
    memory: InMemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<StoreData>(&content).map_err(|e| {
                StoreError::Unavailable(format!("corrupt snapshot {}: {}", path.display(), e))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => StoreData::default(),
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to read {}: {}",
                    path.display(),
                    err
                )));
            }
        };

        log!(
            "Loaded store snapshot {} ({} users, {} scores)",
            path.display(),
            data.users.len(),
            data.scores.len()
        );

        Ok(Self {
            path,
            memory: InMemoryStore::from_data(data),
            write_lock: Mutex::new(()),
        })
    }

    /// Runs a mutation and persists the result while holding the write lock,
    /// so snapshots are written in mutation order. A failed write rolls the
    /// memory back to the last persisted state.
    fn mutate<T>(
        &self,
        operation: impl FnOnce(&InMemoryStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("write lock poisoned".to_string()))?;
        let previous = self.memory.snapshot()?;
        let result = operation(&self.memory)?;
        if let Err(err) = self.persist(&self.memory.snapshot()?) {
            log_error!("Failed to persist {}: {}", self.path.display(), err);
            self.memory.restore(previous)?;
            return Err(err);
        }
        Ok(result)
    }

    fn persist(&self, snapshot: &StoreData) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Persist(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Persist(e.to_string()))?;
        }

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        std::fs::write(&tmp_path, content).map_err(|e| StoreError::Persist(e.to_string()))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Persist(e.to_string()))
    }
}

impl UserStore for JsonFileStore {
    fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StoreError> {
        self.mutate(|memory| memory.create_user(new_user))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.memory.find_user_by_email(email)
    }

    fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        self.memory.find_user_by_id(id)
    }

    fn raise_high_score(&self, id: &UserId, score: u32) -> Result<(), StoreError> {
        self.mutate(|memory| memory.raise_high_score(id, score))
    }
}

impl ScoreStore for JsonFileStore {
    fn insert_score(&self, new_score: NewScore) -> Result<ScoreRecord, StoreError> {
        self.mutate(|memory| memory.insert_score(new_score))
    }

    fn all_scores(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        self.memory.all_scores()
    }

    fn scores_for_user(&self, user_id: &UserId) -> Result<Vec<ScoreRecord>, StoreError> {
        self.memory.scores_for_user(user_id)
    }
}

impl Store for JsonFileStore {
    fn kind(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "snake_store_test_{}_{}",
            name,
            uuid::Uuid::new_v4().simple()
        ));
        dir.join("store.json")
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let path = temp_path("missing");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.all_scores().unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_records_survive_reopen() {
        let path = temp_path("reopen");
        let user_id = {
            let store = JsonFileStore::open(&path).unwrap();
            let user = store
                .create_user(NewUser {
                    username: "erin".to_string(),
                    email: "erin@example.com".to_string(),
                    password_hash: "hash".to_string(),
                })
                .unwrap();
            store
                .insert_score(NewScore {
                    user_id: user.id.clone(),
                    username: user.username.clone(),
                    score: 17,
                    game_date: Utc::now(),
                })
                .unwrap();
            store.raise_high_score(&user.id, 17).unwrap();
            user.id
        };

        let reopened = JsonFileStore::open(&path).unwrap();
        let user = reopened.find_user_by_id(&user_id).unwrap().unwrap();
        assert_eq!(user.high_score, 17);
        assert_eq!(reopened.scores_for_user(&user_id).unwrap().len(), 1);

        let next = reopened
            .insert_score(NewScore {
                user_id: user_id.clone(),
                username: "erin".to_string(),
                score: 3,
                game_date: Utc::now(),
            })
            .unwrap();
        assert_eq!(next.sequence, 1);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_corrupt_snapshot_is_unavailable() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Unavailable(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_failed_write_leaves_no_record_behind() {
        let path = temp_path("failed_write");
        let store = JsonFileStore::open(&path).unwrap();
        let user = store
            .create_user(NewUser {
                username: "fay".to_string(),
                email: "fay@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir_all(&path).unwrap();

        let result = store.insert_score(NewScore {
            user_id: user.id.clone(),
            username: user.username.clone(),
            score: 9,
            game_date: Utc::now(),
        });
        assert!(matches!(result, Err(StoreError::Persist(_))));
        assert!(store.all_scores().unwrap().is_empty());

        std::fs::remove_dir_all(&path).unwrap();
        let next = store
            .insert_score(NewScore {
                user_id: user.id.clone(),
                username: user.username.clone(),
                score: 4,
                game_date: Utc::now(),
            })
            .unwrap();
        assert_eq!(next.sequence, 0);
        assert_eq!(store.all_scores().unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
