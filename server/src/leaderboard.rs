//! Ranking and per-user views over the score records.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::UserId;
use common::api::{DEFAULT_LIMIT, MAX_LIMIT};
use common::log_warn;
use thiserror::Error;

use crate::store::{NewScore, ScoreRecord, ScoreStore, Store, StoreError, UserStore};

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Invalid score value")]
    InvalidScore,
    #[error("Limit must be between {min} and {max}")]
    InvalidLimit { value: i64, min: usize, max: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A score annotated with its 1-based position in a leaderboard query.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedScore {
    pub rank: usize,
    pub record: ScoreRecord,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    pub total_games: usize,
    pub high_score: u32,
    pub average_score: u32,
}

/// Leading integer of a query value, as in `"5abc"` -> 5. Digits that
/// overflow saturate so they still fail the range check.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Reads a `limit` query value. Missing, non-numeric and zero values fall
/// back to the default; anything else must lie in `1..=MAX_LIMIT`.
pub fn parse_limit(raw: Option<&str>) -> Result<usize, LeaderboardError> {
    let value = match raw.and_then(leading_integer) {
        None | Some(0) => return Ok(DEFAULT_LIMIT),
        Some(value) => value,
    };

    match usize::try_from(value) {
        Ok(limit) if limit <= MAX_LIMIT => Ok(limit),
        _ => Err(LeaderboardError::InvalidLimit {
            value,
            min: 1,
            max: MAX_LIMIT,
        }),
    }
}

/// Highest score first, then most recent, then latest inserted.
fn leaderboard_order(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.game_date.cmp(&a.game_date))
        .then_with(|| b.sequence.cmp(&a.sequence))
}

fn recency_order(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.game_date
        .cmp(&a.game_date)
        .then_with(|| b.sequence.cmp(&a.sequence))
}

#[derive(Clone)]
pub struct Leaderboard {
    store: Arc<dyn Store>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn top_scores(&self, limit: usize) -> Result<Vec<RankedScore>, LeaderboardError> {
        let mut records = self.store.all_scores()?;
        records.sort_by(leaderboard_order);

        Ok(records
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, record)| RankedScore {
                rank: index + 1,
                record,
            })
            .collect())
    }

    pub fn user_scores(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        let mut records = self.store.scores_for_user(user_id)?;
        records.sort_by(recency_order);
        records.truncate(limit);
        Ok(records)
    }

    /// Recomputed from the records; the cached value on the user is not consulted.
    pub fn user_high_score(&self, user_id: &UserId) -> Result<u32, LeaderboardError> {
        Ok(self
            .store
            .scores_for_user(user_id)?
            .iter()
            .map(|record| record.score)
            .max()
            .unwrap_or(0))
    }

    pub fn user_stats(&self, user_id: &UserId) -> Result<Stats, LeaderboardError> {
        let records = self.store.scores_for_user(user_id)?;
        let total_games = records.len();
        let high_score = records.iter().map(|r| r.score).max().unwrap_or(0);

        let average_score = if total_games == 0 {
            0
        } else {
            let sum: u64 = records.iter().map(|r| u64::from(r.score)).sum();
            (sum as f64 / total_games as f64).round() as u32
        };

        Ok(Stats {
            total_games,
            high_score,
            average_score,
        })
    }

    pub fn record_score(
        &self,
        user_id: &UserId,
        username: &str,
        score: i64,
    ) -> Result<ScoreRecord, LeaderboardError> {
        self.record_score_at(user_id, username, score, Utc::now())
    }

    pub fn record_score_at(
        &self,
        user_id: &UserId,
        username: &str,
        score: i64,
        game_date: DateTime<Utc>,
    ) -> Result<ScoreRecord, LeaderboardError> {
        let score = u32::try_from(score).map_err(|_| LeaderboardError::InvalidScore)?;

        let record = self.store.insert_score(NewScore {
            user_id: user_id.clone(),
            username: username.to_string(),
            score,
            game_date,
        })?;

        // The record is already stored; a stale cache is acceptable.
        if let Err(err) = self.store.raise_high_score(user_id, score) {
            log_warn!("Failed to update cached high score for {}: {}", user_id, err);
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, NewUser, ScoreStore, UserStore};
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn leaderboard_with_users() -> (Leaderboard, Arc<InMemoryStore>, UserId, UserId) {
        let store = Arc::new(InMemoryStore::new());
        let a = store
            .create_user(NewUser {
                username: "alpha".to_string(),
                email: "a@example.com".to_string(),
                password_hash: "x".to_string(),
            })
            .unwrap();
        let b = store
            .create_user(NewUser {
                username: "bravo".to_string(),
                email: "b@example.com".to_string(),
                password_hash: "x".to_string(),
            })
            .unwrap();
        (Leaderboard::new(store.clone()), store, a.id, b.id)
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("abc")).unwrap(), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("1")).unwrap(), 1);
        assert_eq!(parse_limit(Some("100")).unwrap(), 100);
        assert_eq!(parse_limit(Some("0")).unwrap(), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("5abc")).unwrap(), 5);
        assert_eq!(parse_limit(Some("2.5")).unwrap(), 2);
        assert_eq!(parse_limit(Some(" 7")).unwrap(), 7);
        assert!(matches!(
            parse_limit(Some("101")),
            Err(LeaderboardError::InvalidLimit { value: 101, .. })
        ));
        assert!(parse_limit(Some("-3")).is_err());
        assert!(parse_limit(Some("99999999999999999999999")).is_err());
    }

    #[test]
    fn test_top_scores_breaks_ties_by_recency() {
        let (leaderboard, _, a, b) = leaderboard_with_users();
        leaderboard.record_score_at(&a, "alpha", 10, at(0)).unwrap();
        leaderboard.record_score_at(&b, "bravo", 10, at(5)).unwrap();
        leaderboard.record_score_at(&a, "alpha", 3, at(10)).unwrap();

        let top = leaderboard.top_scores(10).unwrap();
        let summary: Vec<(usize, &str, u32)> = top
            .iter()
            .map(|r| (r.rank, r.record.username.as_str(), r.record.score))
            .collect();
        assert_eq!(summary, vec![(1, "bravo", 10), (2, "alpha", 10), (3, "alpha", 3)]);
    }

    #[test]
    fn test_equal_timestamps_fall_back_to_insertion_order() {
        let (leaderboard, _, a, b) = leaderboard_with_users();
        leaderboard.record_score_at(&a, "alpha", 7, at(0)).unwrap();
        leaderboard.record_score_at(&b, "bravo", 7, at(0)).unwrap();

        let top = leaderboard.top_scores(2).unwrap();
        assert_eq!(top[0].record.username, "bravo");
        assert_eq!(top[1].record.username, "alpha");
    }

    #[test]
    fn test_top_scores_respects_limit() {
        let (leaderboard, _, a, _) = leaderboard_with_users();
        for score in 0..15 {
            leaderboard.record_score_at(&a, "alpha", score, at(score)).unwrap();
        }
        let top = leaderboard.top_scores(5).unwrap();
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].record.score, 14);
        assert_eq!(top[4].rank, 5);
        assert_eq!(top[4].record.score, 10);
    }

    #[test]
    fn test_user_scores_are_newest_first() {
        let (leaderboard, _, a, b) = leaderboard_with_users();
        leaderboard.record_score_at(&a, "alpha", 50, at(0)).unwrap();
        leaderboard.record_score_at(&a, "alpha", 5, at(2)).unwrap();
        leaderboard.record_score_at(&b, "bravo", 99, at(3)).unwrap();
        leaderboard.record_score_at(&a, "alpha", 20, at(1)).unwrap();

        let scores: Vec<u32> = leaderboard
            .user_scores(&a, 10)
            .unwrap()
            .iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(scores, vec![5, 20, 50]);
        assert_eq!(leaderboard.user_scores(&a, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_high_score_and_stats() {
        let (leaderboard, store, a, b) = leaderboard_with_users();
        assert_eq!(leaderboard.user_high_score(&a).unwrap(), 0);
        assert_eq!(
            leaderboard.user_stats(&a).unwrap(),
            Stats { total_games: 0, high_score: 0, average_score: 0 }
        );

        leaderboard.record_score(&a, "alpha", 4).unwrap();
        leaderboard.record_score(&a, "alpha", 9).unwrap();
        leaderboard.record_score(&a, "alpha", 2).unwrap();
        leaderboard.record_score(&b, "bravo", 40).unwrap();

        assert_eq!(leaderboard.user_high_score(&a).unwrap(), 9);
        assert_eq!(
            leaderboard.user_stats(&a).unwrap(),
            Stats { total_games: 3, high_score: 9, average_score: 5 }
        );
        assert_eq!(store.find_user_by_id(&a).unwrap().unwrap().high_score, 9);
    }

    #[test]
    fn test_negative_score_is_rejected_without_writing() {
        let (leaderboard, store, a, _) = leaderboard_with_users();
        assert!(matches!(
            leaderboard.record_score(&a, "alpha", -1),
            Err(LeaderboardError::InvalidScore)
        ));
        assert!(store.all_scores().unwrap().is_empty());
    }

    #[test]
    fn test_zero_score_is_recorded() {
        let (leaderboard, _, a, _) = leaderboard_with_users();
        let record = leaderboard.record_score(&a, "alpha", 0).unwrap();
        assert_eq!(record.score, 0);
        assert_eq!(leaderboard.user_stats(&a).unwrap().total_games, 1);
    }
}
