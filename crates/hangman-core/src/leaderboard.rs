//! Leaderboard rules over a hosted key-value store
//!
//! The store holds one record per user at `users/{id}`. Reading ranks every
//! record that has a score; writing keeps the best score and counts games.
//! Backends implement [`ScoreStore`]; [`MemoryStore`] is the in-process one
//! used by tests and the `test` environment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Shown when a user has neither a username nor an email
pub const ANONYMOUS_USERNAME: &str = "Usuario Anónimo";

/// A user's entry in the store.
///
/// Fields the game does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games_played: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    pub fn new(username: Option<String>, email: Option<String>) -> Self {
        Self {
            username,
            email,
            ..Default::default()
        }
    }

    /// First non-empty of username, email, then the anonymous label
    pub fn display_name(&self) -> &str {
        [self.username.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(ANONYMOUS_USERNAME)
    }
}

/// One row of the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedScore {
    pub id: String,
    pub username: String,
    pub score: u32,
    pub games_played: u32,
}

/// Errors a storage backend can report
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed data: {0}")]
    Malformed(String),
    #[error("storage error: {0}")]
    Io(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by [`LeaderboardClient`]
#[derive(Debug, Clone, Error)]
pub enum LeaderboardError {
    #[error("failed to read leaderboard: {0}")]
    RemoteRead(#[source] StoreError),
    #[error("failed to update score: {0}")]
    RemoteWrite(#[source] StoreError),
}

/// Storage collaborator: a key-value store of user records
pub trait ScoreStore: Send + Sync {
    /// Read `users/{user_id}`
    fn get_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>>;

    /// Replace `users/{user_id}`
    fn set_user(&self, user_id: &str, record: &UserRecord) -> StoreResult<()>;

    /// Read the whole `users` collection.
    ///
    /// Backends may return it ordered by score; callers sort anyway.
    fn list_users(&self) -> StoreResult<Vec<(String, UserRecord)>>;

    /// Backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Fold a finished game into a user's record.
///
/// A missing record, or one without a score, takes `new_score` as its
/// score. Otherwise the score only changes when `new_score` beats it.
/// Games played always goes up by one.
pub fn apply_score(existing: Option<UserRecord>, new_score: u32) -> UserRecord {
    let mut record = existing.unwrap_or_default();
    match record.score {
        Some(best) if new_score <= best => {}
        _ => record.score = Some(new_score),
    }
    record.games_played = Some(record.games_played.unwrap_or(0).saturating_add(1));
    record
}

/// Turn raw store records into the ranking, best score first.
///
/// Records without a score are skipped. Ties keep the order they came in.
pub fn rank_records(records: Vec<(String, UserRecord)>) -> Vec<RankedScore> {
    let mut ranked: Vec<RankedScore> = records
        .into_iter()
        .filter_map(|(id, record)| {
            let score = record.score?;
            Some(RankedScore {
                username: record.display_name().to_string(),
                games_played: record.games_played.unwrap_or(0),
                score,
                id,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Read and update the leaderboard through a [`ScoreStore`]
#[derive(Clone)]
pub struct LeaderboardClient {
    store: Arc<dyn ScoreStore>,
}

impl std::fmt::Debug for LeaderboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderboardClient")
            .field("store", &self.store.backend_name())
            .finish()
    }
}

impl LeaderboardClient {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// All scored users, best first
    pub fn fetch_ranked_scores(&self) -> Result<Vec<RankedScore>, LeaderboardError> {
        let records = self
            .store
            .list_users()
            .map_err(LeaderboardError::RemoteRead)?;
        let ranked = rank_records(records);
        tracing::debug!(
            entries = ranked.len(),
            backend = self.backend_name(),
            "leaderboard loaded"
        );
        Ok(ranked)
    }

    /// Fill in a user's username and email if the store lacks them.
    ///
    /// Existing values win; nothing is written when there is nothing new.
    pub fn ensure_profile(
        &self,
        user_id: &str,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), LeaderboardError> {
        let before = self
            .store
            .get_user(user_id)
            .map_err(LeaderboardError::RemoteRead)?
            .unwrap_or_default();
        let mut record = before.clone();
        let fill = |slot: &mut Option<String>, value: Option<&str>| {
            if slot.is_none() {
                *slot = value.map(str::to_string);
            }
        };
        fill(&mut record.username, username);
        fill(&mut record.email, email);
        if record == before {
            return Ok(());
        }
        self.store
            .set_user(user_id, &record)
            .map_err(LeaderboardError::RemoteWrite)?;
        tracing::debug!(user_id, "profile stored");
        Ok(())
    }

    /// Read-modify-write of a user's record, returning what was written.
    ///
    /// Not atomic: two sessions for the same user racing here can lose a
    /// games-played increment.
    pub fn try_record_score(
        &self,
        user_id: &str,
        new_score: u32,
    ) -> Result<UserRecord, LeaderboardError> {
        let existing = self
            .store
            .get_user(user_id)
            .map_err(LeaderboardError::RemoteRead)?;
        let updated = apply_score(existing, new_score);
        self.store
            .set_user(user_id, &updated)
            .map_err(LeaderboardError::RemoteWrite)?;
        tracing::info!(
            user_id,
            new_score,
            best = ?updated.score,
            games = ?updated.games_played,
            "score recorded"
        );
        Ok(updated)
    }

    /// Like [`LeaderboardClient::try_record_score`], but failures are
    /// logged and reported as `false`
    pub fn record_score(&self, user_id: &str, new_score: u32) -> bool {
        match self.try_record_score(user_id, new_score) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(user_id, new_score, "error updating score: {e}");
                false
            }
        }
    }
}

// ==================== In-memory Backend ====================

/// In-memory store for tests and offline runs
#[derive(Debug)]
pub struct MemoryStore {
    users: Mutex<BTreeMap<String, UserRecord>>,
    writes: Mutex<Vec<(String, UserRecord)>>,
    available: Mutex<bool>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(BTreeMap::new()),
            writes: Mutex::new(Vec::new()),
            available: Mutex::new(true),
        }
    }

    /// Pre-populate with records
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, UserRecord)>,
    {
        let store = Self::new();
        lock(&store.users).extend(records);
        store
    }

    /// Make every call fail with [`StoreError::Unavailable`]
    pub fn set_available(&self, available: bool) {
        *lock(&self.available) = available;
    }

    /// Copy of a stored record
    pub fn record(&self, user_id: &str) -> Option<UserRecord> {
        lock(&self.users).get(user_id).cloned()
    }

    /// Every successful write, oldest first
    pub fn writes(&self) -> Vec<(String, UserRecord)> {
        lock(&self.writes).clone()
    }

    fn check_available(&self) -> StoreResult<()> {
        if *lock(&self.available) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".into()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for MemoryStore {
    fn get_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        self.check_available()?;
        Ok(lock(&self.users).get(user_id).cloned())
    }

    fn set_user(&self, user_id: &str, record: &UserRecord) -> StoreResult<()> {
        self.check_available()?;
        lock(&self.users).insert(user_id.to_string(), record.clone());
        lock(&self.writes).push((user_id.to_string(), record.clone()));
        Ok(())
    }

    fn list_users(&self) -> StoreResult<Vec<(String, UserRecord)>> {
        self.check_available()?;
        Ok(lock(&self.users)
            .iter()
            .map(|(id, r)| (id.clone(), r.clone()))
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}
