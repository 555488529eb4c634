//! Storage backends for the leaderboard
//!
//! Picks a backend based on environment:
//! - Local: JSON file under the user's data directory
//! - Test: in-memory store
//! - Production: hosted key-value store over its REST API

use crate::config::{Config, Environment, RemoteConfig};
use anyhow::{Context, Result};
use hangman_core::{MemoryStore, ScoreStore, StoreError, StoreResult, UserRecord};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

// ==================== Local File Backend ====================

/// File-based store for development
pub struct LocalStore {
    path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, UserRecord>>>,
}

impl LocalStore {
    pub fn new() -> Self {
        let path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hangman_users.json");
        Self::with_path(path)
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            cache: Mutex::new(None),
        }
    }

    fn load(&self) -> StoreResult<BTreeMap<String, UserRecord>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ref users) = *cache {
            return Ok(users.clone());
        }

        let users = match std::fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| StoreError::Malformed(format!("{}: {e}", self.path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        *cache = Some(users.clone());
        Ok(users)
    }

    fn save(&self, users: &BTreeMap<String, UserRecord>) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(users)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        std::fs::write(&self.path, json).map_err(|e| StoreError::Io(e.to_string()))?;

        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(users.clone());
        Ok(())
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for LocalStore {
    fn get_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.load()?.remove(user_id))
    }

    fn set_user(&self, user_id: &str, record: &UserRecord) -> StoreResult<()> {
        let mut users = self.load()?;
        users.insert(user_id.to_string(), record.clone());
        self.save(&users)
    }

    fn list_users(&self) -> StoreResult<Vec<(String, UserRecord)>> {
        Ok(self.load()?.into_iter().collect())
    }

    fn backend_name(&self) -> &'static str {
        "Local"
    }
}

// ==================== Remote REST Backend ====================

/// Hosted key-value store reached over its REST API.
///
/// Paths map to `{base_url}/{path}.json`; a missing node reads as JSON
/// `null`. Path segments such as user ids are percent-encoded.
pub struct RestStore {
    base_url: Url,
    auth_token: Option<String>,
    client: Client,
}

impl RestStore {
    pub fn new(config: &RemoteConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StoreError::Transport(format!("invalid store url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Transport(format!(
                "store url {base_url} cannot hold a path"
            )));
        }

        Ok(Self {
            base_url,
            auth_token: config.auth_token.clone(),
            client,
        })
    }

    /// `{base_url}/{segments...}.json`
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let (Ok(mut path), Some((last, parents))) =
            (url.path_segments_mut(), segments.split_last())
        {
            path.pop_if_empty().extend(parents).push(&format!("{last}.json"));
        }
        url
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.auth_token {
            Some(ref token) => builder.query(&[("auth", token)]),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder) -> StoreResult<Response> {
        let response = self.authed(builder).send().map_err(classify)?;
        response
            .error_for_status()
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    fn read_users(&self, ordered: bool) -> StoreResult<Response> {
        let mut request = self.client.get(self.url(&["users"]));
        if ordered {
            request = request.query(&[("orderBy", "\"score\"")]);
        }
        let response = self.authed(request).send().map_err(classify)?;
        if ordered && response.status() == StatusCode::BAD_REQUEST {
            // Server-side ordering needs an index; plain reads don't
            tracing::warn!("ordered read rejected, reading users unordered");
            return self.read_users(false);
        }
        response
            .error_for_status()
            .map_err(|e| StoreError::Transport(e.to_string()))
    }
}

fn classify(e: reqwest::Error) -> StoreError {
    if e.is_connect() || e.is_timeout() {
        StoreError::Unavailable(e.to_string())
    } else if e.is_decode() {
        StoreError::Malformed(e.to_string())
    } else {
        StoreError::Transport(e.to_string())
    }
}

type UsersBody = Option<serde_json::Map<String, serde_json::Value>>;

/// Decode the `users` collection, skipping entries that aren't records
fn parse_users(body: UsersBody) -> Vec<(String, UserRecord)> {
    body.unwrap_or_default()
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<UserRecord>(value) {
            Ok(record) => Some((id, record)),
            Err(e) => {
                tracing::warn!(user_id = %id, "skipping malformed user record: {e}");
                None
            }
        })
        .collect()
}

impl ScoreStore for RestStore {
    fn get_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        let response = self.send(self.client.get(self.url(&["users", user_id])))?;
        response.json::<Option<UserRecord>>().map_err(classify)
    }

    fn set_user(&self, user_id: &str, record: &UserRecord) -> StoreResult<()> {
        self.send(
            self.client
                .put(self.url(&["users", user_id]))
                .json(record),
        )?;
        Ok(())
    }

    fn list_users(&self) -> StoreResult<Vec<(String, UserRecord)>> {
        let body = self
            .read_users(true)?
            .json::<UsersBody>()
            .map_err(classify)?;
        Ok(parse_users(body))
    }

    fn backend_name(&self) -> &'static str {
        "Remote"
    }
}

// ==================== Backend Factory ====================

/// Create the store for the configured environment
pub fn create_store(config: &Config) -> Result<Arc<dyn ScoreStore>> {
    let store: Arc<dyn ScoreStore> = match config.environment {
        Environment::Local => Arc::new(LocalStore::new()),
        Environment::Test => Arc::new(MemoryStore::new()),
        Environment::Production => {
            let remote = config
                .remote
                .as_ref()
                .context("production store needs a remote configuration")?;
            Arc::new(RestStore::new(remote).context("failed to build HTTP client")?)
        }
    };
    tracing::info!(backend = store.backend_name(), "leaderboard store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_store_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let store = LocalStore::with_path(path.clone());
        assert!(store.get_user("u").unwrap().is_none());
        assert!(store.list_users().unwrap().is_empty());

        let record = UserRecord {
            username: Some("ana".into()),
            score: Some(200),
            games_played: Some(1),
            ..Default::default()
        };
        store.set_user("u", &record).unwrap();

        // A fresh store reads what the first one wrote
        let reopened = LocalStore::with_path(path);
        assert_eq!(reopened.get_user("u").unwrap(), Some(record));
        assert_eq!(reopened.list_users().unwrap().len(), 1);
        assert_eq!(reopened.backend_name(), "Local");
    }

    #[test]
    fn test_local_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "not json").unwrap();

        let store = LocalStore::with_path(path);
        assert!(matches!(
            store.list_users(),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_users_skips_bad_entries() {
        let body = json!({
            "a": { "username": "ana", "score": 10 },
            "b": "not a record",
            "c": { "score": "high" },
            "d": { "email": "d@example.com" }
        });
        let map = body.as_object().cloned();
        let users = parse_users(map);
        let ids: Vec<&str> = users.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert!(parse_users(None).is_empty());
    }

    #[test]
    fn test_rest_urls() {
        let store = RestStore::new(&RemoteConfig {
            base_url: "https://hangman.example.com/".into(),
            auth_token: None,
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(
            store.url(&["users", "abc"]).as_str(),
            "https://hangman.example.com/users/abc.json"
        );
        assert_eq!(
            store.url(&["users"]).as_str(),
            "https://hangman.example.com/users.json"
        );
        assert_eq!(store.backend_name(), "Remote");
    }

    #[test]
    fn test_rest_user_ids_stay_in_one_segment() {
        let store = RestStore::new(&RemoteConfig {
            base_url: "https://hangman.example.com/db".into(),
            auth_token: None,
            timeout_secs: 1,
        })
        .unwrap();
        let url = store.url(&["users", "a/b?c#d"]);
        assert_eq!(
            url.as_str(),
            "https://hangman.example.com/db/users/a%2Fb%3Fc%23d.json"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_rest_rejects_bad_base_url() {
        for base_url in ["not a url", "mailto:someone@example.com"] {
            let result = RestStore::new(&RemoteConfig {
                base_url: base_url.into(),
                auth_token: None,
                timeout_secs: 1,
            });
            assert!(matches!(result, Err(StoreError::Transport(_))), "{base_url}");
        }
    }
}
