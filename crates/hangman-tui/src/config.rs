use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::env;
use std::path::PathBuf;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_ID: &str = "local-player";

/// Command line flags; every flag overrides its environment variable
#[derive(Debug, Default, Parser)]
#[command(name = "hangman", version, about = "Hangman in the terminal")]
pub struct Args {
    /// Storage backend environment (HANGMAN_ENV)
    #[arg(long, value_enum)]
    pub env: Option<Environment>,
    /// User id the score is stored under (HANGMAN_USER_ID)
    #[arg(long)]
    pub user_id: Option<String>,
    /// Name shown on the leaderboard (HANGMAN_USERNAME)
    #[arg(long)]
    pub username: Option<String>,
    /// Seed for word selection
    #[arg(long)]
    pub seed: Option<u64>,
    /// Where to write logs
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Local development - file-based storage
    Local,
    /// Testing - in-memory store
    Test,
    /// Production - hosted key-value store over REST
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") | Some("prod") => Environment::Production,
            Some("test") | Some("testing") => Environment::Test,
            _ => Environment::Local,
        }
    }
}

/// Hosted store connection settings
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
}

/// Who is playing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub user_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl PlayerConfig {
    /// Name to show in the header
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub remote: Option<RemoteConfig>,
    pub player: PlayerConfig,
    pub seed: Option<u64>,
    pub log_filter: String,
    pub log_file: PathBuf,
}

impl Config {
    /// Load from `.env`, the process environment and the command line
    pub fn load(args: &Args) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(args, |key| env::var(key).ok())
    }

    fn from_lookup(args: &Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = args
            .env
            .unwrap_or_else(|| Environment::parse(get("HANGMAN_ENV").as_deref()));

        let remote = match get("HANGMAN_DB_URL") {
            Some(base_url) => Some(RemoteConfig {
                base_url,
                auth_token: get("HANGMAN_DB_AUTH"),
                timeout_secs: get("HANGMAN_DB_TIMEOUT_SECS")
                    .map(|v| v.parse::<u64>())
                    .transpose()
                    .context("HANGMAN_DB_TIMEOUT_SECS must be a number")?
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            }),
            None => None,
        };
        if environment == Environment::Production && remote.is_none() {
            bail!("HANGMAN_DB_URL must be set in production");
        }

        let player = PlayerConfig {
            user_id: args
                .user_id
                .clone()
                .or_else(|| get("HANGMAN_USER_ID"))
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            username: args.username.clone().or_else(|| get("HANGMAN_USERNAME")),
            email: get("HANGMAN_EMAIL"),
        };

        let log_file = args.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("hangman.log")
        });

        Ok(Config {
            environment,
            remote,
            player,
            seed: args.seed,
            log_filter: get("HANGMAN_LOG").unwrap_or_else(|| "info".to_string()),
            log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(&Args::default(), lookup(&[])).unwrap();
        assert_eq!(config.environment, Environment::Local);
        assert!(config.remote.is_none());
        assert_eq!(config.player.user_id, DEFAULT_USER_ID);
        assert_eq!(config.log_filter, "info");
        assert!(config.log_file.ends_with("hangman.log"));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::parse(Some("prod")), Environment::Production);
        assert_eq!(Environment::parse(Some("testing")), Environment::Test);
        assert_eq!(Environment::parse(Some("whatever")), Environment::Local);
        assert_eq!(Environment::parse(None), Environment::Local);
    }

    #[test]
    fn test_production_requires_url() {
        let err = Config::from_lookup(&Args::default(), lookup(&[("HANGMAN_ENV", "production")]));
        assert!(err.is_err());

        let config = Config::from_lookup(
            &Args::default(),
            lookup(&[
                ("HANGMAN_ENV", "production"),
                ("HANGMAN_DB_URL", "https://hangman.example.com"),
                ("HANGMAN_DB_AUTH", "secret"),
            ]),
        )
        .unwrap();
        let remote = config.remote.unwrap();
        assert_eq!(remote.base_url, "https://hangman.example.com");
        assert_eq!(remote.auth_token.as_deref(), Some("secret"));
        assert_eq!(remote.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        let result = Config::from_lookup(
            &Args::default(),
            lookup(&[
                ("HANGMAN_DB_URL", "https://hangman.example.com"),
                ("HANGMAN_DB_TIMEOUT_SECS", "soon"),
            ]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_args_override_environment() {
        let args = Args {
            env: Some(Environment::Test),
            user_id: Some("cli-user".into()),
            username: Some("Cli".into()),
            seed: Some(3),
            log_file: Some(PathBuf::from("/tmp/h.log")),
        };
        let config = Config::from_lookup(
            &args,
            lookup(&[
                ("HANGMAN_ENV", "production"),
                ("HANGMAN_USER_ID", "env-user"),
                ("HANGMAN_USERNAME", "Env"),
                ("HANGMAN_EMAIL", "env@example.com"),
            ]),
        )
        .unwrap();
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.player.user_id, "cli-user");
        assert_eq!(config.player.username.as_deref(), Some("Cli"));
        assert_eq!(config.player.email.as_deref(), Some("env@example.com"));
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.log_file, PathBuf::from("/tmp/h.log"));
    }

    #[test]
    fn test_player_display_name() {
        let mut player = PlayerConfig {
            user_id: "u1".into(),
            username: None,
            email: None,
        };
        assert_eq!(player.display_name(), "u1");
        player.email = Some("p@example.com".into());
        assert_eq!(player.display_name(), "p@example.com");
        player.username = Some("Pat".into());
        assert_eq!(player.display_name(), "Pat");
    }
}
