//! Hangman engine
//!
//! Five fixed levels of Spanish words, a two-minute clock per word, six
//! strikes per word, and a best-score leaderboard over a key-value store.

pub mod engine;
pub mod leaderboard;
pub mod levels;
pub mod timer;

pub use engine::{GameEngine, GamePhase, GameState, GuessOutcome, TickOutcome};
pub use leaderboard::{
    apply_score, rank_records, LeaderboardClient, LeaderboardError, MemoryStore, RankedScore,
    ScoreStore, StoreError, StoreResult, UserRecord, ANONYMOUS_USERNAME,
};
pub use levels::{
    format_time, level, normalize_letter, LevelDefinition, ALPHABET, LEVELS,
    LEVEL_TIME_LIMIT_SECS, MAX_LEVEL, MAX_WRONG_ATTEMPTS, POINTS_PER_LEVEL, WORDS_PER_LEVEL,
};
pub use timer::RoundTimer;
