use hangman_core::{
    GameEngine, GamePhase as CorePhase, GameState, GuessOutcome, RankedScore, UserRecord,
    ALPHABET, WORDS_PER_LEVEL,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

uniffi::setup_scaffolding!();

/// Where the current word round stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum GamePhase {
    Playing,
    WordWon,
    WordLost,
    LevelComplete,
    GameComplete,
    TimeExpired,
}

impl From<CorePhase> for GamePhase {
    fn from(p: CorePhase) -> Self {
        match p {
            CorePhase::Playing => GamePhase::Playing,
            CorePhase::WordWon => GamePhase::WordWon,
            CorePhase::WordLost => GamePhase::WordLost,
            CorePhase::LevelComplete => GamePhase::LevelComplete,
            CorePhase::GameComplete => GamePhase::GameComplete,
            CorePhase::TimeExpired => GamePhase::TimeExpired,
        }
    }
}

/// Result of guessing a letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum GuessResult {
    /// Not playing, or not a single alphabet letter
    Rejected,
    /// Already guessed this round
    Repeated,
    Hit,
    Miss,
    /// The miss that used up the last attempt
    WordLost,
    WordWon { points: u32 },
    LevelComplete { points: u32 },
    GameComplete { points: u32 },
}

impl From<GuessOutcome> for GuessResult {
    fn from(o: GuessOutcome) -> Self {
        match o {
            GuessOutcome::Rejected => GuessResult::Rejected,
            GuessOutcome::Repeated => GuessResult::Repeated,
            GuessOutcome::Hit => GuessResult::Hit,
            GuessOutcome::Miss => GuessResult::Miss,
            GuessOutcome::WordLost => GuessResult::WordLost,
            GuessOutcome::WordWon { points } => GuessResult::WordWon { points },
            GuessOutcome::LevelComplete { points } => GuessResult::LevelComplete { points },
            GuessOutcome::GameComplete { points } => GuessResult::GameComplete { points },
        }
    }
}

/// Everything a front-end needs to draw one frame
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct GameSnapshot {
    pub level: u8,
    /// Background image name for the level
    pub level_background: String,
    /// Guessed letters shown, the rest as `_`, separated by spaces
    pub masked_word: String,
    /// Only set once the round is over
    pub revealed_word: Option<String>,
    pub guessed_letters: Vec<String>,
    /// Letters still playable, in keyboard order
    pub unguessed_letters: Vec<String>,
    pub wrong_attempts: u8,
    pub attempts_left: u8,
    pub words_completed: u8,
    pub words_per_level: u8,
    pub score: u32,
    pub time_remaining: u32,
    /// `m:ss`
    pub time_remaining_text: String,
    pub phase: GamePhase,
}

impl From<&GameState> for GameSnapshot {
    fn from(state: &GameState) -> Self {
        Self {
            level: state.level(),
            level_background: state.level_definition().background.to_string(),
            masked_word: state.display_word(),
            revealed_word: state.revealed_word().map(str::to_string),
            guessed_letters: state.guessed_letters().iter().map(char::to_string).collect(),
            unguessed_letters: state
                .unguessed_letters()
                .iter()
                .map(char::to_string)
                .collect(),
            wrong_attempts: state.wrong_attempts(),
            attempts_left: state.attempts_left(),
            words_completed: state.words_completed(),
            words_per_level: WORDS_PER_LEVEL,
            score: state.score(),
            time_remaining: state.time_remaining(),
            time_remaining_text: state.time_remaining_string(),
            phase: state.phase().into(),
        }
    }
}

/// A user's leaderboard entry as the host's storage SDK sees it.
///
/// Fields beyond these stay with the host; write them back alongside.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ScoreRecord {
    pub user_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub score: Option<u32>,
    pub games_played: Option<u32>,
}

impl ScoreRecord {
    fn into_core(self) -> (String, UserRecord) {
        let record = UserRecord {
            username: self.username,
            email: self.email,
            score: self.score,
            games_played: self.games_played,
            ..Default::default()
        };
        (self.user_id, record)
    }

    fn from_core(user_id: String, record: UserRecord) -> Self {
        Self {
            user_id,
            username: record.username,
            email: record.email,
            score: record.score,
            games_played: record.games_played,
        }
    }
}

/// One row of the ranking
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct RankedEntry {
    pub user_id: String,
    /// Username, else email, else the anonymous label
    pub display_name: String,
    pub score: u32,
    pub games_played: u32,
}

impl From<RankedScore> for RankedEntry {
    fn from(r: RankedScore) -> Self {
        Self {
            user_id: r.id,
            display_name: r.username,
            score: r.score,
            games_played: r.games_played,
        }
    }
}

/// A hangman session driven by a mobile host.
///
/// The host owns the one-second clock and calls [`HangmanGame::tick`].
#[derive(uniffi::Object)]
pub struct HangmanGame {
    engine: Mutex<GameEngine>,
}

#[uniffi::export]
impl HangmanGame {
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            engine: Mutex::new(GameEngine::new()),
        })
    }

    /// Deterministic word picks, for replays and tests
    #[uniffi::constructor]
    pub fn with_seed(seed: u64) -> Arc<Self> {
        Arc::new(Self {
            engine: Mutex::new(GameEngine::with_seed(seed)),
        })
    }

    /// Guess a single letter; anything else is rejected
    pub fn guess_letter(&self, letter: String) -> GuessResult {
        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.engine().guess_letter(c).into(),
            _ => GuessResult::Rejected,
        }
    }

    /// One second of round time; returns the phase afterwards
    pub fn tick(&self) -> GamePhase {
        let mut engine = self.engine();
        engine.tick();
        engine.phase().into()
    }

    /// Next word or level after a win
    pub fn advance(&self) -> bool {
        self.engine().advance()
    }

    /// New word on the same level after a loss or timeout
    pub fn retry_word(&self) -> bool {
        self.engine().retry_word()
    }

    pub fn new_game(&self) {
        self.engine().new_game();
    }

    pub fn request_exit(&self) {
        self.engine().request_exit();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.engine().state().into()
    }

    pub fn phase(&self) -> GamePhase {
        self.engine().phase().into()
    }

    pub fn needs_leaderboard_view(&self) -> bool {
        self.engine().needs_leaderboard_view()
    }

    pub fn needs_restart(&self) -> bool {
        self.engine().needs_restart()
    }

    pub fn needs_exit(&self) -> bool {
        self.engine().needs_exit()
    }
}

impl HangmanGame {
    fn engine(&self) -> MutexGuard<'_, GameEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The 27 keyboard letters, Ñ included
#[uniffi::export]
pub fn alphabet() -> Vec<String> {
    ALPHABET.iter().map(char::to_string).collect()
}

/// Seconds as `m:ss`
#[uniffi::export]
pub fn format_time(seconds: u32) -> String {
    hangman_core::format_time(seconds)
}

/// Fold a finished game's score into a user's entry.
///
/// Keeps the best score and counts the game. The host reads the entry,
/// calls this, then writes the result back.
#[uniffi::export]
pub fn merge_score(user_id: String, existing: Option<ScoreRecord>, new_score: u32) -> ScoreRecord {
    let existing = existing.map(|r| r.into_core().1);
    ScoreRecord::from_core(user_id, hangman_core::apply_score(existing, new_score))
}

/// Order entries best score first, dropping those that never scored
#[uniffi::export]
pub fn rank_scores(records: Vec<ScoreRecord>) -> Vec<RankedEntry> {
    let records = records.into_iter().map(ScoreRecord::into_core).collect();
    hangman_core::rank_records(records)
        .into_iter()
        .map(RankedEntry::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, score: Option<u32>) -> ScoreRecord {
        ScoreRecord {
            user_id: id.into(),
            username: Some(id.to_uppercase()),
            email: None,
            score,
            games_played: score.map(|_| 1),
        }
    }

    #[test]
    fn test_guess_requires_single_letter() {
        let game = HangmanGame::with_seed(1);
        assert_eq!(game.guess_letter(String::new()), GuessResult::Rejected);
        assert_eq!(game.guess_letter("AB".into()), GuessResult::Rejected);
        assert_eq!(game.guess_letter("7".into()), GuessResult::Rejected);

        let word = game.snapshot();
        assert_eq!(word.revealed_word, None);
        assert!(game.guess_letter("ñ".into()) != GuessResult::Rejected);
        assert_eq!(game.guess_letter("Ñ".into()), GuessResult::Repeated);
        assert!(game.snapshot().guessed_letters.contains(&"Ñ".to_string()));
    }

    #[test]
    fn test_snapshot_tracks_the_round() {
        let game = HangmanGame::with_seed(2);
        let snap = game.snapshot();
        assert_eq!(snap.level, 1);
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.time_remaining_text, "2:00");
        assert_eq!(snap.unguessed_letters.len(), 27);
        assert_eq!(snap.words_per_level, 3);
        assert!(snap.masked_word.chars().all(|c| c == '_' || c == ' '));

        assert_eq!(game.tick(), GamePhase::Playing);
        assert_eq!(game.snapshot().time_remaining, 119);
    }

    #[test]
    fn test_timeout_then_retry() {
        let game = HangmanGame::with_seed(3);
        let mut phase = GamePhase::Playing;
        for _ in 0..120 {
            phase = game.tick();
        }
        assert_eq!(phase, GamePhase::TimeExpired);
        assert!(game.needs_restart());
        assert!(game.needs_leaderboard_view());
        assert!(game.snapshot().revealed_word.is_some());

        assert!(game.retry_word());
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(!game.advance());
    }

    #[test]
    fn test_exit_and_new_game() {
        let game = HangmanGame::with_seed(4);
        game.request_exit();
        assert!(game.needs_exit());
        game.new_game();
        assert!(!game.needs_exit());
    }

    #[test]
    fn test_merge_score_sequence() {
        let first = merge_score("u".into(), None, 50);
        assert_eq!(first.score, Some(50));
        assert_eq!(first.games_played, Some(1));

        let second = merge_score("u".into(), Some(first), 30);
        assert_eq!(second.score, Some(50));
        assert_eq!(second.games_played, Some(2));

        let third = merge_score("u".into(), Some(second), 80);
        assert_eq!(third.score, Some(80));
        assert_eq!(third.games_played, Some(3));
        assert_eq!(third.user_id, "u");
    }

    #[test]
    fn test_rank_scores() {
        let ranked = rank_scores(vec![
            record("a", Some(10)),
            record("b", Some(50)),
            record("idle", None),
            record("c", Some(30)),
        ]);
        let scores: Vec<u32> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![50, 30, 10]);
        assert_eq!(ranked[0].display_name, "B");
        assert_eq!(ranked[0].user_id, "b");
    }

    #[test]
    fn test_helpers() {
        let letters = alphabet();
        assert_eq!(letters.len(), 27);
        assert_eq!(letters[14], "Ñ");
        assert_eq!(format_time(65), "1:05");
    }
}
