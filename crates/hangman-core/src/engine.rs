use crate::levels::{
    self, format_time, normalize_letter, LevelDefinition, ALPHABET, LEVEL_TIME_LIMIT_SECS,
    MASK_PLACEHOLDER, MAX_LEVEL, MAX_WRONG_ATTEMPTS, WORDS_PER_LEVEL,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeSet;

/// Where the current word round stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Accepting guesses and ticks
    Playing,
    /// Word solved, more words left on this level
    WordWon,
    /// Six strikes; word revealed
    WordLost,
    /// Third word solved on a level below the last
    LevelComplete,
    /// Third word solved on the last level
    GameComplete,
    /// Clock ran out; score kept
    TimeExpired,
}

impl GamePhase {
    /// Phases that move on by themselves via [`GameEngine::advance`]
    pub fn auto_advances(self) -> bool {
        matches!(self, GamePhase::WordWon | GamePhase::LevelComplete)
    }

    /// Phases that wait for an explicit restart action
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GamePhase::WordLost | GamePhase::GameComplete | GamePhase::TimeExpired
        )
    }
}

/// Result of a single guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Not playing, or not a letter of the alphabet
    Rejected,
    /// Letter was already guessed this round
    Repeated,
    /// Letter is in the word, word not finished yet
    Hit,
    /// Letter is not in the word
    Miss,
    /// Miss that used up the last attempt
    WordLost,
    /// Word solved
    WordWon { points: u32 },
    /// Word solved and the level cleared
    LevelComplete { points: u32 },
    /// Word solved and the last level cleared
    GameComplete { points: u32 },
}

/// Result of a one-second timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Round not playing; nothing changed
    Idle,
    /// Seconds left after this tick
    Ticked(u32),
    /// Clock reached zero on this tick
    Expired,
}

/// Snapshot of one word round within a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    level: u8,
    word: String,
    guessed: BTreeSet<char>,
    wrong_attempts: u8,
    words_completed: u8,
    score: u32,
    time_remaining: u32,
    phase: GamePhase,
}

impl GameState {
    fn fresh_round(level: u8, word: &str, words_completed: u8, score: u32) -> Self {
        Self {
            level,
            word: word.to_string(),
            guessed: BTreeSet::new(),
            wrong_attempts: 0,
            words_completed,
            score,
            time_remaining: LEVEL_TIME_LIMIT_SECS,
            phase: GamePhase::Playing,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn level_definition(&self) -> &'static LevelDefinition {
        levels::level(self.level)
    }

    /// The target word, regardless of phase (front-ends should prefer
    /// [`GameState::revealed_word`])
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The target word once the round is over
    pub fn revealed_word(&self) -> Option<&str> {
        (self.phase != GamePhase::Playing).then_some(self.word.as_str())
    }

    pub fn guessed_letters(&self) -> &BTreeSet<char> {
        &self.guessed
    }

    pub fn is_guessed(&self, letter: char) -> bool {
        self.guessed.contains(&letter)
    }

    /// Alphabet letters still available, in keyboard order
    pub fn unguessed_letters(&self) -> Vec<char> {
        ALPHABET
            .iter()
            .copied()
            .filter(|c| !self.guessed.contains(c))
            .collect()
    }

    pub fn wrong_attempts(&self) -> u8 {
        self.wrong_attempts
    }

    pub fn attempts_left(&self) -> u8 {
        MAX_WRONG_ATTEMPTS.saturating_sub(self.wrong_attempts)
    }

    pub fn words_completed(&self) -> u8 {
        self.words_completed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Remaining time as `m:ss`
    pub fn time_remaining_string(&self) -> String {
        format_time(self.time_remaining)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Every letter of the word has been guessed
    pub fn is_word_solved(&self) -> bool {
        self.word.chars().all(|c| self.guessed.contains(&c))
    }

    /// Each character of the word, or a placeholder if not yet guessed
    pub fn display_mask(&self) -> Vec<char> {
        self.word
            .chars()
            .map(|c| {
                if self.guessed.contains(&c) {
                    c
                } else {
                    MASK_PLACEHOLDER
                }
            })
            .collect()
    }

    /// The mask spaced out for display, e.g. `S _ L`
    pub fn display_word(&self) -> String {
        let mut out = String::with_capacity(self.word.len() * 2);
        for (i, c) in self.display_mask().into_iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push(c);
        }
        out
    }
}

/// Level progression, word rounds and scoring for one player session.
///
/// All state changes go through the methods here. Guesses and ticks are
/// only processed while the round is [`GamePhase::Playing`], so whichever
/// of the strike limit or the clock ends a round first wins and the other
/// becomes a no-op.
pub struct GameEngine {
    state: GameState,
    rng: StdRng,
    exit_requested: bool,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine {
    /// Start a session at level 1 with an entropy-seeded word picker
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Start a session with a deterministic word picker
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let word = pick_word(&mut rng, levels::level(1));
        let state = GameState::fresh_round(1, word, 0, 0);
        tracing::info!(level = 1, "new game");
        Self {
            state,
            rng,
            exit_requested: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Begin a new word round on `level`.
    ///
    /// Clears guesses, strikes and the clock. Words completed and score
    /// carry over unless the level changes or its count is already full,
    /// in which case the per-level count starts again from zero.
    pub fn start_new_word_round(&mut self, level: u8) {
        let level = level.clamp(1, MAX_LEVEL);
        let words_completed = if level == self.state.level
            && self.state.words_completed < WORDS_PER_LEVEL
        {
            self.state.words_completed
        } else {
            0
        };
        let word = pick_word(&mut self.rng, levels::level(level));
        self.state = GameState::fresh_round(level, word, words_completed, self.state.score);
        tracing::debug!(level, letters = word.chars().count(), "new word round");
    }

    /// Guess one letter of the current word
    pub fn guess_letter(&mut self, letter: char) -> GuessOutcome {
        if self.state.phase != GamePhase::Playing {
            return GuessOutcome::Rejected;
        }
        let Some(letter) = normalize_letter(letter) else {
            return GuessOutcome::Rejected;
        };
        if !self.state.guessed.insert(letter) {
            return GuessOutcome::Repeated;
        }

        if !self.state.word.contains(letter) {
            self.state.wrong_attempts += 1;
            tracing::debug!(%letter, wrong = self.state.wrong_attempts, "miss");
            if self.state.wrong_attempts >= MAX_WRONG_ATTEMPTS {
                self.state.phase = GamePhase::WordLost;
                tracing::info!(level = self.state.level, word = %self.state.word, "word lost");
                return GuessOutcome::WordLost;
            }
            return GuessOutcome::Miss;
        }

        tracing::debug!(%letter, "hit");
        if !self.state.is_word_solved() {
            return GuessOutcome::Hit;
        }

        let def = self.state.level_definition();
        let points = def.points_per_word();
        self.state.score += points;
        self.state.words_completed += 1;
        tracing::info!(
            level = def.number,
            points,
            score = self.state.score,
            words = self.state.words_completed,
            "word solved"
        );

        if self.state.words_completed < WORDS_PER_LEVEL {
            self.state.phase = GamePhase::WordWon;
            GuessOutcome::WordWon { points }
        } else if def.is_final() {
            self.state.phase = GamePhase::GameComplete;
            tracing::info!(score = self.state.score, "game complete");
            GuessOutcome::GameComplete { points }
        } else {
            self.state.phase = GamePhase::LevelComplete;
            tracing::info!(level = def.number, "level complete");
            GuessOutcome::LevelComplete { points }
        }
    }

    /// Advance the round clock by one second
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.phase != GamePhase::Playing {
            return TickOutcome::Idle;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        if self.state.time_remaining == 0 {
            self.state.phase = GamePhase::TimeExpired;
            tracing::info!(level = self.state.level, score = self.state.score, "time expired");
            return TickOutcome::Expired;
        }
        TickOutcome::Ticked(self.state.time_remaining)
    }

    /// Move on from `WordWon` (next word) or `LevelComplete` (next level).
    ///
    /// Returns whether anything happened.
    pub fn advance(&mut self) -> bool {
        match self.state.phase {
            GamePhase::WordWon => {
                self.start_new_word_round(self.state.level);
                true
            }
            GamePhase::LevelComplete => {
                let next = self.state.level + 1;
                tracing::info!(level = next, "entering level");
                self.start_new_word_round(next);
                true
            }
            _ => false,
        }
    }

    /// Try another word on the same level after a loss or a timeout
    pub fn retry_word(&mut self) -> bool {
        match self.state.phase {
            GamePhase::WordLost | GamePhase::TimeExpired => {
                self.start_new_word_round(self.state.level);
                true
            }
            _ => false,
        }
    }

    /// Throw the session away and start again from level 1
    pub fn new_game(&mut self) {
        let word = pick_word(&mut self.rng, levels::level(1));
        self.state = GameState::fresh_round(1, word, 0, 0);
        self.exit_requested = false;
        tracing::info!(level = 1, "new game");
    }

    /// Player asked to leave the game
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Outcome the caller should offer a ranking view for
    pub fn needs_leaderboard_view(&self) -> bool {
        self.state.phase.is_terminal()
    }

    /// Outcome that can be retried on the same level
    pub fn needs_restart(&self) -> bool {
        matches!(
            self.state.phase,
            GamePhase::WordLost | GamePhase::TimeExpired
        )
    }

    pub fn needs_exit(&self) -> bool {
        self.exit_requested
    }
}

fn pick_word(rng: &mut StdRng, def: &LevelDefinition) -> &'static str {
    def.words[rng.gen_range(0..def.words.len())]
}
