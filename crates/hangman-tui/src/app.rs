use crate::theme::Theme;
use crate::worker::{LeaderboardWorker, Reply};
use crossterm::event::{KeyCode, KeyEvent};
use hangman_core::{
    normalize_letter, GameEngine, GamePhase, GuessOutcome, RankedScore, RoundTimer, TickOutcome,
    ALPHABET,
};
use std::time::{Duration, Instant};

/// How long a won word or level stays on screen before moving on
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

/// Keys per row of the on-screen keyboard
pub const KEYBOARD_COLUMNS: usize = 9;

/// ~3 seconds at the 100ms tick rate
const MESSAGE_TICKS: u32 = 30;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Normal gameplay
    Playing,
    /// Ranking overlay; the round clock is paused
    Leaderboard,
    /// "Are you sure?" prompt; the round clock is paused
    ConfirmExit,
}

/// What the ranking screen has to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardView {
    Loading,
    Loaded(Vec<RankedScore>),
    /// The read failed; shown as an empty board
    Unavailable,
}

/// The main application state
pub struct App {
    pub engine: GameEngine,
    timer: RoundTimer,
    pub theme: Theme,
    /// Index into [`ALPHABET`] of the highlighted key
    pub keyboard_cursor: usize,
    /// Message to display
    pub message: Option<String>,
    message_timer: u32,
    pub screen_state: ScreenState,
    pub leaderboard: LeaderboardView,
    /// When a won word or level moves on by itself
    advance_at: Option<Instant>,
    worker: LeaderboardWorker,
    pub player_name: String,
    /// Whether the current outcome has been sent to the leaderboard
    game_recorded: bool,
}

impl App {
    pub fn new(engine: GameEngine, worker: LeaderboardWorker, player_name: String) -> Self {
        let mut timer = RoundTimer::new();
        timer.arm(Instant::now());
        Self {
            engine,
            timer,
            theme: Theme::dark(),
            keyboard_cursor: 0,
            message: None,
            message_timer: 0,
            screen_state: ScreenState::Playing,
            leaderboard: LeaderboardView::Loading,
            advance_at: None,
            worker,
            player_name,
            game_recorded: false,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.worker.backend_name()
    }

    pub fn get_tick_rate(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Time until the round clock next needs a tick, if it is running
    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.timer.until_next_tick(now)
    }

    /// Letter under the keyboard cursor
    pub fn selected_letter(&self) -> char {
        ALPHABET[self.keyboard_cursor]
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = MESSAGE_TICKS;
    }

    /// Update timers and collect leaderboard replies (called every tick)
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        while let Some(reply) = self.worker.try_recv() {
            self.on_reply(reply);
        }

        if self.screen_state != ScreenState::Playing {
            return;
        }

        for _ in 0..self.timer.due_ticks(now) {
            if self.engine.tick() == TickOutcome::Expired {
                self.on_round_end(now);
                break;
            }
        }

        if self.advance_at.is_some_and(|at| now >= at) {
            self.advance(now);
        }
    }

    fn on_reply(&mut self, reply: Reply) {
        match reply {
            Reply::Scores(scores) => self.leaderboard = LeaderboardView::Loaded(scores),
            Reply::FetchFailed(reason) => {
                tracing::debug!(%reason, "showing empty leaderboard");
                self.leaderboard = LeaderboardView::Unavailable;
            }
            Reply::Recorded { ok: false, .. } => {
                self.show_message("No se pudo guardar la puntuación");
            }
            Reply::Recorded { score, ok: true } => {
                tracing::debug!(score, "score saved");
            }
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        self.handle_key_at(key, Instant::now())
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) -> AppAction {
        match self.screen_state {
            ScreenState::Playing => self.handle_game_key(key, now),
            ScreenState::Leaderboard => self.handle_leaderboard_key(key, now),
            ScreenState::ConfirmExit => self.handle_confirm_key(key, now),
        }
    }

    fn handle_game_key(&mut self, key: KeyEvent, now: Instant) -> AppAction {
        let phase = self.engine.phase();
        match key.code {
            KeyCode::Esc => {
                self.screen_state = ScreenState::ConfirmExit;
                self.timer.cancel();
            }
            KeyCode::Tab => self.open_leaderboard(),
            KeyCode::F(2) => {
                self.theme = self.theme.next();
                let msg = format!("Tema: {}", self.theme.name);
                self.show_message(&msg);
            }

            // Keyboard navigation
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Up => self.move_cursor(-(KEYBOARD_COLUMNS as isize)),
            KeyCode::Down => self.move_cursor(KEYBOARD_COLUMNS as isize),

            KeyCode::Char(' ') | KeyCode::Enter if phase == GamePhase::Playing => {
                self.guess(self.selected_letter(), now);
            }
            KeyCode::Enter => self.continue_from(phase, now),
            KeyCode::Char('n') | KeyCode::Char('N') if phase.is_terminal() => {
                self.new_game(now);
                self.show_message("Nuevo juego");
            }
            KeyCode::Char(c) if phase == GamePhase::Playing => {
                if let Some(letter) = normalize_letter(c) {
                    self.guess(letter, now);
                }
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_leaderboard_key(&mut self, key: KeyEvent, now: Instant) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Tab | KeyCode::Enter | KeyCode::Char('q') => {
                self.back_to_game(now);
            }
            KeyCode::Char('r') => {
                self.leaderboard = LeaderboardView::Loading;
                self.worker.fetch();
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, now: Instant) -> AppAction {
        match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('y') | KeyCode::Enter => {
                self.engine.request_exit();
                if self.engine.needs_exit() {
                    tracing::info!(score = self.engine.state().score(), "player left the game");
                    return AppAction::Quit;
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.back_to_game(now),
            _ => {}
        }
        AppAction::Continue
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = ALPHABET.len() as isize;
        let next = (self.keyboard_cursor as isize + delta).rem_euclid(len);
        self.keyboard_cursor = next as usize;
    }

    fn guess(&mut self, letter: char, now: Instant) {
        match self.engine.guess_letter(letter) {
            GuessOutcome::Rejected | GuessOutcome::Hit => {}
            GuessOutcome::Repeated => {
                self.show_message(&format!("Ya probaste la {letter}"));
            }
            GuessOutcome::Miss => {
                let left = self.engine.state().attempts_left();
                self.show_message(&format!(
                    "La {letter} no está. {left} {} restantes",
                    if left == 1 { "intento" } else { "intentos" }
                ));
            }
            GuessOutcome::WordLost
            | GuessOutcome::WordWon { .. }
            | GuessOutcome::LevelComplete { .. }
            | GuessOutcome::GameComplete { .. } => self.on_round_end(now),
        }
    }

    /// Enter outside of play: skip the auto-advance wait, retry, or restart
    fn continue_from(&mut self, phase: GamePhase, now: Instant) {
        if phase.auto_advances() {
            self.advance(now);
        } else if self.engine.needs_restart() {
            if self.engine.retry_word() {
                self.start_round(now);
            }
        } else if phase == GamePhase::GameComplete {
            self.new_game(now);
        }
    }

    fn on_round_end(&mut self, now: Instant) {
        self.timer.cancel();
        let phase = self.engine.phase();
        if phase.auto_advances() {
            self.advance_at = Some(now + AUTO_ADVANCE_DELAY);
        }
        if self.engine.needs_leaderboard_view() {
            self.record_outcome();
        }
    }

    /// Send the session score to the leaderboard, once per outcome
    fn record_outcome(&mut self) {
        if self.game_recorded {
            return;
        }
        self.game_recorded = true;
        let score = self.engine.state().score();
        tracing::info!(score, phase = ?self.engine.phase(), "recording score");
        self.worker.record(score);
    }

    fn advance(&mut self, now: Instant) {
        self.advance_at = None;
        if self.engine.advance() {
            self.start_round(now);
        }
    }

    fn new_game(&mut self, now: Instant) {
        self.engine.new_game();
        self.start_round(now);
    }

    fn start_round(&mut self, now: Instant) {
        self.advance_at = None;
        self.game_recorded = false;
        self.timer.arm(now);
    }

    fn open_leaderboard(&mut self) {
        self.screen_state = ScreenState::Leaderboard;
        self.leaderboard = LeaderboardView::Loading;
        self.timer.cancel();
        self.worker.fetch();
    }

    fn back_to_game(&mut self, now: Instant) {
        self.screen_state = ScreenState::Playing;
        self.sync_timer(now);
    }

    /// Re-arm the clock if the round on screen is still running
    fn sync_timer(&mut self, now: Instant) {
        if self.engine.phase() == GamePhase::Playing && !self.timer.is_armed() {
            self.timer.arm(now);
        }
    }
}
