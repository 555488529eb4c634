mod app;
mod config;
mod render;
mod store;
mod theme;
mod worker;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::{Args, Config};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hangman_core::{GameEngine, LeaderboardClient};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use worker::LeaderboardWorker;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;
    init_logging(&config)?;
    tracing::info!(env = ?config.environment, user = %config.player.user_id, "starting hangman");

    let store = store::create_store(&config)?;
    let worker = LeaderboardWorker::spawn(LeaderboardClient::new(store), config.player.clone())
        .context("failed to start leaderboard worker")?;
    let engine = match config.seed {
        Some(seed) => GameEngine::with_seed(seed),
        None => GameEngine::new(),
    };
    let app = App::new(engine, worker, config.player.display_name().to_string());

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run_app(&mut stdout, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    if let Err(ref e) = result {
        tracing::error!("terminal loop failed: {e}");
    }
    result.context("terminal error")
}

/// Logs go to a file; the terminal belongs to the game
fn init_logging(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;

    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid HANGMAN_LOG filter {:?}", config.log_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(stdout: &mut io::Stdout, mut app: App) -> io::Result<()> {
    let tick_rate = app.get_tick_rate();
    let mut last_tick = Instant::now();

    loop {
        render::render(stdout, &app)?;
        stdout.flush()?;

        // Wake for whichever comes first: the UI tick or the round clock
        let mut timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if let Some(clock) = app.until_next_tick(Instant::now()) {
            timeout = timeout.min(clock);
        }
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // Handle Ctrl+C
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        break;
                    }

                    match app.handle_key(key) {
                        app::AppAction::Continue => {}
                        app::AppAction::Quit => break,
                    }
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    tracing::info!(score = app.engine.state().score(), "exiting");
    // Dropping the app flushes queued leaderboard writes
    drop(app);
    Ok(())
}
