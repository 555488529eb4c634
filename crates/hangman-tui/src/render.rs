use crate::app::{App, LeaderboardView, ScreenState, KEYBOARD_COLUMNS};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use hangman_core::{GameEngine, GamePhase, ALPHABET, WORDS_PER_LEVEL};
use std::io;

const GALLOWS_TOP: u16 = 5;
const WORD_ROW: u16 = 14;
const KEYBOARD_ROW: u16 = 16;
const BANNER_ROW: u16 = 23;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(
        stdout,
        Hide,
        SetBackgroundColor(app.theme.bg),
        Clear(ClearType::All)
    )?;

    match app.screen_state {
        ScreenState::Playing => render_game_screen(stdout, app, term_width, term_height)?,
        ScreenState::Leaderboard => render_leaderboard_screen(stdout, app, term_width)?,
        ScreenState::ConfirmExit => {
            render_game_screen(stdout, app, term_width, term_height)?;
            render_confirm_exit(stdout, app, term_width, term_height)?;
        }
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

/// Column that centres `text` on a terminal `term_width` wide
fn center_x(term_width: u16, text: &str) -> u16 {
    term_width.saturating_sub(text.chars().count() as u16) / 2
}

fn print_centered(
    stdout: &mut io::Stdout,
    text: &str,
    y: u16,
    color: Color,
    term_width: u16,
) -> io::Result<()> {
    execute!(
        stdout,
        MoveTo(center_x(term_width, text), y),
        SetForegroundColor(color),
        Print(text)
    )
}

fn render_game_screen(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let state = app.engine.state();

    print_centered(stdout, "═══ AHORCADO ═══", 1, theme.key, term_width)?;
    print_centered(stdout, &header_line(&app.engine), 2, theme.fg, term_width)?;
    let who = format!(
        "{} · {} · {}",
        app.player_name,
        app.backend_name(),
        state.level_definition().background
    );
    print_centered(stdout, &who, 3, theme.info, term_width)?;

    let strikes = state.wrong_attempts();
    let figure_color = if strikes == 0 { theme.border } else { theme.figure };
    let gallows = gallows_lines(strikes);
    let width = gallows.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let gallows_x = term_width.saturating_sub(width as u16) / 2;
    for (i, line) in gallows.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(gallows_x, GALLOWS_TOP + i as u16),
            SetForegroundColor(figure_color),
            Print(line)
        )?;
    }
    let attempts = format!("Intentos restantes: {}", state.attempts_left());
    print_centered(
        stdout,
        &attempts,
        GALLOWS_TOP + gallows.len() as u16 + 1,
        theme.info,
        term_width,
    )?;

    let word = match (state.phase(), state.revealed_word()) {
        (GamePhase::WordLost | GamePhase::TimeExpired, Some(word)) => {
            let spaced: Vec<String> = word.chars().map(String::from).collect();
            (spaced.join(" "), theme.error)
        }
        _ => (state.display_word(), theme.letter),
    };
    print_centered(stdout, &word.0, WORD_ROW, word.1, term_width)?;

    render_keyboard(stdout, app, term_width)?;

    if let Some(lines) = banner_lines(&app.engine) {
        for (i, line) in lines.iter().enumerate() {
            let color = match (i, state.phase()) {
                (0, GamePhase::WordLost | GamePhase::TimeExpired) => theme.error,
                (0, _) => theme.success,
                _ => theme.info,
            };
            print_centered(stdout, line, BANNER_ROW + i as u16, color, term_width)?;
        }
    }

    let controls = "Letras: adivinar  ←→↑↓ + Espacio: teclado  Tab: 🏆 Ranking  F2: tema  Esc: 🚪 Salir";
    let controls_y = term_height.saturating_sub(2).max(BANNER_ROW + 4);
    print_centered(stdout, controls, controls_y, theme.info, term_width)?;

    Ok(())
}

/// `Nivel 2   ⏱ 1:45   Puntuación: 300   Palabras: 1/3`
fn header_line(engine: &GameEngine) -> String {
    let state = engine.state();
    format!(
        "Nivel {}   ⏱ {}   Puntuación: {}   Palabras: {}/{}",
        state.level(),
        state.time_remaining_string(),
        state.score(),
        state.words_completed(),
        WORDS_PER_LEVEL
    )
}

fn render_keyboard(stdout: &mut io::Stdout, app: &App, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    let state = app.engine.state();
    let playing = state.phase() == GamePhase::Playing;
    // Each key is " X " plus a one-column gap
    let row_width = (KEYBOARD_COLUMNS * 4 - 1) as u16;
    let x = term_width.saturating_sub(row_width) / 2;

    for (i, &letter) in ALPHABET.iter().enumerate() {
        let row = (i / KEYBOARD_COLUMNS) as u16;
        let col = (i % KEYBOARD_COLUMNS) as u16;
        let fg = if !state.is_guessed(letter) {
            theme.fg
        } else if state.word().contains(letter) {
            theme.success
        } else {
            theme.used_key
        };
        let bg = if playing && i == app.keyboard_cursor {
            theme.selected_bg
        } else {
            theme.bg
        };
        execute!(
            stdout,
            MoveTo(x + col * 4, KEYBOARD_ROW + row * 2),
            SetBackgroundColor(bg),
            SetForegroundColor(fg),
            Print(format!(" {letter} ")),
            SetBackgroundColor(theme.bg)
        )?;
    }
    Ok(())
}

/// Hangman figure for `strikes` wrong guesses: head, body, arms, legs
pub fn gallows_lines(strikes: u8) -> [String; 7] {
    let part = |n: u8, c: char| if strikes >= n { c } else { ' ' };
    [
        "  +---+".to_string(),
        "  |   |".to_string(),
        format!("  {}   |", part(1, 'O')),
        format!(" {}{}{}  |", part(3, '/'), part(2, '|'), part(4, '\\')),
        format!(" {} {}  |", part(5, '/'), part(6, '\\')),
        "      |".to_string(),
        "=========".to_string(),
    ]
}

/// Outcome text plus the keys that lead on from it
pub fn banner_lines(engine: &GameEngine) -> Option<Vec<String>> {
    let state = engine.state();
    let mut lines = match state.phase() {
        GamePhase::Playing => return None,
        GamePhase::WordWon => vec![
            format!(
                "¡Ganaste! ¡Conseguiste {} puntos!",
                state.level_definition().points_per_word()
            ),
            "Enter: Siguiente palabra".to_string(),
        ],
        GamePhase::LevelComplete => vec![
            "¡Nivel Completado!".to_string(),
            format!(
                "¡Felicitaciones! Has completado el nivel {}",
                state.level()
            ),
            "Enter: Siguiente Nivel".to_string(),
        ],
        GamePhase::GameComplete => vec![
            "¡Juego Completado!".to_string(),
            format!(
                "¡Felicitaciones! Has completado todos los niveles con {} puntos",
                state.score()
            ),
        ],
        GamePhase::WordLost => vec![format!(
            "¡Perdiste! La palabra era: {}",
            state.revealed_word().unwrap_or_default()
        )],
        GamePhase::TimeExpired => vec![
            "Tiempo Finalizado".to_string(),
            "¡Se acabó el tiempo! Has perdido.".to_string(),
        ],
    };

    let mut hints = Vec::new();
    if engine.needs_restart() {
        hints.push("Enter: Intentar de nuevo");
    } else if state.phase() == GamePhase::GameComplete {
        hints.push("Enter: Jugar de nuevo");
    }
    if engine.needs_leaderboard_view() {
        hints.push("n: Nuevo juego");
        hints.push("Tab: Ver Ranking");
    }
    if !hints.is_empty() {
        lines.push(hints.join("   "));
    }
    Some(lines)
}

fn render_message(
    stdout: &mut io::Stdout,
    app: &App,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);

    execute!(
        stdout,
        MoveTo(center_x(term_width, &padded), 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

fn render_confirm_exit(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let lines = [
        "",
        "Salir del juego",
        "",
        "¿Estás seguro que deseas salir?",
        "Perderás tu progreso actual.",
        "",
        "[S] Salir    [N] Cancelar",
        "",
    ];
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    let x = term_width.saturating_sub(inner as u16 + 2) / 2;
    let y = term_height.saturating_sub(lines.len() as u16 + 2) / 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.border),
        Print(format!("╔{}╗", "═".repeat(inner)))
    )?;
    for (i, line) in lines.iter().enumerate() {
        let pad = inner - line.chars().count();
        let left = pad / 2;
        let color = if i == 1 { theme.key } else { theme.fg };
        execute!(
            stdout,
            MoveTo(x, y + 1 + i as u16),
            SetForegroundColor(theme.border),
            Print("║"),
            SetForegroundColor(color),
            Print(format!(
                "{}{}{}",
                " ".repeat(left),
                line,
                " ".repeat(pad - left)
            )),
            SetForegroundColor(theme.border),
            Print("║")
        )?;
    }
    execute!(
        stdout,
        MoveTo(x, y + 1 + lines.len() as u16),
        Print(format!("╚{}╝", "═".repeat(inner)))
    )?;
    Ok(())
}

fn render_leaderboard_screen(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;

    print_centered(stdout, "═══ 🏆 RANKING ═══", 1, theme.key, term_width)?;

    let header = format!("{:>3}  {:<24} {:>8} {:>9}", "#", "Jugador", "Puntos", "Partidas");
    let table_x = center_x(term_width, &header);
    execute!(
        stdout,
        MoveTo(table_x, 3),
        SetForegroundColor(theme.info),
        Print(&header),
        MoveTo(table_x, 4),
        SetForegroundColor(theme.border),
        Print("─".repeat(header.chars().count()))
    )?;

    let scores = match app.leaderboard {
        LeaderboardView::Loading => {
            print_centered(stdout, "Cargando...", 6, theme.info, term_width)?;
            &[][..]
        }
        LeaderboardView::Loaded(ref scores) => scores.as_slice(),
        LeaderboardView::Unavailable => &[][..],
    };
    if scores.is_empty() && app.leaderboard != LeaderboardView::Loading {
        print_centered(stdout, "No hay puntuaciones todavía", 6, theme.info, term_width)?;
    }

    for (i, entry) in scores.iter().take(20).enumerate() {
        let color = match i {
            0 => theme.key,
            1 | 2 => theme.success,
            _ => theme.fg,
        };
        execute!(
            stdout,
            MoveTo(table_x, 5 + i as u16),
            SetForegroundColor(color),
            Print(format!(
                "{:>3}  {:<24} {:>8} {:>9}",
                i + 1,
                truncate(&entry.username, 24),
                entry.score,
                entry.games_played
            ))
        )?;
    }

    let footer_y = 5 + scores.len().min(20) as u16 + 2;
    print_centered(
        stdout,
        "Esc: volver al juego   r: actualizar",
        footer_y.max(8),
        theme.info,
        term_width,
    )?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallows_grows_with_strikes() {
        let empty = gallows_lines(0);
        assert!(!empty.concat().contains('O'));

        let head = gallows_lines(1);
        assert_eq!(head[2].trim(), "O   |");

        let full = gallows_lines(6);
        assert_eq!(full[3], " /|\\  |");
        assert_eq!(full[4], " / \\  |");

        // Every stage keeps the same shape
        for strikes in 0..=6 {
            let lines = gallows_lines(strikes);
            for row in 0..6 {
                assert_eq!(lines[row].chars().count(), 7, "strikes {strikes} row {row}");
            }
        }
    }

    #[test]
    fn test_no_banner_while_playing() {
        let engine = GameEngine::with_seed(1);
        assert!(banner_lines(&engine).is_none());
        assert_eq!(
            header_line(&engine),
            "Nivel 1   ⏱ 2:00   Puntuación: 0   Palabras: 0/3"
        );
    }

    #[test]
    fn test_loss_banner_reveals_word() {
        let mut engine = GameEngine::with_seed(2);
        let word = engine.state().word().to_string();
        for c in ALPHABET.iter().filter(|c| !word.contains(**c)).take(6) {
            engine.guess_letter(*c);
        }
        let lines = banner_lines(&engine).unwrap();
        assert_eq!(lines[0], format!("¡Perdiste! La palabra era: {word}"));
        assert!(lines[1].contains("Intentar de nuevo"));
        assert!(lines[1].contains("Ver Ranking"));
    }

    #[test]
    fn test_win_banner_shows_points() {
        let mut engine = GameEngine::with_seed(3);
        let word = engine.state().word().to_string();
        for c in word.chars() {
            engine.guess_letter(c);
        }
        let lines = banner_lines(&engine).unwrap();
        assert_eq!(lines[0], "¡Ganaste! ¡Conseguiste 100 puntos!");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_centering_counts_chars() {
        assert_eq!(center_x(20, "Ñandú"), 7);
        assert_eq!(center_x(3, "too long"), 0);
        assert_eq!(truncate("Usuario Anónimo", 8), "Usuario…");
        assert_eq!(truncate("Ana", 8), "Ana");
    }
}
