//! BLOCKFALL - a falling-block puzzle game for the terminal

use crossterm::{
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use blockfall::game::{Game, GameState, TickOutcome};
use blockfall::input::{GravityTimer, InputHandler};
use blockfall::settings::Settings;
use blockfall::ui;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, stdout},
    time::Instant,
};
use tracing_subscriber::EnvFilter;

/// Window caption
const TITLE: &str = "Tetris Game";

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    let session_id: u32 = rand::random();

    // Setup tracing to log file; stdout belongs to the game screen
    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse().map_err(io::Error::other)?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "BLOCKFALL starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    let game = Game::new(settings.game.clone()).map_err(io::Error::other)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, SetTitle(TITLE))?;
    // Release events make held keys exact where the terminal supports them
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    tracing::debug!("Keyboard enhancement: {}", enhanced);

    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, game, &settings);

    // Restore terminal
    if enhanced {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    match &result {
        Ok(()) => tracing::info!("Exited normally"),
        Err(e) => tracing::error!("Exited with error: {}", e),
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut game: Game,
    settings: &Settings,
) -> io::Result<()> {
    let mut input = InputHandler::from_settings(settings);
    let frame_period = game.config().frame_period();
    let mut gravity = GravityTimer::new(game.config().gravity_period(), Instant::now());

    loop {
        // Render
        let snapshot = game.snapshot();
        terminal.draw(|frame| ui::render_game(frame, &snapshot, settings))?;

        // Drain input until the frame is up
        let deadline = Instant::now() + frame_period;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Key(key) => input.handle_key(key, Instant::now()),
                Event::Resize(width, height) => {
                    tracing::debug!("Terminal resized to {}x{}", width, height);
                }
                _ => {}
            }
        }

        let now = Instant::now();
        if input.take_restart() {
            game.restart().map_err(io::Error::other)?;
            input.clear();
            gravity.reset(now);
            continue;
        }

        match game.state() {
            GameState::Falling => {
                let tick = input.tick_input(now, gravity.poll(now));
                match game.tick(&tick) {
                    TickOutcome::Quit => return Ok(()),
                    TickOutcome::GameOver => {
                        input.clear();
                    }
                    TickOutcome::Locked { cleared_rows } if !cleared_rows.is_empty() => {
                        tracing::debug!("Tick cleared {} row(s)", cleared_rows.len());
                    }
                    _ => {}
                }
            }
            GameState::GameOver => {
                if input.take_quit() {
                    return Ok(());
                }
            }
            GameState::Quit => return Ok(()),
        }
    }
}
