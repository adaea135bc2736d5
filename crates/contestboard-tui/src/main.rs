//! contestboard - a terminal browser for the Codeforces contest catalog.
//!
//! Browse, filter, search and star contests from the keyboard. The catalog
//! is cached locally so repeat launches within the hour make no network calls.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contestboard_core::utils::{format_duration, format_start_time, truncate_string};
use contestboard_core::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Name column width for `--list`
const LIST_NAME_MAX_LEN: usize = 60;

/// Log file prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "contestboard.log";

/// Initialize the tracing subscriber for the interactive UI.
///
/// Logs go to a daily file under `<cache_dir>/logs` so they never draw over
/// the terminal. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_file_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

/// Initialize the tracing subscriber for non-interactive commands
fn init_stderr_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    println!("contestboard {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: contestboard [--list [--json]]");
    println!();
    println!("  --list    Print the first page of contests and exit");
    println!("  --json    With --list, print the page as JSON");
    println!("  --help    Show this message");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    // Subscriber first, so config fix-ups are logged
    let list = args.iter().any(|a| a == "--list");
    let _log_guard = if list {
        init_stderr_tracing();
        None
    } else {
        Config::cache_dir()
            .ok()
            .and_then(|dir| init_file_tracing(&dir.join("logs")).ok())
    };

    let config = Config::load()?;

    if list {
        let json = args.iter().any(|a| a == "--json");
        return list_contests(config, json).await;
    }

    info!("contestboard starting");

    let mut app = App::new(config)?;
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("contestboard shutting down");
    Ok(())
}

/// Load contests (from cache when fresh) and print the first page.
async fn list_contests(config: Config, json: bool) -> Result<()> {
    let mut app = App::new(config)?;
    if let Err(e) = app.pipeline.initialize().await {
        eprintln!("Warning: {}", e);
    }

    let view = app.pipeline.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view.items)?);
        return Ok(());
    }

    if view.items.is_empty() {
        println!("No contests found with the given filters.");
        return Ok(());
    }

    for contest in &view.items {
        println!(
            "{:>6}  {:<10}  {:<18}  {:<20}  {}",
            contest.id,
            contest.phase.label(),
            format_start_time(contest.start_time_seconds, &Local),
            format_duration(contest.duration_seconds),
            truncate_string(&contest.name, LIST_NAME_MAX_LEN)
        );
    }
    println!("{}", view.pagination_label());
    eprintln!("Updated {}", app.pipeline.data_age_display());
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Debounced search and finished fetches
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
