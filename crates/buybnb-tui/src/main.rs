//! BuyBnB TUI - A terminal client for the BuyBnB property listing service.
//!
//! Browse listings by city on a rotating world map, sign in, and view your
//! profile, all from the keyboard.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use buybnb_core::models::Credentials;
use buybnb_core::Config;

use app::{App, AppState, Services};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log files roll daily as `buybnb.log.YYYY-MM-DD`
const LOG_FILE_PREFIX: &str = "buybnb.log";

const USAGE: &str = "\
Usage: buybnb [--login | --logout | --status]

  (no flag)   Start the terminal client
  --login     Sign in from the command line
  --logout    Clear the saved session
  --status    Show who is signed in";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a daily file under the cache directory so they never draw
/// over the terminal UI. Use RUST_LOG to control the level (e.g., RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = Config::load()?;
    let log_dir = config
        .cache_dir()
        .unwrap_or_else(|_| "./cache".into())
        .join("logs");
    let _guard = init_tracing(&log_dir);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None => {}
        Some("--login") => return login_interactive(&mut config).await,
        Some("--logout") => return logout(&config),
        Some("--status") => return status(&config),
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown option: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }

    info!(base_url = %config.api_base_url(), "BuyBnB TUI starting");

    // Session is loaded before the first frame is drawn
    let services = Services::from_config(&config)?;
    let mut app = App::new(config, services);
    app.refresh_destinations();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
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

    info!("BuyBnB TUI shutting down");
    Ok(())
}

/// Sign in from the command line without starting the UI.
async fn login_interactive(config: &mut Config) -> Result<()> {
    let services = Services::from_config(config)?;

    match config.last_username {
        Some(ref last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = match username.trim() {
        "" => config.last_username.clone().unwrap_or_default(),
        typed => typed.to_string(),
    };

    let password = rpassword::prompt_password("Password: ")?;
    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password required");
    }

    println!("Signing in...");
    let response = services
        .api
        .login(&Credentials::new(&username, &password))
        .await?;
    let name = response.user.display_name();
    services
        .session
        .login(&response.token, response.user)
        .context("Failed to save session")?;

    config.last_username = Some(username);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Signed in as {}", name);
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let services = Services::from_config(config)?;
    services.session.logout();
    println!("Signed out.");
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    let services = Services::from_config(config)?;
    println!("Server: {}", services.api.base_url());
    match services.session.user() {
        Some(user) if services.session.is_authenticated() => {
            let username = user.username.clone().unwrap_or_default();
            println!("Signed in as {} ({})", user.display_name(), username);
        }
        _ => println!("Not signed in"),
    }
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

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Apply redirects from sign-out or an expired session
        app.check_session();
        app.check_routes();

        // Check for completed background tasks
        app.check_background_tasks();

        app.tick();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
