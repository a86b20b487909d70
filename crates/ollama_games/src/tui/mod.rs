//! Terminal front-end.
//!
//! Drives the same [`Arbiter`] the hub server uses, either through a
//! completion gateway over HTTP or straight against Ollama.

mod app;
mod input;
mod ui;

use crate::arbiter::Arbiter;
use crate::config::HubConfig;
use crate::mover::{CompletionGateway, HttpGateway, MoverClient};
use crate::ollama_client::OllamaClient;
use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

const LOG_FILE: &str = "ollama_games_tui.log";

/// Runs the terminal front-end until the user quits.
///
/// With `config.gateway_url()` set, moves are requested through that
/// gateway; otherwise the front-end talks to Ollama directly.
pub async fn run_tui(config: HubConfig) -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE).context("Failed to create TUI log file")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,ollama_games=debug")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!("Starting Ollama Games TUI");
    let arbiter = Arbiter::new(MoverClient::new(gateway_for(&config)?));

    enable_raw_mode()?;
    let mut terminal = undo_on_error(setup_terminal, || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })?;

    let res = run_app(&mut terminal, App::new(arbiter));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "TUI loop failed");
    }
    res
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Runs `setup`, calling `undo` only if it fails.
fn undo_on_error<T>(setup: impl FnOnce() -> Result<T>, undo: impl FnOnce()) -> Result<T> {
    setup().inspect_err(|e| {
        error!(error = ?e, "Terminal setup failed, restoring");
        undo();
    })
}

fn gateway_for(config: &HubConfig) -> Result<Arc<dyn CompletionGateway>> {
    match config.gateway_url() {
        Some(url) => {
            info!(gateway_url = %url, "Using HTTP gateway");
            let gateway = HttpGateway::new(url, config.request_timeout())
                .context("Failed to create gateway client")?;
            Ok(Arc::new(gateway))
        }
        None => {
            info!(ollama_url = %config.ollama_url(), "Talking to Ollama directly");
            let client = OllamaClient::new(config).context("Failed to create Ollama client")?;
            Ok(Arc::new(client))
        }
    }
}

#[instrument(skip_all)]
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    while !app.should_quit() {
        let snapshot = app.snapshot();
        let status = app::status_line(&snapshot);
        terminal.draw(|frame| ui::draw(frame, &snapshot, app.cursor(), &status))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code);
        }
    }
    Ok(())
}
