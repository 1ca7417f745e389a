//! codemesh - ContextMesh dashboard
//!
//! Terminal UI for querying the ContextMesh code-analysis service and
//! watching its live event feed.

mod app;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use codemesh_core::sync::{spawn_event_sync, SyncUpdate};
use codemesh_core::{Config, MeshClient};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "codemesh", about = "Terminal dashboard for ContextMesh", version)]
struct Cli {
    /// Analysis service base URL (overrides config)
    #[arg(long)]
    server: Option<String>,

    /// Repository path sent with analysis requests (overrides config)
    #[arg(long)]
    repo: Option<String>,

    /// Event poll interval in seconds (overrides config)
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration and apply CLI overrides
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }
    if let Some(repo) = cli.repo {
        config.server.repo_path = repo;
    }
    if let Some(interval) = cli.interval {
        config.events.poll_interval_secs = interval;
    }

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        codemesh_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(server = %config.server.base_url, "codemesh TUI starting up");

    let client = MeshClient::new(&config.server).context("failed to create service client")?;
    if !client.health_check().await {
        tracing::warn!("Analysis service health check failed; starting anyway");
    }

    // Channels from the background flows into the select loop
    let (reply_tx, reply_rx) = mpsc::channel(16);
    let (sync_tx, sync_rx) = mpsc::channel(16);
    let sync_handle = spawn_event_sync(client.clone(), config.events.poll_interval(), sync_tx);

    let mut app = App::new(client, config.server.repo_path.clone(), reply_tx);

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, reply_rx, sync_rx).await;

    // Stop the sync loop before restoring the terminal
    app.dashboard.close();
    sync_handle.shutdown().await;

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("codemesh TUI shutting down");

    result
}

/// Run the main application loop: render, then wait for the next input key,
/// resolved analysis reply, or event poll result.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut reply_rx: mpsc::Receiver<app::ReplyEvent>,
    mut sync_rx: mpsc::Receiver<SyncUpdate>,
) -> Result<()> {
    let mut input = EventStream::new();
    // Redraw at least once a second so the feed indicator never goes stale
    let mut redraw = tokio::time::interval(Duration::from_secs(1));

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            maybe_event = input.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key)
                    }
                    Some(Ok(_)) => {} // resize and friends just redraw
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal input stream failed");
                        break;
                    }
                    None => break,
                }
            }
            Some(reply) = reply_rx.recv() => {
                app.apply_reply(reply);
            }
            Some(update) = sync_rx.recv() => {
                match update {
                    SyncUpdate::Replaced(events) => {
                        app.dashboard.replace_events(events);
                    }
                    SyncUpdate::Failed => app.dashboard.mark_feed_stale(),
                }
            }
            _ = redraw.tick() => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
