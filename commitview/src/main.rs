//! commitview: show a GitHub commit together with its comments.
//!
//! Entry point for the `commitview` binary. Wires together configuration
//! (`config`), the GitHub REST client and fetch tasks (`github`), the unified
//! event bus (`event`), the console view host (`host`), and the session
//! coordinator from `commitview-core` (through `app`).
//!
//! # Startup sequence
//!
//! 1. Parse the command line and load the config file. Config errors are soft
//!    failures printed to stderr, because logging is not up yet.
//! 2. `init_tracing()` with the configured level. Logs go to stderr; stdout is
//!    reserved for the host's output.
//! 3. Build the HTTP client and the event channel, spawn the stdin reader, and
//!    register the shutdown flag.
//! 4. Start the session. Both fetches are issued before the loop is entered.
//!
//! The event loop below is the coordinator's only logical context: every
//! fetch completion and every host command is applied from it, one at a time.

mod app;
mod config;
mod error;
mod event;
mod github;
mod host;
mod shutdown;

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use commitview_core::SessionParams;
use tracing::{debug, info};

use crate::error::AppError;

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("commitview={log_level},commitview_core={log_level},warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = config::Cli::parse();
    let config = config::load_config(&cli);
    init_tracing(&config.log_level);

    if !(config.api_url.starts_with("http://") || config.api_url.starts_with("https://")) {
        return Err(AppError::Config(format!(
            "api_url must be an http(s) URL, got {:?}",
            config.api_url
        )));
    }

    let client = github::client::GitHubClient::new(&config.client_options())?;
    let handler = event::EventHandler::new();
    event::spawn_input_task(handler.tx.clone());
    let mut rx = handler.rx;
    let shutdown = shutdown::register_shutdown()?;

    let mut params = SessionParams::new(&cli.owner, &cli.repo, &cli.sha);
    if let Some(id) = cli.comment {
        params = params.with_initial_comment(i64::try_from(id).unwrap_or(i64::MAX));
    }

    let mut app = app::App::new(
        Arc::new(client),
        handler.tx.clone(),
        std::io::stdout(),
        cli.exit_when_ready,
    );
    app.start(&params);

    let mut end = app::SessionEnd::Quit;
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: a session waiting on a slow fetch still sees SIGTERM.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if shutdown.is_raised() {
                    info!("termination signal received");
                    let _ = app.handle_event(event::AppEvent::Quit);
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else {
                    debug!("event bus closed");
                    break 'event_loop;
                };
                if let ControlFlow::Break(reason) = app.handle_event(event) {
                    end = reason;
                    break 'event_loop;
                }
                if shutdown.is_raised() {
                    break 'event_loop;
                }
            }
        }
    }

    match end {
        app::SessionEnd::Failed(err) => Err(err.into()),
        app::SessionEnd::Quit | app::SessionEnd::Ready => Ok(()),
    }
}
