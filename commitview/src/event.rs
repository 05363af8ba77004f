//! Event bus for commitview.
//!
//! Host commands typed on stdin and fetch completions from background tasks
//! are normalised into a single `AppEvent` enum and sent over a tokio
//! unbounded MPSC channel. The main loop is the only receiver, which makes it
//! the coordinator's single logical context: completions are applied in the
//! order they arrive, never concurrently with a refresh.

use commitview_core::{CommentRecord, CommitRecord, FetchError, Generation, Panel};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// All events the application can receive from any source.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A command typed by the user.
    Command(HostCommand),
    /// The commit fetch for `generation` finished.
    CommitFetched {
        generation: Generation,
        result: Result<CommitRecord, FetchError>,
    },
    /// The comment fetch for `generation` finished.
    CommentsFetched {
        generation: Generation,
        result: Result<Vec<CommentRecord>, FetchError>,
    },
    /// Quit signal (SIGTERM or end of a scripted run).
    Quit,
}

/// Lifecycle requests from the view side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Reload commit and comments.
    Refresh,
    /// Comments were changed elsewhere; reload only the comment list.
    CommentsChanged,
    /// Switch to the panel at this index.
    Navigate(usize),
    Quit,
}

impl HostCommand {
    /// Parses one input line. Returns `None` for blank or unknown input.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "refresh" => Some(Self::Refresh),
            "m" | "mutated" => Some(Self::CommentsChanged),
            "1" | "commit" => Some(Self::Navigate(Panel::Commit.index())),
            "2" | "comments" => Some(Self::Navigate(Panel::Comments.index())),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned into every fetch task and the input task;
/// the receiver (`rx`) is owned by the main event loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that turns stdin lines into `AppEvent::Command`.
///
/// The task ends at end of input or when the receiver is gone. Closing stdin
/// does not quit: a piped, non-interactive run keeps waiting for its fetches.
pub fn spawn_input_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match HostCommand::parse(&line) {
                    Some(command) => {
                        if tx.send(AppEvent::Command(command)).is_err() {
                            break;
                        }
                    }
                    None => warn!(input = %line.trim(), "unknown command (r, m, 1, 2, q)"),
                },
                Ok(None) => {
                    debug!("stdin closed, no further commands");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                }
            }
        }
    });
}
