//! Session wiring for the commitview binary.
//!
//! `App` owns the coordinator, built from the GitHub-backed fetch tasks and a
//! console host, and translates every `AppEvent` from the bus into exactly one
//! coordinator call. It is only ever driven from the main loop, so the
//! coordinator sees one event at a time.

use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;

use commitview_core::{FetchError, LoadCoordinator, SessionParams};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::event::{AppEvent, HostCommand};
use crate::github::client::GitHubClient;
use crate::github::worker::{CommentsFetchTask, CommitFetchTask};
use crate::host::{render_panel, ConsoleHost};

/// Why a session stopped the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Ready,
    /// `--exit-when-ready` with every slot settled and at least one failed.
    Failed(FetchError),
}

pub type Coordinator<W> = LoadCoordinator<CommitFetchTask, CommentsFetchTask, ConsoleHost<W>>;

pub struct App<W: Write> {
    coordinator: Coordinator<W>,
    /// Stop the loop the first time the session settles.
    exit_when_ready: bool,
}

impl<W: Write> App<W> {
    pub fn new(
        client: Arc<GitHubClient>,
        event_tx: UnboundedSender<AppEvent>,
        out: W,
        exit_when_ready: bool,
    ) -> Self {
        let coordinator = LoadCoordinator::new(
            CommitFetchTask::new(Arc::clone(&client), event_tx.clone()),
            CommentsFetchTask::new(client, event_tx),
            ConsoleHost::new(out),
        );
        Self { coordinator, exit_when_ready }
    }

    /// Prints the session header and issues both loads.
    pub fn start(&mut self, params: &SessionParams) {
        self.coordinator.start_session(params);
        let title = self.coordinator.title().unwrap_or_default();
        let subtitle = self.coordinator.subtitle().unwrap_or_default();
        self.coordinator.host_mut().show(&format!("{title}  {subtitle}"));
    }

    /// Applies one event. `Break` ends the main loop.
    pub fn handle_event(&mut self, event: AppEvent) -> ControlFlow<SessionEnd> {
        match event {
            AppEvent::Command(HostCommand::Refresh) => self.coordinator.refresh(),
            AppEvent::Command(HostCommand::CommentsChanged) => self.coordinator.refresh_comments(),
            AppEvent::Command(HostCommand::Navigate(index)) => {
                self.coordinator.host_mut().navigate(index);
            }
            AppEvent::Command(HostCommand::Quit) | AppEvent::Quit => {
                info!("quit requested");
                return ControlFlow::Break(SessionEnd::Quit);
            }
            AppEvent::CommitFetched { generation, result } => {
                self.coordinator.on_commit_complete(generation, result);
            }
            AppEvent::CommentsFetched { generation, result } => {
                self.coordinator.on_comments_complete(generation, result);
            }
        }

        self.show_selected_panel();

        if self.exit_when_ready {
            if self.coordinator.is_content_ready() {
                return ControlFlow::Break(SessionEnd::Ready);
            }
            if let Some(err) = self.coordinator.settled_error() {
                return ControlFlow::Break(SessionEnd::Failed(err.clone()));
            }
        }
        ControlFlow::Continue(())
    }

    pub fn coordinator(&self) -> &Coordinator<W> {
        &self.coordinator
    }

    pub fn into_output(self) -> W {
        self.coordinator.into_host().into_inner()
    }

    /// Prints the selected panel if the last event changed what is visible.
    fn show_selected_panel(&mut self) {
        if !self.coordinator.host_mut().take_dirty() || !self.coordinator.is_content_ready() {
            return;
        }
        let host = self.coordinator.host();
        let (index, focus) = (host.selected().index(), host.focus());
        if let Some(text) = self.coordinator.panel(index).map(|view| render_panel(&view, focus)) {
            self.coordinator.host_mut().show(&text);
        }
    }
}
