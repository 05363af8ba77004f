//! Tokio-backed fetch tasks.
//!
//! Each `start` spawns one task that performs a single GitHub request and
//! sends the outcome to the main loop as an `AppEvent`, tagged with the
//! generation the slot handed us. The task never touches coordinator state;
//! the main loop applies the result. Cancellation aborts the task through its
//! `AbortHandle`; a result already sitting in the channel is dropped later by
//! the slot's generation check.

use std::sync::Arc;

use commitview_core::{CommentRecord, CommitRecord, FetchTask, Generation, ResourceKey};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::{debug, info_span, Instrument};

use crate::event::AppEvent;
use crate::github::client::{CommentFilter, GitHubClient};

/// Loads commit metadata for the commit slot.
pub struct CommitFetchTask {
    client: Arc<GitHubClient>,
    event_tx: UnboundedSender<AppEvent>,
}

impl CommitFetchTask {
    pub fn new(client: Arc<GitHubClient>, event_tx: UnboundedSender<AppEvent>) -> Self {
        Self { client, event_tx }
    }
}

impl FetchTask<CommitRecord> for CommitFetchTask {
    type Handle = AbortHandle;

    fn start(&mut self, key: &ResourceKey, generation: Generation) -> AbortHandle {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();
        let key = key.clone();
        let span = info_span!("fetch_commit", generation, sha = key.short_sha());
        tokio::spawn(
            async move {
                let result = client.get_commit(&key).await;
                debug!(ok = result.is_ok(), "commit fetch finished");
                // Receiver gone means the session ended; nothing to deliver to.
                let _ = tx.send(AppEvent::CommitFetched { generation, result });
            }
            .instrument(span),
        )
        .abort_handle()
    }

    fn cancel(&mut self, handle: AbortHandle) {
        handle.abort();
    }
}

/// Loads the comment list for the comment slot, line and timeline comments
/// both included.
pub struct CommentsFetchTask {
    client: Arc<GitHubClient>,
    event_tx: UnboundedSender<AppEvent>,
    filter: CommentFilter,
}

impl CommentsFetchTask {
    pub fn new(client: Arc<GitHubClient>, event_tx: UnboundedSender<AppEvent>) -> Self {
        Self { client, event_tx, filter: CommentFilter::ALL }
    }
}

impl FetchTask<Vec<CommentRecord>> for CommentsFetchTask {
    type Handle = AbortHandle;

    fn start(&mut self, key: &ResourceKey, generation: Generation) -> AbortHandle {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();
        let key = key.clone();
        let filter = self.filter;
        let span = info_span!("fetch_comments", generation, sha = key.short_sha());
        tokio::spawn(
            async move {
                let result = client.list_commit_comments(&key, filter).await;
                debug!(ok = result.is_ok(), "comment fetch finished");
                let _ = tx.send(AppEvent::CommentsFetched { generation, result });
            }
            .instrument(span),
        )
        .abort_handle()
    }

    fn cancel(&mut self, handle: AbortHandle) {
        handle.abort();
    }
}
