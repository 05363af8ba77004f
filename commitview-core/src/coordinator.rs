//! Dual-source load coordinator for one commit view session.
//!
//! The coordinator owns exactly two slots (commit metadata and the comment
//! list), composes their readiness into one "content ready" signal for the
//! [`ViewHost`], and reconciles an optional deep-link comment against the
//! comments that actually arrive.
//!
//! # Threading
//!
//! The coordinator is single-threaded with respect to its own state. Both
//! fetches run concurrently elsewhere, but every completion must be handed to
//! [`LoadCoordinator::on_commit_complete`] / [`LoadCoordinator::on_comments_complete`]
//! from the same logical context that calls `start` and `refresh`. Nothing in
//! here blocks; waiting is observed only through host notifications.

use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetch::{FetchTask, Generation};
use crate::slot::SourceSlot;
use crate::types::{
    CommentId, CommentRecord, CommitRecord, DeepLinkTarget, Panel, PanelView, ResourceKey,
    SessionParams, PANELS,
};

/// The view side of a session. Receives the signals the coordinator emits.
pub trait ViewHost {
    /// Show content (`true`) or the loading state (`false`).
    fn set_content_ready(&mut self, ready: bool);

    /// The selectable panels, or `None` while content is not ready. A host
    /// must not build a panel selector until it receives `Some`.
    fn set_available_panels(&mut self, panels: Option<&[Panel]>);

    /// Switch to `panel` and bring `focus` into view. Emitted at most once
    /// per session, when a deep link resolves.
    fn select_panel(&mut self, panel: Panel, focus: CommentId);
}

/// Owns the commit and comment slots of one session and drives the host.
pub struct LoadCoordinator<C, M, H>
where
    C: FetchTask<CommitRecord>,
    M: FetchTask<Vec<CommentRecord>>,
    H: ViewHost,
{
    key: Option<ResourceKey>,
    deep_link: DeepLinkTarget,
    commit: SourceSlot<CommitRecord, C>,
    comments: SourceSlot<Vec<CommentRecord>, M>,
    host: H,
    /// Last readiness value sent to the host; `None` before the first send.
    published: Option<bool>,
}

impl<C, M, H> LoadCoordinator<C, M, H>
where
    C: FetchTask<CommitRecord>,
    M: FetchTask<Vec<CommentRecord>>,
    H: ViewHost,
{
    /// Creates a coordinator with two empty slots. Nothing is fetched until
    /// [`start`](Self::start).
    pub fn new(commit_task: C, comments_task: M, host: H) -> Self {
        Self {
            key: None,
            deep_link: DeepLinkTarget::None,
            commit: SourceSlot::new("commit", commit_task),
            comments: SourceSlot::new("comments", comments_task),
            host,
            published: None,
        }
    }

    /// Records the session key and deep link, hides content, and loads both
    /// sources.
    ///
    /// Calling it again rebinds the coordinator to a new session: both slots
    /// are invalidated first so nothing from the previous key can be shown.
    pub fn start(&mut self, key: ResourceKey, deep_link: DeepLinkTarget) {
        info!(
            owner = key.owner(),
            repo = key.repo(),
            sha = key.sha(),
            deep_link = ?deep_link.comment_id(),
            "starting commit view session"
        );
        self.commit.invalidate();
        self.comments.invalidate();
        self.deep_link = deep_link;
        self.publish(false, true);
        self.commit.load(&key);
        self.comments.load(&key);
        self.key = Some(key);
    }

    /// [`start`](Self::start) from the serializable construction parameters.
    pub fn start_session(&mut self, params: &SessionParams) {
        self.start(params.key(), params.deep_link());
    }

    /// Continuation for the commit fetch. Returns `true` if it was applied.
    pub fn on_commit_complete(
        &mut self,
        generation: Generation,
        result: Result<CommitRecord, FetchError>,
    ) -> bool {
        if !self.commit.on_task_complete(generation, result) {
            return false;
        }
        if let Some(err) = self.commit.error() {
            warn!(generation, error = %err, "commit fetch failed");
        }
        self.recompute_readiness();
        true
    }

    /// Continuation for the comment fetch. Returns `true` if it was applied.
    ///
    /// A successful load runs deep-link reconciliation before readiness is
    /// recomputed.
    pub fn on_comments_complete(
        &mut self,
        generation: Generation,
        result: Result<Vec<CommentRecord>, FetchError>,
    ) -> bool {
        if !self.comments.on_task_complete(generation, result) {
            return false;
        }
        match self.comments.error() {
            Some(err) => warn!(generation, error = %err, "comment fetch failed"),
            None => self.reconcile_deep_link(),
        }
        self.recompute_readiness();
        true
    }

    /// Drops both results and reloads them. Content is reported not ready
    /// until both slots settle again.
    pub fn refresh(&mut self) {
        let Some(key) = self.key.clone() else {
            debug!("refresh before start ignored");
            return;
        };
        info!("refreshing commit and comments");
        self.commit.invalidate();
        self.comments.invalidate();
        self.publish(false, true);
        self.commit.load(&key);
        self.comments.load(&key);
    }

    /// Like [`refresh`](Self::refresh) but only for the comment list, after
    /// comments changed elsewhere. The commit slot is left untouched.
    pub fn refresh_comments(&mut self) {
        let Some(key) = self.key.clone() else {
            debug!("comment refresh before start ignored");
            return;
        };
        info!("refreshing comments");
        self.comments.invalidate();
        self.publish(false, true);
        self.comments.load(&key);
    }

    /// Publishes the composite readiness and, on the first ready transition
    /// with a live deep link, asks the host to select the comments panel.
    ///
    /// Returns the current readiness. The deep link is consumed by the
    /// selection, so later refreshes never select again.
    pub fn recompute_readiness(&mut self) -> bool {
        let ready = self.commit.is_ready() && self.comments.is_ready();
        self.publish(ready, false);
        if ready {
            if let Some(focus) = self.deep_link.comment_id() {
                debug!(comment_id = focus, "deep link resolved, selecting comments panel");
                self.host.select_panel(Panel::Comments, focus);
                self.deep_link.clear();
            }
        }
        ready
    }

    /// Content for panel `index`, or `None` while not ready or out of range.
    pub fn panel(&self, index: usize) -> Option<PanelView<'_>> {
        let panel = Panel::from_index(index)?;
        let commit = self.commit.value()?;
        let comments = self.comments.value()?;
        Some(match panel {
            Panel::Commit => PanelView::Commit { commit, comments },
            Panel::Comments => PanelView::Comments { commit, comments },
        })
    }

    /// `Commit <short sha>` once started.
    pub fn title(&self) -> Option<String> {
        self.key.as_ref().map(|key| format!("Commit {}", key.short_sha()))
    }

    /// `owner/repo` once started.
    pub fn subtitle(&self) -> Option<String> {
        self.key.as_ref().map(ResourceKey::repo_path)
    }

    pub fn is_content_ready(&self) -> bool {
        self.commit.is_ready() && self.comments.is_ready()
    }

    /// The first load error, once neither slot is still loading. A session in
    /// this state cannot become ready without a refresh.
    pub fn settled_error(&self) -> Option<&FetchError> {
        if self.commit.is_loading() || self.comments.is_loading() {
            return None;
        }
        self.commit.error().or_else(|| self.comments.error())
    }

    pub fn deep_link(&self) -> DeepLinkTarget {
        self.deep_link
    }

    pub fn commit_slot(&self) -> &SourceSlot<CommitRecord, C> {
        &self.commit
    }

    pub fn comments_slot(&self) -> &SourceSlot<Vec<CommentRecord>, M> {
        &self.comments
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Ends the session and hands the host back.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Clears the deep link unless it names a timeline comment in the list
    /// just loaded. Line-anchored comments are not deep-linkable. A miss is a
    /// silent degrade to the default panel, not an error.
    fn reconcile_deep_link(&mut self) {
        let Some(target) = self.deep_link.comment_id() else {
            return;
        };
        let Some(comments) = self.comments.value() else {
            return;
        };
        let linkable = comments
            .iter()
            .find(|comment| comment.id == target)
            .is_some_and(|comment| !comment.is_line_anchored());
        if !linkable {
            debug!(comment_id = target, "deep link target not linkable, showing default panel");
            self.deep_link.clear();
        }
    }

    fn publish(&mut self, ready: bool, force: bool) {
        if !force && self.published == Some(ready) {
            return;
        }
        self.published = Some(ready);
        self.host.set_content_ready(ready);
        self.host.set_available_panels(ready.then_some(&PANELS[..]));
    }
}
