//! Owned data types shared by the coordinator, the fetch tasks, and the host.
//!
//! Everything here is fully owned and `Send` so fetch results can cross from a
//! background task to the coordination context without borrowing.

use serde::{Deserialize, Serialize};

/// Server-assigned comment identifier.
pub type CommentId = u64;

/// Sentinel used by [`SessionParams::initial_comment_id`] for "no deep link".
pub const NO_COMMENT: i64 = -1;

/// Identifies one commit on the remote. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    owner: String,
    repo: String,
    sha: String,
}

impl ResourceKey {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, sha: impl Into<String>) -> Self {
        Self { owner: owner.into(), repo: repo.into(), sha: sha.into() }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The full commit hash.
    pub fn sha(&self) -> &str {
        &self.sha
    }

    /// First 7 characters of the hash, or the whole hash when it is shorter.
    pub fn short_sha(&self) -> &str {
        match self.sha.char_indices().nth(7) {
            Some((idx, _)) => &self.sha[..idx],
            None => &self.sha,
        }
    }

    /// `owner/repo`, as shown under the session title.
    pub fn repo_path(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// The inbound construction parameters for one view session.
///
/// Serializable on purpose: a host that persists or forwards sessions (e.g. a
/// link handler) stores exactly this. An absent deep link is encoded as
/// [`NO_COMMENT`] rather than an optional field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    #[serde(default = "no_comment")]
    pub initial_comment_id: i64,
}

fn no_comment() -> i64 {
    NO_COMMENT
}

impl SessionParams {
    /// Parameters for a session without a deep link.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            sha: sha.into(),
            initial_comment_id: NO_COMMENT,
        }
    }

    /// Adds a deep link to the given comment.
    pub fn with_initial_comment(mut self, comment_id: i64) -> Self {
        self.initial_comment_id = comment_id;
        self
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.owner, &self.repo, &self.sha)
    }

    pub fn deep_link(&self) -> DeepLinkTarget {
        DeepLinkTarget::from_raw(self.initial_comment_id)
    }
}

/// A caller-specified comment the view should focus once data loads.
///
/// Only ever narrows: a `Pending` target may be cleared, but nothing turns
/// `None` back into `Pending` within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeepLinkTarget {
    #[default]
    None,
    Pending(CommentId),
}

impl DeepLinkTarget {
    /// Decodes the wire form; any negative id means no target.
    pub fn from_raw(raw: i64) -> Self {
        u64::try_from(raw).map_or(Self::None, Self::Pending)
    }

    pub fn comment_id(self) -> Option<CommentId> {
        match self {
            Self::None => None,
            Self::Pending(id) => Some(id),
        }
    }

    /// Drops the target. There is no inverse.
    pub fn clear(&mut self) {
        *self = Self::None;
    }
}

/// Per-file change stats reported with a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub filename: String,
    /// `added`, `modified`, `removed`, `renamed`, ...
    pub status: String,
    pub additions: u32,
    pub deletions: u32,
}

/// Fetched commit metadata. Opaque to the coordinator beyond ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub author_login: Option<String>,
    pub committed_at: Option<String>,
    pub files: Vec<FileChange>,
    pub additions: u32,
    pub deletions: u32,
}

impl CommitRecord {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// One discussion comment on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: CommentId,
    /// Diff position; negative for general (timeline) comments.
    pub position: i64,
    pub author: String,
    pub body: String,
    pub path: Option<String>,
    pub line: Option<u32>,
    pub created_at: String,
}

impl CommentRecord {
    /// True when the comment is bound to a diff line rather than the timeline.
    pub fn is_line_anchored(&self) -> bool {
        self.position >= 0
    }
}

/// The two panels a loaded session offers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Commit,
    Comments,
}

/// Full panel set exposed once content is ready.
pub const PANELS: [Panel; 2] = [Panel::Commit, Panel::Comments];

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Commit => 0,
            Panel::Comments => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        PANELS.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Commit => "Commit",
            Panel::Comments => "Comments",
        }
    }
}

/// What a host receives when it navigates to a panel.
///
/// Both panels see the commit and the full comment list: the commit panel
/// annotates its file list with line comments, the comments panel renders the
/// thread against the commit it belongs to.
#[derive(Debug, Clone, Copy)]
pub enum PanelView<'a> {
    Commit {
        commit: &'a CommitRecord,
        comments: &'a [CommentRecord],
    },
    Comments {
        commit: &'a CommitRecord,
        comments: &'a [CommentRecord],
    },
}

impl PanelView<'_> {
    pub fn panel(&self) -> Panel {
        match self {
            PanelView::Commit { .. } => Panel::Commit,
            PanelView::Comments { .. } => Panel::Comments,
        }
    }
}
