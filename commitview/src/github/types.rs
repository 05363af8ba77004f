//! Wire types for the GitHub REST responses the fetch tasks read.
//!
//! Only the fields the records need are declared; everything else in the
//! payload is ignored by serde. Conversion into the core records happens here
//! so the rest of the binary never sees the wire shape.

use commitview_core::{CommentRecord, CommitRecord, FileChange};
use serde::Deserialize;

/// `GET /repos/{owner}/{repo}/commits/{sha}`
#[derive(Debug, Deserialize)]
pub struct ApiCommit {
    pub sha: String,
    pub commit: ApiCommitDetail,
    /// The linked GitHub account; absent when the author email is unknown.
    pub author: Option<ApiUser>,
    #[serde(default)]
    pub files: Vec<ApiFile>,
    pub stats: Option<ApiStats>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCommitDetail {
    pub message: String,
    pub author: Option<ApiGitActor>,
    pub committer: Option<ApiGitActor>,
}

#[derive(Debug, Deserialize)]
pub struct ApiGitActor {
    pub name: String,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiStats {
    pub additions: u32,
    pub deletions: u32,
}

/// One element of `GET /repos/{owner}/{repo}/commits/{sha}/comments`.
#[derive(Debug, Deserialize)]
pub struct ApiComment {
    pub id: u64,
    pub body: String,
    pub user: Option<ApiUser>,
    pub path: Option<String>,
    /// `null` for comments on the commit as a whole.
    pub position: Option<i64>,
    pub line: Option<u32>,
    pub created_at: String,
}

/// Error body GitHub returns with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

impl ApiCommit {
    pub fn into_record(self) -> CommitRecord {
        let stats = self.stats.unwrap_or_default();
        let (author_name, committed_at) = match (self.commit.author, self.commit.committer) {
            (Some(author), committer) => {
                let date = committer.and_then(|c| c.date).or(author.date);
                (author.name, date)
            }
            (None, Some(committer)) => (committer.name, committer.date),
            (None, None) => (String::new(), None),
        };
        CommitRecord {
            sha: self.sha,
            message: self.commit.message,
            author_name,
            author_login: self.author.map(|user| user.login),
            committed_at,
            files: self
                .files
                .into_iter()
                .map(|file| FileChange {
                    filename: file.filename,
                    status: file.status,
                    additions: file.additions,
                    deletions: file.deletions,
                })
                .collect(),
            additions: stats.additions,
            deletions: stats.deletions,
        }
    }
}

impl ApiComment {
    pub fn into_record(self) -> CommentRecord {
        CommentRecord {
            id: self.id,
            position: self.position.unwrap_or(-1),
            author: self.user.map(|user| user.login).unwrap_or_default(),
            body: self.body,
            path: self.path,
            line: self.line,
            created_at: self.created_at,
        }
    }
}
