//! HTTP client for the GitHub REST API.
//!
//! Provides [`GitHubClient`], which builds authenticated read-only requests for
//! a commit and its comments and maps every failure onto
//! [`FetchError`]. There is no retry here: a refresh from the host is the only
//! retry path.

use std::time::Duration;

use commitview_core::{CommentRecord, CommitRecord, FetchError, ResourceKey};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;
use crate::github::types::{ApiComment, ApiCommit, ApiErrorBody};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size for the comment listing (the API maximum).
const PER_PAGE: usize = 100;

/// Upper bound on comment pages fetched for one commit. A listing that is
/// still returning full pages past this point is treated as malformed.
const MAX_PAGES: u32 = 30;

/// Which comments the listing keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentFilter {
    /// Keep comments bound to a diff position.
    pub include_line_comments: bool,
    /// Keep comments on the commit as a whole.
    pub include_timeline_comments: bool,
}

impl CommentFilter {
    pub const ALL: Self = Self { include_line_comments: true, include_timeline_comments: true };

    fn keeps(self, comment: &CommentRecord) -> bool {
        if comment.is_line_anchored() {
            self.include_line_comments
        } else {
            self.include_timeline_comments
        }
    }
}

/// Options needed to construct a [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

/// Read-only GitHub API client. Cheap to clone; the connection pool is shared.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    /// Builds a client with the default headers and timeout from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Client`] if the token or user agent is not a valid
    /// header value, or the TLS backend cannot be initialised.
    pub fn new(options: &ClientOptions) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&options.user_agent)
                .map_err(|e| AppError::Client(format!("invalid user agent header value: {e}")))?,
        );
        if let Some(token) = &options.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| AppError::Client(format!("invalid token header value: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| AppError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url: options.api_url.trim_end_matches('/').to_string() })
    }

    /// Fetches commit metadata: `GET /repos/{owner}/{repo}/commits/{sha}`.
    pub async fn get_commit(&self, key: &ResourceKey) -> Result<CommitRecord, FetchError> {
        let url = self.commit_url(key);
        let commit: ApiCommit = self.get_json(&url).await?;
        Ok(commit.into_record())
    }

    /// Fetches every comment on the commit, in server order, following
    /// pagination until a short page. Gives up after `MAX_PAGES` full pages.
    pub async fn list_commit_comments(
        &self,
        key: &ResourceKey,
        filter: CommentFilter,
    ) -> Result<Vec<CommentRecord>, FetchError> {
        let base = format!("{}/comments", self.commit_url(key));
        let mut comments = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!("{base}?per_page={PER_PAGE}&page={page}");
            let batch: Vec<ApiComment> = self.get_json(&url).await?;
            let received = batch.len();
            comments.extend(
                batch.into_iter().map(ApiComment::into_record).filter(|c| filter.keeps(c)),
            );
            debug!(page, received, kept = comments.len(), "comment page received");
            if received < PER_PAGE {
                break;
            }
            if page >= MAX_PAGES {
                return Err(FetchError::Decode(format!(
                    "comment listing did not end after {MAX_PAGES} pages"
                )));
            }
            page += 1;
        }
        Ok(comments)
    }

    fn commit_url(&self, key: &ResourceKey) -> String {
        format!("{}/repos/{}/{}/commits/{}", self.base_url, key.owner(), key.repo(), key.sha())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, url, "response received");
        if !status.is_success() {
            return Err(error_for_response(response).await);
        }

        let body = response.text().await.map_err(|e| FetchError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Maps a non-success response onto the fetch error taxonomy.
async fn error_for_response(response: Response) -> FetchError {
    let status = response.status();
    let headers = response.headers();
    let remaining = header_u64(headers, "x-ratelimit-remaining");
    let reset_at = header_u64(headers, "x-ratelimit-reset");

    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && remaining == Some(0))
    {
        return FetchError::RateLimited { reset_at };
    }
    if status == StatusCode::NOT_FOUND {
        return FetchError::NotFound;
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|err| err.message)
        .unwrap_or(body);
    FetchError::Http { status: status.as_u16(), message }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
