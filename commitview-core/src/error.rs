//! Fetch failure taxonomy.

use thiserror::Error;

/// Why a fetch produced no value.
///
/// The coordinator does not branch on the variant: any of these moves the
/// slot to `Failed`. The distinction exists for logs and for hosts that want
/// to show a reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The commit (or repository) does not exist or is not visible.
    #[error("resource not found")]
    NotFound,

    /// The API refused the request because the quota is spent.
    #[error("rate limited (resets at {reset_at:?})")]
    RateLimited { reset_at: Option<u64> },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}
