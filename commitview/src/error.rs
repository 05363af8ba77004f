//! Error type for the `commitview` binary.
//!
//! Fetch failures normally stay inside the coordinator as a `Failed` slot.
//! They only surface here when `--exit-when-ready` ends a session that can no
//! longer become ready.

use commitview_core::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration that cannot fall back to defaults.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("client error: {0}")]
    Client(String),

    /// A scripted session settled without content.
    #[error("session failed to load: {0}")]
    Load(#[from] FetchError),

    /// Terminal or stdio failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
