//! Core of the commit view: a dual-source load coordinator.
//!
//! A commit view is assembled from two independent fetches (commit metadata
//! and its comment list). This crate tracks each fetch in a generation-tagged
//! [`SourceSlot`], composes their readiness in [`LoadCoordinator`], and tells a
//! [`ViewHost`] when to show content and which panel to select. It performs no
//! I/O itself; see the `commitview` binary for the GitHub-backed fetch tasks.

pub mod coordinator;
pub mod error;
pub mod fetch;
pub mod slot;
pub mod types;

pub use coordinator::{LoadCoordinator, ViewHost};
pub use error::FetchError;
pub use fetch::{FetchTask, Generation};
pub use slot::{SlotState, SlotStatus, SourceSlot};
pub use types::{
    CommentId, CommentRecord, CommitRecord, DeepLinkTarget, FileChange, Panel, PanelView,
    ResourceKey, SessionParams, NO_COMMENT, PANELS,
};
