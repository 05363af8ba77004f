//! GitHub integration for commitview.
//!
//! `client` speaks the REST API, `types` holds its wire shapes, and `worker`
//! adapts the client to the core's `FetchTask` contract by running each fetch
//! as a tokio task that reports back over the event bus.
pub mod client;
pub mod types;
pub mod worker;
