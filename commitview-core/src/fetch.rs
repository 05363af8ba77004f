//! The fetch boundary between slots and whatever performs the network I/O.
//!
//! A `FetchTask` starts work that runs out-of-line and returns immediately.
//! The outcome is not returned from `start`: the implementation delivers it
//! later to the coordinator's completion entry point, tagged with the
//! generation it was started for. Delivery must happen on the coordinator's
//! single logical context (e.g. by sending it over the host's event channel),
//! never by calling into the coordinator from the worker.

use crate::types::ResourceKey;

/// Monotonic counter distinguishing successive load attempts of one slot.
pub type Generation = u64;

/// A cancellable, restartable unit of work producing one `T` or one
/// [`FetchError`](crate::FetchError).
///
/// Contract for implementors:
/// - each `start` performs one read-only round-trip and later yields exactly
///   one completion for the `generation` it was given;
/// - no retries; a failed fetch is reported as a failure;
/// - `cancel` is best-effort. If the work already finished it is a no-op,
///   otherwise no completion should be delivered for that handle.
pub trait FetchTask<T> {
    /// Token identifying one started fetch, handed back to `cancel`.
    type Handle;

    fn start(&mut self, key: &ResourceKey, generation: Generation) -> Self::Handle;

    fn cancel(&mut self, handle: Self::Handle);
}
