//! Single-source load state with generation-based staleness protection.
//!
//! A [`SourceSlot`] owns one [`FetchTask`] and the latest outcome it produced.
//! Every `load` that actually starts work bumps the slot's generation; a
//! completion is applied only if it carries the current generation and the
//! slot is still `Loading`. That rule is what keeps a slow, superseded fetch
//! from overwriting a newer one.

use tracing::debug;

use crate::error::FetchError;
use crate::fetch::{FetchTask, Generation};
use crate::types::ResourceKey;

/// Load state of a slot, including its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState<T> {
    /// Nothing loaded and nothing in flight.
    Empty,
    /// A fetch for the current generation is outstanding.
    Loading,
    /// The current generation completed with a value.
    Ready(T),
    /// The current generation completed with an error.
    Failed(FetchError),
}

/// Payload-free view of [`SlotState`], convenient for logging and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    Loading,
    Ready,
    Failed,
}

impl<T> SlotState<T> {
    pub fn status(&self) -> SlotStatus {
        match self {
            SlotState::Empty => SlotStatus::Empty,
            SlotState::Loading => SlotStatus::Loading,
            SlotState::Ready(_) => SlotStatus::Ready,
            SlotState::Failed(_) => SlotStatus::Failed,
        }
    }
}

/// Holds one source's latest result and exposes readiness plus
/// invalidate/reload.
pub struct SourceSlot<T, F: FetchTask<T>> {
    name: &'static str,
    task: F,
    state: SlotState<T>,
    generation: Generation,
    in_flight: Option<F::Handle>,
}

impl<T, F: FetchTask<T>> SourceSlot<T, F> {
    /// Creates an empty slot at generation 0. `name` only appears in logs.
    pub fn new(name: &'static str, task: F) -> Self {
        Self { name, task, state: SlotState::Empty, generation: 0, in_flight: None }
    }

    /// Starts a fetch for `key` unless one is already outstanding.
    ///
    /// Returns `true` when a new generation was started. Calling this while
    /// `Loading` is a no-op, so repeated loads never stack duplicate requests.
    pub fn load(&mut self, key: &ResourceKey) -> bool {
        if self.is_loading() {
            debug!(slot = self.name, generation = self.generation, "load ignored, fetch already in flight");
            return false;
        }
        self.generation += 1;
        self.state = SlotState::Loading;
        self.in_flight = Some(self.task.start(key, self.generation));
        debug!(slot = self.name, generation = self.generation, "fetch started");
        true
    }

    /// Applies a fetch outcome if it belongs to the current generation.
    ///
    /// Returns `true` when the state changed. Outcomes for an older
    /// generation, duplicates for the current one, and outcomes arriving after
    /// an `invalidate` are all dropped.
    pub fn on_task_complete(&mut self, generation: Generation, result: Result<T, FetchError>) -> bool {
        if generation != self.generation || !self.is_loading() {
            debug!(
                slot = self.name,
                generation,
                current = self.generation,
                status = ?self.status(),
                "discarding stale fetch result"
            );
            return false;
        }
        self.in_flight = None;
        self.state = match result {
            Ok(value) => SlotState::Ready(value),
            Err(err) => SlotState::Failed(err),
        };
        debug!(slot = self.name, generation, status = ?self.status(), "fetch settled");
        true
    }

    /// Clears any value or error and returns to `Empty` without starting a
    /// fetch.
    ///
    /// An outstanding fetch is cancelled best-effort; if its result still
    /// arrives it is discarded because the slot is no longer `Loading`.
    pub fn invalidate(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            debug!(slot = self.name, generation = self.generation, "cancelling superseded fetch");
            self.task.cancel(handle);
        }
        self.state = SlotState::Empty;
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SlotState::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SlotState::Loading)
    }

    pub fn status(&self) -> SlotStatus {
        self.state.status()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            SlotState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            SlotState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn task(&self) -> &F {
        &self.task
    }
}
