use std::sync::Arc;

use crate::error::SlotError;

/// Zero-based position of an input in submission order.
pub type SlotIndex = usize;

/// Observable state of a slot.
///
/// ```text
/// Pending ──► Completed ──► Published
///    │
///    └──────► Failed (absorbing)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Operation still running.
    Pending,
    /// Output produced, waiting for its turn.
    Completed,
    /// Output handed to the observers.
    Published,
    /// Operation failed; there is no output.
    Failed,
}

/// Slot state with payloads.
pub(super) enum SlotState<O> {
    Pending,
    Completed(Arc<O>),
    Published(Arc<O>),
    Failed(Arc<SlotError>),
}

/// Bookkeeping record for one submitted input.
pub(super) struct Slot<I, O> {
    input: Arc<I>,
    state: SlotState<O>,
}

impl<I, O> Slot<I, O> {
    pub fn new(input: Arc<I>) -> Self {
        Self {
            input,
            state: SlotState::Pending,
        }
    }

    pub fn input(&self) -> &Arc<I> {
        &self.input
    }

    pub fn status(&self) -> SlotStatus {
        match self.state {
            SlotState::Pending => SlotStatus::Pending,
            SlotState::Completed(_) => SlotStatus::Completed,
            SlotState::Published(_) => SlotStatus::Published,
            SlotState::Failed(_) => SlotStatus::Failed,
        }
    }

    /// Pending → Completed. Returns `false` (and changes nothing) from any other state.
    pub fn complete(&mut self, output: Arc<O>) -> bool {
        if !matches!(self.state, SlotState::Pending) {
            return false;
        }
        self.state = SlotState::Completed(output);
        true
    }

    /// Pending → Failed. Returns `false` (and changes nothing) from any other state.
    pub fn fail(&mut self, error: Arc<SlotError>) -> bool {
        if !matches!(self.state, SlotState::Pending) {
            return false;
        }
        self.state = SlotState::Failed(error);
        true
    }

    /// Completed → Published, returning the output to deliver.
    ///
    /// Returns `None` (and changes nothing) from any other state.
    pub fn publish(&mut self) -> Option<Arc<O>> {
        let output = match &self.state {
            SlotState::Completed(output) => Arc::clone(output),
            _ => return None,
        };
        self.state = SlotState::Published(Arc::clone(&output));
        Some(output)
    }

    /// Output of a completed or published slot.
    pub fn output(&self) -> Option<&Arc<O>> {
        match &self.state {
            SlotState::Completed(output) | SlotState::Published(output) => Some(output),
            _ => None,
        }
    }

    /// Error of a failed slot.
    pub fn error(&self) -> Option<&Arc<SlotError>> {
        match &self.state {
            SlotState::Failed(error) => Some(error),
            _ => None,
        }
    }
}
