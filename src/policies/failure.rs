//! # What a failed slot does to publication and stream completion.
//!
//! A slot whose operation fails never gets an output. In submission order every
//! later slot is waiting on it, so the processor needs a rule:
//!
//! ```text
//! slots:   [0: Failed] [1: Completed] [2: Completed]
//!
//! FailurePolicy::Stall → cursor stays at 0; 1 and 2 are never published,
//!                        the stream never completes
//! FailurePolicy::Skip  → cursor passes 0; 1 and 2 are published,
//!                        the stream completes normally
//! ```
//!
//! In completion order no output waits on a failed slot, but the policy still decides
//! whether the stream can finish:
//!
//! ```text
//! FailurePolicy::Stall → a failed slot is never published, so the terminal
//!                        notification never fires
//! FailurePolicy::Skip  → a failed slot counts as drained; the stream completes
//!                        once every other slot is published
//! ```

/// Policy for failed slots in submission-order mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// A failed slot blocks the sweep forever (default).
    ///
    /// In submission order every output behind it stays unpublished. In both modes the
    /// terminal notification never fires.
    /// Observers still receive the error, so they can decide to shut the processor down.
    #[default]
    Stall,
    /// A failed slot is terminal: the sweep steps over it and it counts as drained.
    Skip,
}
