//! Error types used by the processor and by processing operations.
//!
//! This module defines four error types:
//!
//! - [`UsageError`]: contract violations by the caller (returned synchronously).
//! - [`ProcessError`]: failures of a single processing operation.
//! - [`SlotError`]: a [`ProcessError`] tagged with the slot it belongs to (what observers see).
//! - [`RuntimeError`]: failures of the processor runtime itself (shutdown).
//!
//! All enums provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;
use std::time::Duration;

use thiserror::Error;

use crate::core::SlotIndex;

/// # Contract violations by the caller.
///
/// Surfaced synchronously to the caller of
/// [`OrderedProcessor::submit`](crate::OrderedProcessor::submit), never delivered to observers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    /// An input was submitted after end-of-input was signalled.
    #[error("submission after stream completion")]
    SubmitAfterComplete,
}

impl UsageError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use seqvisor::UsageError;
    ///
    /// assert_eq!(UsageError::SubmitAfterComplete.as_label(), "usage_submit_after_complete");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            UsageError::SubmitAfterComplete => "usage_submit_after_complete",
        }
    }
}

/// # Errors produced by a processing operation.
///
/// A failed operation moves its slot into the absorbing `Failed` state; the error is
/// forwarded (wrapped in [`SlotError`]) to every current observer. Nothing is retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The operation returned an error.
    #[error("processing failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The operation exceeded the configured per-slot timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The operation was cancelled by processor shutdown.
    #[error("context cancelled")]
    Canceled,

    /// The operation panicked.
    #[error("processing panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ProcessError {
    /// Shorthand for [`ProcessError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use seqvisor::ProcessError;
    ///
    /// let err = ProcessError::fail("connection refused");
    /// assert_eq!(err.to_string(), "processing failed: connection refused");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ProcessError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProcessError::Fail { .. } => "process_failed",
            ProcessError::Timeout { .. } => "process_timeout",
            ProcessError::Canceled => "process_canceled",
            ProcessError::Panicked { .. } => "process_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ProcessError::Fail { error } => format!("error: {error}"),
            ProcessError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ProcessError::Canceled => "context cancelled".to_string(),
            ProcessError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Returns `true` when the slot was stopped from the outside (shutdown)
    /// rather than failing on its own.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ProcessError::Canceled)
    }
}

/// A [`ProcessError`] bound to the slot whose operation produced it.
///
/// This is the payload of [`Observer::on_error`](crate::Observer::on_error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("slot {index}: {source}")]
pub struct SlotError {
    /// Index of the failed slot.
    pub index: SlotIndex,
    /// What went wrong.
    #[source]
    pub source: ProcessError,
}

impl SlotError {
    /// Creates a new slot error.
    pub fn new(index: SlotIndex, source: ProcessError) -> Self {
        Self { index, source }
    }
}

/// # Errors produced by the processor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some slots were still in flight and had to be aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck slots: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Indices of slots that were still pending.
        stuck: Vec<SlotIndex>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use seqvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck slots={stuck:?}")
            }
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn describe_panic(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
