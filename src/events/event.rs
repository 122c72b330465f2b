//! # Diagnostic events emitted by the processor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Slot events**: a slot's way through the processor (submitted, completed, published, failed)
//! - **Stream events**: end-of-input and the terminal notification
//! - **Runtime events**: observer bookkeeping, observer panics, shutdown
//!
//! The [`Event`] struct carries additional metadata such as timestamps, slot index,
//! observer name, reasons, and timeouts.
//!
//! Diagnostic events are separate from observer notifications: observers receive
//! outputs, diagnostics describe what the engine did to produce them.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Slot and stream events are published from inside the coordinator's critical section,
//! so their `seq` order matches the order decisions were taken.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use seqvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SlotFailed)
//!     .with_slot(3)
//!     .with_reason("boom")
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::SlotFailed);
//! assert_eq!(ev.slot, Some(3));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::SlotIndex;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Slot events ===
    /// A new slot was appended and its operation launched.
    ///
    /// Sets:
    /// - `slot`: assigned index
    SlotSubmitted,

    /// A slot's operation produced an output.
    ///
    /// Sets:
    /// - `slot`: slot index
    SlotCompleted,

    /// A slot's output was handed to the observers.
    ///
    /// Sets:
    /// - `slot`: slot index
    SlotPublished,

    /// A slot's operation failed, timed out, panicked or was cancelled.
    ///
    /// Sets:
    /// - `slot`: slot index
    /// - `reason`: error message
    SlotFailed,

    /// A slot's operation exceeded the configured timeout (always followed by `SlotFailed`).
    ///
    /// Sets:
    /// - `slot`: slot index
    /// - `timeout_ms`: configured timeout (ms)
    TimeoutHit,

    // === Stream events ===
    /// End-of-input was signalled.
    InputClosed,

    /// The terminal completion notification was dispatched to the observers.
    StreamCompleted,

    // === Runtime events ===
    /// An observer was registered.
    ///
    /// Sets:
    /// - `observer`: observer name
    ObserverAdded,

    /// An observer was removed (unsubscribed).
    ///
    /// Sets:
    /// - `observer`: observer name
    ObserverRemoved,

    /// An observer panicked inside a callback.
    ///
    /// Sets:
    /// - `observer`: observer name
    /// - `reason`: panic info/message
    ObserverPanicked,

    /// Shutdown requested.
    ShutdownRequested,

    /// All in-flight slots stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some slots did not stop in time.
    GraceExceeded,
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Slot index, if applicable.
    pub slot: Option<SlotIndex>,
    /// Observer name, if applicable.
    pub observer: Option<Arc<str>>,
    /// Human-readable reason (errors, panic details, etc.).
    pub reason: Option<Arc<str>>,
    /// Slot timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            observer: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches a slot index.
    #[inline]
    pub fn with_slot(mut self, slot: SlotIndex) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches an observer name.
    #[inline]
    pub fn with_observer(mut self, observer: impl Into<Arc<str>>) -> Self {
        self.observer = Some(observer.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::new(EventKind::ObserverPanicked)
            .with_observer(observer)
            .with_reason(info)
    }

    #[inline]
    pub fn is_slot_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SlotSubmitted
                | EventKind::SlotCompleted
                | EventKind::SlotPublished
                | EventKind::SlotFailed
                | EventKind::TimeoutHit
        )
    }
}
