//! # LogWriter: simple event printer
//!
//! A minimal diagnostics consumer that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [submitted] slot=0
//! [completed] slot=1
//! [published] slot=0
//! [failed] slot=2 err="processing failed: boom"
//! [timeout] slot=3 timeout_ms=500
//! [input-closed]
//! [stream-completed]
//! [observer-panicked] observer="printer" info="boom"
//! ```

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::events::{Event, EventKind};

/// Event writer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Spawns a task that prints every event received on `rx` until the bus closes.
    ///
    /// Pass the receiver from [`OrderedProcessor::events`](crate::OrderedProcessor::events).
    pub fn attach(self, mut rx: broadcast::Receiver<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => self.write(&ev),
                    Err(RecvError::Lagged(n)) => println!("[lagged] skipped={n}"),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Prints one event.
    pub fn write(&self, e: &Event) {
        println!("{}", Self::format(e));
    }

    /// Renders one event as a log line.
    pub fn format(e: &Event) -> String {
        let slot = e.slot.map_or_else(|| "-".to_string(), |s| s.to_string());
        match e.kind {
            EventKind::SlotSubmitted => format!("[submitted] slot={slot}"),
            EventKind::SlotCompleted => format!("[completed] slot={slot}"),
            EventKind::SlotPublished => format!("[published] slot={slot}"),
            EventKind::SlotFailed => format!(
                "[failed] slot={slot} err={:?}",
                e.reason.as_deref().unwrap_or("unknown")
            ),
            EventKind::TimeoutHit => format!(
                "[timeout] slot={slot} timeout_ms={}",
                e.timeout_ms.unwrap_or_default()
            ),
            EventKind::InputClosed => "[input-closed]".to_string(),
            EventKind::StreamCompleted => "[stream-completed]".to_string(),
            EventKind::ObserverAdded => format!(
                "[observer-added] observer={:?}",
                e.observer.as_deref().unwrap_or("unknown")
            ),
            EventKind::ObserverRemoved => format!(
                "[observer-removed] observer={:?}",
                e.observer.as_deref().unwrap_or("unknown")
            ),
            EventKind::ObserverPanicked => format!(
                "[observer-panicked] observer={:?} info={:?}",
                e.observer.as_deref().unwrap_or("unknown"),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
            EventKind::ShutdownRequested => "[shutdown-requested]".to_string(),
            EventKind::AllStoppedWithin => "[all-stopped-within-grace]".to_string(),
            EventKind::GraceExceeded => "[grace-exceeded]".to_string(),
        }
    }
}
