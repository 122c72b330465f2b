//! # Observer trait.
//!
//! Provides [`Observer`], the callback surface outputs are delivered to.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently of the processor and of other observers)
//! - **Per-observer FIFO queue** (unbounded; notifications are never dropped)
//! - **Panic isolation** (panics are caught and reported as `EventKind::ObserverPanicked`)
//!
//! ## Architecture
//! ```text
//! Coordinator (under lock) ──► [queue] ──► worker task ──► on_next / on_error / on_completed
//!                                                     └─► panic caught → EventKind::ObserverPanicked
//! ```
//!
//! ## Rules
//! - Notifications arrive in the order the coordinator decided them; `on_completed` is always last.
//! - A slow observer only grows its own queue; it never holds up publication.
//! - A panic in one callback does not stop later callbacks for the same observer.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use seqvisor::{Observer, SlotError};
//!
//! #[derive(Default)]
//! struct Sum(AtomicU64);
//!
//! #[async_trait]
//! impl Observer<u64> for Sum {
//!     async fn on_next(&self, output: &u64) {
//!         self.0.fetch_add(*output, Ordering::Relaxed);
//!     }
//!
//!     async fn on_error(&self, error: &SlotError) {
//!         eprintln!("slot {} failed: {}", error.index, error.source);
//!     }
//!
//!     fn name(&self) -> &'static str { "sum" }
//! }
//! ```

use async_trait::async_trait;

use crate::error::SlotError;

/// Receiver of published outputs, slot errors and the terminal notification.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Observer<O>: Send + Sync + 'static
where
    O: Send + Sync + 'static,
{
    /// Receives one published output.
    ///
    /// Called from the observer's worker task, never under the processor's lock.
    async fn on_next(&self, output: &O);

    /// Receives the error of a failed slot.
    ///
    /// Default: ignore.
    async fn on_error(&self, error: &SlotError) {
        let _ = error;
    }

    /// Receives the terminal notification; no further callbacks follow.
    ///
    /// Default: ignore.
    async fn on_completed(&self) {}

    /// Returns the observer name used in diagnostic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
