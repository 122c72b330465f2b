//! # seqvisor
//!
//! **Seqvisor** runs an asynchronous operation on every item of an input stream
//! concurrently and publishes the results to its observers in a chosen order.
//!
//! Inputs are submitted one at a time and processed immediately, without waiting
//! for earlier inputs. Outputs are released either as soon as each one completes,
//! or strictly in the order the inputs were submitted, holding back results that
//! finish early until everything before them has been published.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     submit(a)          submit(b)          submit(c)         complete()
//!         │                  │                  │                  │
//!         ▼                  ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  OrderedProcessor                                                     │
//! │  - Coordinator (slots, publish cursor, counters)  behind one Mutex    │
//! │  - JoinSet of slot tasks (one per input)                              │
//! │  - ObserverSet (per-observer queues + workers)                        │
//! │  - Bus (diagnostic events)                                            │
//! └──────┬──────────────────┬──────────────────┬──────────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │ slot #0  │       │ slot #1  │       │ slot #2  │   Operation::process
//!   │ 300ms    │       │ 100ms    │       │ 200ms    │   (timeout / cancel / panic)
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘
//!        └──────── finish_slot(i, result) ─────┘
//!                           ▼
//!              OrderMode::Completion: 1, 2, 0
//!              OrderMode::Submission: 0, 1, 2
//!                           ▼
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!           observer1   observer2   observerN    on_next / on_error / on_completed
//! ```
//!
//! ### Slot lifecycle
//! ```text
//! Pending ──► Completed ──► Published
//!    │
//!    └──────► Failed ──► on_error to observers
//!                        ├─ FailurePolicy::Stall → later slots wait (submission order),
//!                        │                         stream never completes
//!                        └─ FailurePolicy::Skip  → cursor steps over it, counts as drained
//!
//! complete() + every slot drained → on_completed exactly once, then no more notifications
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Processing**    | Concurrent per-input operations with ordered publication.     | [`OrderedProcessor`], [`ProcessorBuilder`]  |
//! | **Operations**    | Define the processing step as a closure or a trait impl.      | [`Operation`], [`OperationFn`], [`OperationRef`] |
//! | **Observers**     | Receive outputs, errors and the terminal notification.        | [`Observer`], [`Subscription`]              |
//! | **Policies**      | Choose the publication order and failure handling.            | [`OrderMode`], [`FailurePolicy`]            |
//! | **Errors**        | Typed errors for misuse, slot failures and shutdown.          | [`UsageError`], [`ProcessError`], [`SlotError`], [`RuntimeError`] |
//! | **Diagnostics**   | Broadcast stream of lifecycle events.                         | [`Event`], [`EventKind`]                    |
//! | **Configuration** | Centralize processor settings.                                | [`ProcessorConfig`]                         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use seqvisor::{
//!     FailurePolicy, Observer, OperationFn, OperationRef, OrderMode, OrderedProcessor,
//!     ProcessError, SlotError,
//! };
//!
//! struct Print;
//!
//! #[async_trait]
//! impl Observer<String> for Print {
//!     async fn on_next(&self, output: &String) {
//!         println!("next: {output}");
//!     }
//!     async fn on_error(&self, error: &SlotError) {
//!         println!("error: {error}");
//!     }
//!     async fn on_completed(&self) {
//!         println!("completed");
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetch: OperationRef<u64, String> =
//!         OperationFn::arc("fetch", |delay: Arc<u64>, ctx: CancellationToken| async move {
//!             tokio::select! {
//!                 _ = tokio::time::sleep(Duration::from_millis(*delay)) => {
//!                     Ok(format!("waited {delay}ms"))
//!                 }
//!                 _ = ctx.cancelled() => Err(ProcessError::Canceled),
//!             }
//!         });
//!
//!     let processor = OrderedProcessor::builder(fetch)
//!         .with_order(OrderMode::Submission)
//!         .with_failure_policy(FailurePolicy::Skip)
//!         .with_timeout(Duration::from_secs(5))
//!         .build();
//!     let _sub = processor.subscribe(Arc::new(Print));
//!
//!     for delay in [30, 10, 20] {
//!         processor.submit(delay)?;
//!     }
//!     processor.complete();
//!     processor.join().await;
//!
//!     assert_eq!(processor.stats().published, 3);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod observers;
mod operations;
mod policies;

// ---- Public re-exports ----

pub use core::{OrderedProcessor, ProcessorBuilder, ProcessorConfig, SlotIndex, SlotStatus, Stats};
pub use error::{ProcessError, RuntimeError, SlotError, UsageError};
pub use events::{Event, EventKind};
pub use observers::{Observer, ObserverId, Subscription};
pub use operations::{BoxOperationFuture, Operation, OperationFn, OperationRef};
pub use policies::{FailurePolicy, OrderMode};

// Optional: expose a simple built-in event printer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogWriter;
