//! # OrderedProcessor: concurrent processing, ordered publication.
//!
//! The [`OrderedProcessor`] accepts inputs one by one, runs the configured
//! [`Operation`](crate::Operation) on each of them concurrently, and publishes the outputs to
//! its observers either in completion order or in submission order.
//!
//! ## Key responsibilities
//! - assign slot indices atomically and launch one tracked task per slot
//! - feed every slot outcome into the `Coordinator` (single critical section)
//! - spawn one delivery worker per observer
//! - expose end-of-input, waiting, introspection and graceful shutdown
//!
//! ## High-level architecture
//! ```text
//! submit(input)
//!   ├─► lock(coordinator): admit → slot index i          (UsageError if closed)
//!   └─► tasks.spawn(run_slot(operation, input_i, child_token))
//!                          │
//!                          ▼ (any order, fully concurrent)
//!          lock(coordinator): finish_slot(i, result)
//!                          ├─► Completion: publish(i)
//!                          ├─► Submission: sweep() from cursor
//!                          └─► closed && drained → Completed (once)
//!                                       │
//!                     ObserverSet: per-observer FIFO queues (filled under the lock)
//!                          ┌────────────┼────────────┐
//!                          ▼            ▼            ▼
//!                      worker 1     worker 2     worker N     (outside the lock)
//!                          │            │            │
//!                  on_next / on_error / on_completed
//!
//! Shutdown path:
//!   shutdown()
//!     └─► complete() + runtime_token.cancel()  → pending slots fail with Canceled
//!     └─► wait slots, release observers, wait workers (each within cfg.grace)
//!            ├─ Ok        → publish AllStoppedWithin
//!            └─ Timeout   → abort, publish GraceExceeded, RuntimeError::GraceExceeded
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use seqvisor::{Observer, OperationFn, OperationRef, OrderedProcessor, ProcessError};
//!
//! struct Print;
//!
//! #[async_trait]
//! impl Observer<u64> for Print {
//!     async fn on_next(&self, output: &u64) { println!("{output}"); }
//!     async fn on_completed(&self) { println!("done"); }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let slow_square: OperationRef<u64, u64> =
//!         OperationFn::arc("square", |n: Arc<u64>, _ctx: CancellationToken| async move {
//!             tokio::time::sleep(Duration::from_millis(30 - 10 * *n)).await;
//!             Ok::<_, ProcessError>(*n * *n)
//!         });
//!
//!     // `true`: publish in submission order (0, 1, 4) even though 2 finishes first.
//!     let processor = OrderedProcessor::new(slow_square, true);
//!     let _sub = processor.subscribe(Arc::new(Print));
//!
//!     for n in 0..3 {
//!         processor.submit(n)?;
//!     }
//!     processor.complete();
//!     processor.join().await;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::{
    builder::ProcessorBuilder,
    config::ProcessorConfig,
    coordinator::{Coordinator, Stats},
    runner::run_slot,
    slot::{SlotIndex, SlotStatus},
};
use crate::error::{RuntimeError, SlotError, UsageError};
use crate::events::{Bus, Event, EventKind};
use crate::observers::{Observer, Subscription, Unsubscribe};
use crate::operations::OperationRef;
use crate::policies::OrderMode;

/// State shared between the processor, its slot tasks and its subscription handles.
struct Shared<I, O> {
    coordinator: Mutex<Coordinator<I, O>>,
}

impl<I, O> Unsubscribe for Shared<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn remove_observer(&self, id: crate::observers::ObserverId) {
        self.coordinator.lock().unsubscribe(id);
    }
}

/// Runs an operation on each submitted input concurrently and publishes the outputs in order.
///
/// Must be used from within a Tokio runtime: `submit` and `subscribe` spawn tasks.
pub struct OrderedProcessor<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    shared: Arc<Shared<I, O>>,
    operation: OperationRef<I, O>,
    cfg: ProcessorConfig,
    bus: Bus,
    runtime_token: CancellationToken,
    /// One task per slot.
    tasks: Mutex<JoinSet<()>>,
    /// One delivery worker per observer.
    workers: Mutex<JoinSet<()>>,
    done: watch::Receiver<bool>,
}

impl<I, O> OrderedProcessor<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    /// Creates a processor with default configuration.
    ///
    /// `maintain_order = true` publishes in submission order, `false` in completion order.
    pub fn new(operation: OperationRef<I, O>, maintain_order: bool) -> Self {
        Self::builder(operation)
            .with_order(OrderMode::from_flag(maintain_order))
            .build()
    }

    /// Returns a builder for full configuration.
    pub fn builder(operation: OperationRef<I, O>) -> ProcessorBuilder<I, O> {
        ProcessorBuilder::new(operation)
    }

    pub(crate) fn from_parts(operation: OperationRef<I, O>, cfg: ProcessorConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let (done_tx, done_rx) = watch::channel(false);
        let coordinator = Coordinator::new(cfg.order, cfg.on_failure, bus.clone(), done_tx);

        Self {
            shared: Arc::new(Shared {
                coordinator: Mutex::new(coordinator),
            }),
            operation,
            cfg,
            bus,
            runtime_token: CancellationToken::new(),
            tasks: Mutex::new(JoinSet::new()),
            workers: Mutex::new(JoinSet::new()),
            done: done_rx,
        }
    }

    /// Submits one input and launches its operation; returns the slot index.
    ///
    /// Never waits for processing. Fails with [`UsageError::SubmitAfterComplete`] once
    /// [`complete`](Self::complete) has been called.
    pub fn submit(&self, input: I) -> Result<SlotIndex, UsageError> {
        let input = Arc::new(input);

        // Holding the task set across admit keeps index order and spawn order identical
        // and keeps shutdown from missing a slot admitted just before it.
        let mut tasks = self.tasks.lock();
        let index = self.shared.coordinator.lock().admit(Arc::clone(&input))?;

        let shared = Arc::clone(&self.shared);
        let operation = Arc::clone(&self.operation);
        let token = self.runtime_token.child_token();
        let timeout = self.cfg.slot_timeout();
        let bus = self.bus.clone();

        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            let result = run_slot(operation.as_ref(), index, input, &token, timeout, &bus).await;
            shared.coordinator.lock().finish_slot(index, result);
        });
        Ok(index)
    }

    /// Signals end-of-input. Calling it again is a no-op.
    ///
    /// The terminal notification fires once every submitted slot has been published.
    pub fn complete(&self) {
        self.shared.coordinator.lock().close();
    }

    /// Registers an observer for future outputs, errors and the terminal notification.
    ///
    /// No replay: outputs published before this call are not delivered. Subscribing after
    /// the terminal notification fired yields an inert subscription.
    pub fn subscribe(&self, observer: Arc<dyn Observer<O>>) -> Subscription {
        let (id, worker) = self.shared.coordinator.lock().subscribe(observer);

        let mut workers = self.workers.lock();
        while workers.try_join_next().is_some() {}
        workers.spawn(worker);
        drop(workers);

        let owner: Weak<dyn Unsubscribe> = Arc::downgrade(&self.shared) as Weak<dyn Unsubscribe>;
        Subscription::new(id, owner)
    }

    /// Returns a receiver of diagnostic events published from now on.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Waits until the terminal notification has been dispatched.
    ///
    /// Under [`FailurePolicy::Stall`](crate::FailurePolicy::Stall) any failed slot means this
    /// never resolves; combine with a timeout or `shutdown`.
    pub async fn completed(&self) {
        let mut done = self.done.clone();
        let _ = done.wait_for(|finished| *finished).await;
    }

    /// Waits for the terminal notification, then for every observer to have handled it.
    pub async fn join(&self) {
        self.completed().await;
        let mut workers = std::mem::take(&mut *self.workers.lock());
        while workers.join_next().await.is_some() {}
    }

    /// Closes input, cancels every in-flight slot and drains observers.
    ///
    /// Cancelled slots fail with [`ProcessError::Canceled`](crate::ProcessError::Canceled) and
    /// follow the configured failure policy. Observers that never reached the terminal
    /// notification are detached without it.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.complete();
        self.runtime_token.cancel();

        let grace = self.cfg.grace;
        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        let slots_done = time::timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        self.shared.coordinator.lock().release_observers();
        let mut workers = std::mem::take(&mut *self.workers.lock());
        let workers_done = time::timeout(grace, async {
            while workers.join_next().await.is_some() {}
        })
        .await;

        if slots_done.is_ok() && workers_done.is_ok() {
            self.bus.publish(Event::new(EventKind::AllStoppedWithin));
            return Ok(());
        }

        tasks.abort_all();
        workers.abort_all();
        self.bus.publish(Event::new(EventKind::GraceExceeded));
        let stuck = self.shared.coordinator.lock().pending();
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> Stats {
        self.shared.coordinator.lock().stats()
    }

    /// Returns the state of slot `index`, or `None` if no such slot exists.
    pub fn slot_status(&self, index: SlotIndex) -> Option<SlotStatus> {
        self.shared.coordinator.lock().status(index)
    }

    /// Returns the input recorded for slot `index`.
    pub fn input(&self, index: SlotIndex) -> Option<Arc<I>> {
        self.shared.coordinator.lock().input(index)
    }

    /// Returns the output of slot `index` once it is completed.
    pub fn output(&self, index: SlotIndex) -> Option<Arc<O>> {
        self.shared.coordinator.lock().output(index)
    }

    /// Returns the error of slot `index` if its operation failed.
    pub fn error(&self, index: SlotIndex) -> Option<Arc<SlotError>> {
        self.shared.coordinator.lock().error(index)
    }

    /// Returns `true` once end-of-input has been signalled.
    pub fn is_closed(&self) -> bool {
        self.shared.coordinator.lock().is_closed()
    }

    /// Returns `true` once the terminal notification has been dispatched.
    pub fn is_finished(&self) -> bool {
        self.shared.coordinator.lock().is_finished()
    }

    /// Number of observer workers not yet reaped (running or finished since the last
    /// `subscribe`).
    #[cfg(test)]
    pub(crate) fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.shared.coordinator.lock().observer_count()
    }

    /// The configuration this processor was built with.
    pub fn config(&self) -> &ProcessorConfig {
        &self.cfg
    }

    /// Name of the processing operation.
    pub fn operation_name(&self) -> &str {
        self.operation.name()
    }
}

impl<I, O> Drop for OrderedProcessor<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}
