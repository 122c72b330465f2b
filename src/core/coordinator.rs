//! # Publish coordinator: the single critical section of a processor.
//!
//! [`Coordinator`] owns every piece of mutable state the ordering guarantees depend on:
//! the slot list, the publish cursor, the counters and the observer table. The processor
//! keeps it behind one mutex, so slot append, completion/publish decisions and
//! observer add/remove are totally ordered.
//!
//! ## Publication
//! ```text
//! finish_slot(i, Ok(out))                      finish_slot(i, Err(e))
//!   ├─► slot i: Pending → Completed              ├─► slot i: Pending → Failed
//!   ├─► OrderMode::Completion → publish(i)       ├─► emit Error(i) to observers
//!   └─► OrderMode::Submission → sweep()          └─► Submission → sweep() (Skip may unblock)
//!   └─► try_finish()                             └─► try_finish()
//!
//! sweep():
//!   while slot[cursor] is
//!     ├─ Completed               → publish(cursor), cursor += 1
//!     ├─ Failed && Skip          → cursor += 1
//!     └─ Pending | Failed&&Stall → stop
//! ```
//!
//! ## Rules
//! - Publishing only **enqueues** notifications; observer callbacks run in their workers,
//!   after the lock is released. Enqueue order is delivery order.
//! - A slot is published at most once and never before it is completed.
//! - The terminal notification is enqueued exactly once, after `close()` and once the
//!   stream is drained, and it is the last thing any observer receives.
//! - Drained means every slot was published. Only `FailurePolicy::Skip` lets a failed
//!   slot count as drained; under `Stall` a failure keeps the stream open in both modes.
//! - Late or duplicate `finish_slot` calls for a slot that already left `Pending` are ignored.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::core::slot::{Slot, SlotIndex, SlotStatus};
use crate::error::{ProcessError, SlotError, UsageError};
use crate::events::{Bus, Event, EventKind};
use crate::observers::{Notification, Observer, ObserverId, ObserverSet};
use crate::policies::{FailurePolicy, OrderMode};

/// Snapshot of a processor's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Inputs accepted by `submit`.
    pub submitted: usize,
    /// Slots whose operation produced an output (published or not yet).
    pub completed: usize,
    /// Slots whose output was handed to the observers.
    pub published: usize,
    /// Slots whose operation failed.
    pub failed: usize,
}

impl Stats {
    /// Slots still waiting for their operation.
    pub fn in_flight(&self) -> usize {
        self.submitted - self.completed - self.failed
    }
}

/// Ordering state machine of one processor.
pub(crate) struct Coordinator<I, O> {
    order: OrderMode,
    on_failure: FailurePolicy,

    slots: Vec<Slot<I, O>>,
    /// Next slot to publish (submission order only).
    cursor: SlotIndex,
    completed: usize,
    published: usize,
    failed: usize,

    /// End-of-input signalled.
    closed: bool,
    /// Terminal notification dispatched.
    finished: bool,

    observers: ObserverSet<O>,
    bus: Bus,
    done: watch::Sender<bool>,
}

impl<I, O> Coordinator<I, O>
where
    O: Send + Sync + 'static,
{
    pub fn new(
        order: OrderMode,
        on_failure: FailurePolicy,
        bus: Bus,
        done: watch::Sender<bool>,
    ) -> Self {
        Self {
            order,
            on_failure,
            slots: Vec::new(),
            cursor: 0,
            completed: 0,
            published: 0,
            failed: 0,
            closed: false,
            finished: false,
            observers: ObserverSet::new(bus.clone()),
            bus,
            done,
        }
    }

    /// Appends a slot for `input` and returns its index.
    pub fn admit(&mut self, input: Arc<I>) -> Result<SlotIndex, UsageError> {
        if self.closed {
            return Err(UsageError::SubmitAfterComplete);
        }
        let index = self.slots.len();
        self.slots.push(Slot::new(input));
        self.bus
            .publish(Event::new(EventKind::SlotSubmitted).with_slot(index));
        Ok(index)
    }

    /// Marks end-of-input. Returns `false` if it was already marked.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.bus.publish(Event::new(EventKind::InputClosed));
        self.try_finish();
        true
    }

    /// Records the outcome of slot `index`'s operation and publishes whatever became publishable.
    pub fn finish_slot(&mut self, index: SlotIndex, result: Result<O, ProcessError>) {
        match result {
            Ok(output) => self.complete_slot(index, output),
            Err(error) => self.fail_slot(index, error),
        }
        self.try_finish();
    }

    fn complete_slot(&mut self, index: SlotIndex, output: O) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if !slot.complete(Arc::new(output)) {
            return;
        }
        self.completed += 1;
        self.bus
            .publish(Event::new(EventKind::SlotCompleted).with_slot(index));

        match self.order {
            OrderMode::Completion => self.publish(index),
            OrderMode::Submission => self.sweep(),
        }
    }

    fn fail_slot(&mut self, index: SlotIndex, error: ProcessError) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        let reason = error.to_string();
        let error = Arc::new(SlotError::new(index, error));
        if !slot.fail(Arc::clone(&error)) {
            return;
        }
        self.failed += 1;
        self.bus.publish(
            Event::new(EventKind::SlotFailed)
                .with_slot(index)
                .with_reason(reason),
        );
        self.observers.emit(&Notification::Error(error));

        if self.order.keeps_submission_order() {
            self.sweep();
        }
    }

    /// Publishes the contiguous run of completed slots starting at the cursor.
    fn sweep(&mut self) {
        while let Some(slot) = self.slots.get(self.cursor) {
            match slot.status() {
                SlotStatus::Completed => {
                    self.publish(self.cursor);
                    self.cursor += 1;
                }
                SlotStatus::Failed if self.on_failure == FailurePolicy::Skip => {
                    self.cursor += 1;
                }
                _ => break,
            }
        }
    }

    fn publish(&mut self, index: SlotIndex) {
        let Some(output) = self.slots.get_mut(index).and_then(Slot::publish) else {
            return;
        };
        self.published += 1;
        self.bus
            .publish(Event::new(EventKind::SlotPublished).with_slot(index));
        self.observers.emit(&Notification::Next(output));
    }

    /// Every slot has been published or, under `Skip`, passed as failed.
    ///
    /// Under `Stall` a failed slot is never drained, in either order mode.
    fn is_drained(&self) -> bool {
        match (self.order, self.on_failure) {
            (OrderMode::Submission, _) => self.cursor == self.slots.len(),
            (OrderMode::Completion, FailurePolicy::Stall) => self.published == self.slots.len(),
            (OrderMode::Completion, FailurePolicy::Skip) => {
                self.published + self.failed == self.slots.len()
            }
        }
    }

    fn try_finish(&mut self) {
        if self.finished || !self.closed || !self.is_drained() {
            return;
        }
        self.finished = true;
        self.observers.emit(&Notification::Completed);
        self.observers.close_all();
        self.bus.publish(Event::new(EventKind::StreamCompleted));
        self.done.send_replace(true);
    }

    pub fn subscribe(
        &mut self,
        observer: Arc<dyn Observer<O>>,
    ) -> (ObserverId, impl Future<Output = ()> + Send + 'static) {
        self.observers.insert(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Drops all observer queues without a terminal notification (shutdown path).
    pub fn release_observers(&mut self) {
        self.observers.close_all();
    }

    pub fn stats(&self) -> Stats {
        Stats {
            submitted: self.slots.len(),
            completed: self.completed,
            published: self.published,
            failed: self.failed,
        }
    }

    pub fn status(&self, index: SlotIndex) -> Option<SlotStatus> {
        self.slots.get(index).map(Slot::status)
    }

    pub fn input(&self, index: SlotIndex) -> Option<Arc<I>> {
        self.slots.get(index).map(|slot| Arc::clone(slot.input()))
    }

    pub fn output(&self, index: SlotIndex) -> Option<Arc<O>> {
        self.slots.get(index).and_then(|slot| slot.output().cloned())
    }

    pub fn error(&self, index: SlotIndex) -> Option<Arc<SlotError>> {
        self.slots.get(index).and_then(|slot| slot.error().cloned())
    }

    /// Indices of slots whose operation has not finished.
    pub fn pending(&self) -> Vec<SlotIndex> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.status() == SlotStatus::Pending)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
