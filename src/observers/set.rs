//! # Non-blocking fan-out to the observer table.
//!
//! Provides [`ObserverSet`], the subscriber table of a processor. Publication order is
//! fixed by *enqueueing* under the coordinator lock; callbacks run later in per-observer
//! workers, outside the lock.
//!
//! ## Architecture
//! ```text
//! emit(notification)            (called under the coordinator lock)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► observer1.on_next()/on_error()/on_completed()
//!     │   (unbounded)        └──────► panic → ObserverPanicked
//!     ├──► [queue 2] ──► worker 2 ──► observer2...
//!     └──► [queue N] ──► worker N ──► observerN...
//! ```
//!
//! ## Rules
//! - **Per-observer FIFO**: each observer sees notifications in enqueue order
//! - **No cross-observer ordering**: observer A may handle output N while B handles N+5
//! - **Never drops**: queues are unbounded, so every enqueued notification is delivered
//! - **Non-blocking**: `emit()` returns immediately (unbounded `send`)
//! - **Isolation**: slow/panicking observer doesn't affect others
//! - **Removal is forward-only**: removing an observer drops its sender; its worker still
//!   delivers what was already queued, then exits
//!
//! ## Panic handling
//! Worker tasks use `catch_unwind` to isolate panics:
//! - Panic is caught and converted to an `ObserverPanicked` event
//! - Worker continues with the next notification
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if the observer uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::error::{SlotError, describe_panic};
use crate::events::{Bus, Event, EventKind};
use crate::observers::Observer;

/// Identity of a registered observer, unique per processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// One queued delivery.
pub(crate) enum Notification<O> {
    Next(Arc<O>),
    Error(Arc<SlotError>),
    Completed,
}

impl<O> Clone for Notification<O> {
    fn clone(&self) -> Self {
        match self {
            Notification::Next(o) => Notification::Next(Arc::clone(o)),
            Notification::Error(e) => Notification::Error(Arc::clone(e)),
            Notification::Completed => Notification::Completed,
        }
    }
}

/// Per-observer channel metadata.
struct ObserverChannel<O> {
    name: &'static str,
    sender: mpsc::UnboundedSender<Notification<O>>,
}

/// Subscriber table of one processor.
pub(crate) struct ObserverSet<O> {
    channels: HashMap<ObserverId, ObserverChannel<O>>,
    next_id: u64,
    closed: bool,
    bus: Bus,
}

impl<O> ObserverSet<O>
where
    O: Send + Sync + 'static,
{
    pub fn new(bus: Bus) -> Self {
        Self {
            channels: HashMap::new(),
            next_id: 0,
            closed: false,
            bus,
        }
    }

    /// Registers an observer and returns its id plus the worker future that drives it.
    ///
    /// The caller spawns the worker (the set itself never spawns, so it stays usable
    /// under a synchronous lock). Once the set is closed nothing will ever be delivered,
    /// so no channel is kept and the returned worker exits immediately.
    pub fn insert(
        &mut self,
        observer: Arc<dyn Observer<O>>,
    ) -> (ObserverId, impl Future<Output = ()> + Send + 'static) {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        let name = observer.name();
        let (tx, rx) = mpsc::unbounded_channel();

        if !self.closed {
            self.channels.insert(id, ObserverChannel { name, sender: tx });
            self.bus
                .publish(Event::new(EventKind::ObserverAdded).with_observer(name));
        }

        (id, run_worker(observer, rx, self.bus.clone()))
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        match self.channels.remove(&id) {
            Some(channel) => {
                self.bus
                    .publish(Event::new(EventKind::ObserverRemoved).with_observer(channel.name));
                true
            }
            None => false,
        }
    }

    /// Enqueues a notification for every registered observer.
    ///
    /// A closed queue means the worker is gone (processor shutting down); the observer
    /// is skipped.
    pub fn emit(&self, notification: &Notification<O>) {
        for channel in self.channels.values() {
            let _ = channel.sender.send(notification.clone());
        }
    }

    /// Drops every sender and refuses new observers; workers drain their queues and exit.
    pub fn close_all(&mut self) {
        self.closed = true;
        self.channels.clear();
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[cfg(test)]
    pub fn contains(&self, id: ObserverId) -> bool {
        self.channels.contains_key(&id)
    }
}

/// Delivers queued notifications to one observer until its queue closes.
async fn run_worker<O>(
    observer: Arc<dyn Observer<O>>,
    mut rx: mpsc::UnboundedReceiver<Notification<O>>,
    bus: Bus,
) where
    O: Send + Sync + 'static,
{
    while let Some(notification) = rx.recv().await {
        let terminal = matches!(notification, Notification::Completed);
        let fut = async {
            match &notification {
                Notification::Next(output) => observer.on_next(output.as_ref()).await,
                Notification::Error(error) => observer.on_error(error.as_ref()).await,
                Notification::Completed => observer.on_completed().await,
            }
        };

        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            bus.publish(Event::observer_panicked(
                observer.name(),
                describe_panic(&*panic_err),
            ));
        }
        if terminal {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Observer<u32> for Collect {
        async fn on_next(&self, output: &u32) {
            self.seen.lock().push(format!("next:{output}"));
        }
        async fn on_error(&self, error: &SlotError) {
            self.seen.lock().push(format!("error:{}", error.index));
        }
        async fn on_completed(&self) {
            self.seen.lock().push("completed".into());
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Panicky;

    #[async_trait]
    impl Observer<u32> for Panicky {
        async fn on_next(&self, output: &u32) {
            if *output == 1 {
                panic!("boom");
            }
        }
        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn test_worker_delivers_in_fifo_order_and_stops_after_completed() {
        let bus = Bus::new(16);
        let mut set = ObserverSet::<u32>::new(bus);
        let obs = Arc::new(Collect::default());
        let (_id, worker) = set.insert(obs.clone());

        set.emit(&Notification::Next(Arc::new(1)));
        set.emit(&Notification::Error(Arc::new(SlotError::new(
            1,
            crate::ProcessError::fail("x"),
        ))));
        set.emit(&Notification::Next(Arc::new(2)));
        set.emit(&Notification::Completed);
        set.emit(&Notification::Next(Arc::new(3)));

        worker.await;
        assert_eq!(
            *obs.seen.lock(),
            vec!["next:1", "error:1", "next:2", "completed"]
        );
    }

    #[tokio::test]
    async fn test_removed_observer_gets_queued_items_only() {
        let bus = Bus::new(16);
        let mut set = ObserverSet::<u32>::new(bus);
        let obs = Arc::new(Collect::default());
        let (id, worker) = set.insert(obs.clone());

        set.emit(&Notification::Next(Arc::new(1)));
        assert!(set.remove(id));
        assert!(!set.remove(id));
        set.emit(&Notification::Next(Arc::new(2)));

        worker.await;
        assert_eq!(*obs.seen.lock(), vec!["next:1"]);
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn test_panic_is_reported_and_worker_continues() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut set = ObserverSet::<u32>::new(bus);
        let (_id, worker) = set.insert(Arc::new(Panicky));

        set.emit(&Notification::Next(Arc::new(1)));
        set.emit(&Notification::Next(Arc::new(2)));
        set.close_all();
        worker.await;

        let mut panics = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::ObserverPanicked {
                panics.push(ev);
            }
        }
        assert_eq!(panics.len(), 1);
        assert_eq!(panics[0].observer.as_deref(), Some("panicky"));
        assert_eq!(panics[0].reason.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_insert_after_close_exits_immediately() {
        let bus = Bus::new(4);
        let mut set = ObserverSet::<u32>::new(bus);
        set.close_all();
        let obs = Arc::new(Collect::default());
        let (id, worker) = set.insert(obs.clone());
        set.emit(&Notification::Completed);

        worker.await;
        assert!(!set.contains(id));
        assert!(obs.seen.lock().is_empty());
    }
}
