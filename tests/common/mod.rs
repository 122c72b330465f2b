#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use seqvisor::{Observer, OperationFn, OperationRef, ProcessError, SlotError};

/// What an observer saw, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    Next(u64),
    Error(usize),
    Completed,
}

/// Observer that records every notification with the (paused) clock offset it arrived at.
pub struct Recorder {
    start: Instant,
    log: Mutex<Vec<(Note, u64)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            start: Instant::now(),
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn notes(&self) -> Vec<Note> {
        self.log.lock().iter().map(|(note, _)| note.clone()).collect()
    }

    /// Milliseconds since creation at which each notification arrived.
    pub fn times(&self) -> Vec<u64> {
        self.log.lock().iter().map(|(_, at)| *at).collect()
    }

    pub fn completions(&self) -> usize {
        self.notes().iter().filter(|n| **n == Note::Completed).count()
    }

    fn push(&self, note: Note) {
        let at = self.start.elapsed().as_millis() as u64;
        self.log.lock().push((note, at));
    }
}

#[async_trait]
impl Observer<u64> for Recorder {
    async fn on_next(&self, output: &u64) {
        self.push(Note::Next(*output));
    }

    async fn on_error(&self, error: &SlotError) {
        self.push(Note::Error(error.index));
    }

    async fn on_completed(&self) {
        self.push(Note::Completed);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

/// Sleeps for `input` milliseconds, then returns `input`.
pub fn sleep_echo() -> OperationRef<u64, u64> {
    OperationFn::arc("sleep-echo", |delay: Arc<u64>, _ctx: CancellationToken| async move {
        time::sleep(Duration::from_millis(*delay)).await;
        Ok::<_, ProcessError>(*delay)
    })
}

/// Like [`sleep_echo`], but fails for the input `bad`.
pub fn sleep_echo_failing_on(bad: u64) -> OperationRef<u64, u64> {
    let op = move |delay: Arc<u64>, _ctx: CancellationToken| async move {
        time::sleep(Duration::from_millis(*delay)).await;
        if *delay == bad {
            return Err(ProcessError::fail(format!("input {bad} rejected")));
        }
        Ok(*delay)
    };
    OperationFn::arc("sleep-echo-failing", op)
}

/// Sleeps for `input` milliseconds unless cancelled first.
pub fn cooperative_sleep() -> OperationRef<u64, u64> {
    OperationFn::arc("cooperative-sleep", |delay: Arc<u64>, ctx: CancellationToken| async move {
        tokio::select! {
            _ = time::sleep(Duration::from_millis(*delay)) => Ok(*delay),
            _ = ctx.cancelled() => Err(ProcessError::Canceled),
        }
    })
}
