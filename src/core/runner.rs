//! # Run one slot's operation.
//!
//! Executes the [`Operation`] for a single input with optional timeout, panic capture
//! and cancellation, and turns every way it can end into a `Result<O, ProcessError>`.
//!
//! ## Outcomes
//! ```text
//! Success:       operation → Ok(out)                 → Ok(out)
//! Failure:       operation → Err(e)                  → Err(e)
//! Panic:         operation panics                    → Err(Panicked{info})
//! Timeout:       timeout exceeded → cancel child     → publish TimeoutHit
//!                                                    → Err(Timeout{..})
//! Cancellation:  slot token cancelled (shutdown)     → Err(Canceled)
//! ```
//!
//! ## Rules
//! - Always returns **exactly one** outcome; the caller hands it to the coordinator
//! - Cancellation wins even if the operation ignores its token
//! - The token passed to the operation is the slot's own child token; cancelling it on
//!   timeout does not affect other slots

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    core::SlotIndex,
    error::{ProcessError, describe_panic},
    events::{Bus, Event, EventKind},
    operations::Operation,
};

/// Runs `operation` on `input` for slot `index`.
pub(crate) async fn run_slot<I, O>(
    operation: &dyn Operation<I, O>,
    index: SlotIndex,
    input: Arc<I>,
    token: &CancellationToken,
    timeout: Option<Duration>,
    bus: &Bus,
) -> Result<O, ProcessError>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    let attempt = async {
        let fut = std::panic::AssertUnwindSafe(async {
            operation.process(input, token.clone()).await
        });
        match fut.catch_unwind().await {
            Ok(res) => res,
            Err(panic_err) => Err(ProcessError::Panicked {
                info: describe_panic(&*panic_err),
            }),
        }
    };

    let bounded = async {
        match timeout.filter(|d| *d > Duration::ZERO) {
            Some(dur) => match time::timeout(dur, attempt).await {
                Ok(res) => res,
                Err(_elapsed) => {
                    token.cancel();
                    publish_timeout(bus, index, dur);
                    Err(ProcessError::Timeout { timeout: dur })
                }
            },
            None => attempt.await,
        }
    };

    tokio::select! {
        biased;
        res = bounded => res,
        _ = token.cancelled() => Err(ProcessError::Canceled),
    }
}

/// Publishes `TimeoutHit` event (always followed by `SlotFailed`).
fn publish_timeout(bus: &Bus, index: SlotIndex, dur: Duration) {
    bus.publish(
        Event::new(EventKind::TimeoutHit)
            .with_slot(index)
            .with_timeout(dur),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{OperationFn, OperationRef};

    fn sleepy(ms: u64) -> OperationRef<u64, u64> {
        OperationFn::arc("sleepy", move |input: Arc<u64>, _ctx: CancellationToken| async move {
            time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, ProcessError>(*input + 1)
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_passes_output_through() {
        let bus = Bus::new(8);
        let token = CancellationToken::new();
        let res = run_slot(sleepy(10).as_ref(), 0, Arc::new(41), &token, None, &bus).await;
        assert_eq!(res, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_cancels_child_and_publishes() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let res = run_slot(
            sleepy(1_000).as_ref(),
            3,
            Arc::new(1),
            &token,
            Some(Duration::from_millis(50)),
            &bus,
        )
        .await;

        assert_eq!(
            res,
            Err(ProcessError::Timeout {
                timeout: Duration::from_millis(50)
            })
        );
        assert!(token.is_cancelled());
        let ev = rx.try_recv().expect("timeout event");
        assert_eq!(ev.kind, EventKind::TimeoutHit);
        assert_eq!(ev.slot, Some(3));
        assert_eq!(ev.timeout_ms, Some(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_wins_over_uncooperative_operation() {
        let bus = Bus::new(8);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(5)).await;
            canceller.cancel();
        });

        let res = run_slot(sleepy(10_000).as_ref(), 0, Arc::new(1), &token, None, &bus).await;
        assert_eq!(res, Err(ProcessError::Canceled));
    }

    #[tokio::test]
    async fn test_panic_becomes_error() {
        let bus = Bus::new(8);
        let token = CancellationToken::new();
        let op: OperationRef<u64, u64> =
            OperationFn::arc("panics", |_input: Arc<u64>, _ctx: CancellationToken| async move {
                if true {
                    panic!("kaboom");
                }
                Ok::<_, ProcessError>(0)
            });

        let res = run_slot(op.as_ref(), 0, Arc::new(1), &token, None, &bus).await;
        assert_eq!(
            res,
            Err(ProcessError::Panicked {
                info: "kaboom".into()
            })
        );
    }
}
