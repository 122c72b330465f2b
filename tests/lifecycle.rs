mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use common::{Note, Recorder, cooperative_sleep, sleep_echo};
use seqvisor::{
    EventKind, FailurePolicy, Observer, OperationFn, OperationRef, OrderMode, OrderedProcessor,
    ProcessError, RuntimeError, SlotStatus, Stats,
};

#[tokio::test(start_paused = true)]
async fn slow_slot_times_out_and_fails() {
    let processor = OrderedProcessor::builder(sleep_echo())
        .with_order(OrderMode::Completion)
        .with_failure_policy(FailurePolicy::Skip)
        .with_timeout(Duration::from_millis(50))
        .build();
    let mut events = processor.events();
    let rec = Recorder::new();
    let _sub = processor.subscribe(rec.clone());

    processor.submit(200).unwrap();
    processor.submit(20).unwrap();
    processor.complete();
    processor.join().await;

    assert_eq!(
        rec.notes(),
        vec![Note::Next(20), Note::Error(0), Note::Completed]
    );
    assert_eq!(rec.times(), vec![20, 50, 50]);
    let err = processor.error(0).expect("slot 0 timed out");
    assert_eq!(
        err.source,
        ProcessError::Timeout {
            timeout: Duration::from_millis(50)
        }
    );

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|ev| ev.slot == Some(0))
        .map(|ev| ev.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![EventKind::SlotSubmitted, EventKind::TimeoutHit, EventKind::SlotFailed]
    );
}

#[tokio::test(start_paused = true)]
async fn panicking_operation_fails_its_slot() {
    let op: OperationRef<u64, u64> =
        OperationFn::arc("explodes-on-two", |n: Arc<u64>, _ctx: CancellationToken| async move {
            if *n == 2 {
                panic!("cannot handle two");
            }
            Ok::<_, ProcessError>(*n)
        });
    let processor = OrderedProcessor::builder(op)
        .with_failure_policy(FailurePolicy::Skip)
        .build();
    let rec = Recorder::new();
    let _sub = processor.subscribe(rec.clone());

    for n in 1..=3 {
        processor.submit(n).unwrap();
    }
    processor.complete();
    processor.join().await;

    assert_eq!(
        rec.notes(),
        vec![Note::Next(1), Note::Error(1), Note::Next(3), Note::Completed]
    );
    assert_eq!(
        processor.error(1).map(|e| e.source.clone()),
        Some(ProcessError::Panicked {
            info: "cannot handle two".into()
        })
    );
}

#[tokio::test(start_paused = true)]
async fn stats_track_every_stage() {
    let processor = OrderedProcessor::new(sleep_echo(), true);
    for delay in [30, 10] {
        processor.submit(delay).unwrap();
    }

    time::sleep(Duration::from_millis(15)).await;
    let mid = processor.stats();
    assert_eq!(
        mid,
        Stats {
            submitted: 2,
            completed: 1,
            published: 0,
            failed: 0,
        }
    );
    assert_eq!(mid.in_flight(), 1);

    processor.complete();
    processor.join().await;
    let end = processor.stats();
    assert_eq!(end.published, 2);
    assert_eq!(end.in_flight(), 0);
    assert!(processor.is_closed());
    assert_eq!(processor.slot_status(5), None);
}

#[tokio::test(start_paused = true)]
async fn stream_events_bracket_the_run() {
    let processor = OrderedProcessor::new(sleep_echo(), true);
    let mut events = processor.events();
    let rec = Recorder::new();
    let _sub = processor.subscribe(rec.clone());

    for delay in [20, 10] {
        processor.submit(delay).unwrap();
    }
    processor.complete();
    processor.join().await;

    let all: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert!(all.windows(2).all(|w| w[0].seq < w[1].seq));

    let count = |kind: EventKind| all.iter().filter(|ev| ev.kind == kind).count();
    assert_eq!(count(EventKind::ObserverAdded), 1);
    assert_eq!(count(EventKind::SlotSubmitted), 2);
    assert_eq!(count(EventKind::SlotCompleted), 2);
    assert_eq!(count(EventKind::InputClosed), 1);
    assert_eq!(count(EventKind::StreamCompleted), 1);

    let published: Vec<_> = all
        .iter()
        .filter(|ev| ev.kind == EventKind::SlotPublished)
        .map(|ev| ev.slot)
        .collect();
    assert_eq!(published, vec![Some(0), Some(1)]);
    assert_eq!(all.last().map(|ev| ev.kind), Some(EventKind::StreamCompleted));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_in_flight_slots() {
    let processor = OrderedProcessor::new(cooperative_sleep(), false);
    let mut events = processor.events();
    let rec = Recorder::new();
    let _sub = processor.subscribe(rec.clone());

    processor.submit(10).unwrap();
    for _ in 0..3 {
        processor.submit(60_000).unwrap();
    }
    time::sleep(Duration::from_millis(20)).await;

    processor.shutdown().await.expect("stops within grace");

    let stats = processor.stats();
    assert_eq!(stats.published, 1);
    assert_eq!(stats.failed, 3);
    for index in 1..4 {
        assert_eq!(processor.slot_status(index), Some(SlotStatus::Failed));
        assert!(processor.error(index).is_some_and(|e| e.source.is_canceled()));
    }
    // Stall: cancelled slots are never published, observers are released without completion
    assert!(!processor.is_finished());
    assert_eq!(processor.observer_count(), 0);
    let notes = rec.notes();
    assert_eq!(notes.first(), Some(&Note::Next(10)));
    assert_eq!(notes.len(), 4);
    assert!(!notes.contains(&Note::Completed));

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|ev| ev.kind)
        .collect();
    assert!(kinds.contains(&EventKind::ShutdownRequested));
    assert_eq!(kinds.last(), Some(&EventKind::AllStoppedWithin));
}

#[tokio::test(start_paused = true)]
async fn shutdown_with_skip_completes_the_stream() {
    let processor = OrderedProcessor::builder(cooperative_sleep())
        .with_order(OrderMode::Completion)
        .with_failure_policy(FailurePolicy::Skip)
        .build();
    let rec = Recorder::new();
    let _sub = processor.subscribe(rec.clone());

    processor.submit(10).unwrap();
    processor.submit(60_000).unwrap();
    time::sleep(Duration::from_millis(20)).await;

    processor.shutdown().await.expect("stops within grace");

    assert!(processor.is_finished());
    assert_eq!(
        rec.notes(),
        vec![Note::Next(10), Note::Error(1), Note::Completed]
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_operations_that_ignore_cancellation() {
    let processor = OrderedProcessor::new(sleep_echo(), true);
    let rec = Recorder::new();
    let _sub = processor.subscribe(rec.clone());

    processor.submit(60_000).unwrap();
    processor.submit(10).unwrap();
    time::sleep(Duration::from_millis(20)).await;

    processor.shutdown().await.expect("stops within grace");

    // slot 0 fails, Stall keeps slot 1 unpublished and the stream unfinished
    assert_eq!(rec.notes(), vec![Note::Error(0)]);
    assert_eq!(processor.slot_status(1), Some(SlotStatus::Completed));
    assert!(!processor.is_finished());
    assert_eq!(processor.observer_count(), 0);
    assert!(processor.submit(1).is_err());
}

struct Stuck;

#[async_trait]
impl Observer<u64> for Stuck {
    async fn on_next(&self, _output: &u64) {
        time::sleep(Duration::from_secs(3_600)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_reports_grace_exceeded() {
    let processor = OrderedProcessor::builder(sleep_echo())
        .with_grace(Duration::from_millis(100))
        .build();
    let mut events = processor.events();
    let _sub = processor.subscribe(Arc::new(Stuck));

    processor.submit(10).unwrap();
    time::sleep(Duration::from_millis(20)).await;

    match processor.shutdown().await {
        Err(RuntimeError::GraceExceeded { grace, stuck }) => {
            assert_eq!(grace, Duration::from_millis(100));
            assert!(stuck.is_empty());
        }
        other => panic!("expected GraceExceeded, got {other:?}"),
    }

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|ev| ev.kind)
        .collect();
    assert_eq!(kinds.last(), Some(&EventKind::GraceExceeded));
}
