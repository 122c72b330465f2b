mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use common::{Note, Recorder};
use seqvisor::{
    FailurePolicy, OperationFn, OperationRef, OrderMode, OrderedProcessor, ProcessError,
};

const ROUNDS: u64 = 8;
const SLOTS: u64 = 500;
const DEADLINE: Duration = Duration::from_secs(30);

/// Deterministic spread of 0..2000µs so neighbouring slots finish out of order.
fn jitter(n: u64) -> Duration {
    Duration::from_micros(n.wrapping_mul(2_654_435_761) % 2_000)
}

/// Sleeps a jittered amount on real time, echoing the input; inputs divisible by `fail_every` fail.
fn jittered(fail_every: Option<u64>) -> OperationRef<u64, u64> {
    OperationFn::arc("jittered", move |n: Arc<u64>, _ctx: CancellationToken| async move {
        time::sleep(jitter(*n)).await;
        if fail_every.is_some_and(|every| *n % every == 0) {
            return Err(ProcessError::fail(format!("input {n} rejected")));
        }
        Ok(*n)
    })
}

async fn run_round(processor: &OrderedProcessor<u64, u64>, base: u64) {
    for i in 0..SLOTS {
        processor.submit(base + i).unwrap();
        if i % 16 == 0 {
            tokio::task::yield_now().await;
        }
    }
    processor.complete();
    time::timeout(DEADLINE, processor.join())
        .await
        .expect("stream drains within the deadline");
}

fn assert_single_trailing_completion(notes: &[Note]) {
    let completions = notes.iter().filter(|n| **n == Note::Completed).count();
    assert_eq!(completions, 1, "exactly one terminal notification");
    assert_eq!(notes.last(), Some(&Note::Completed), "terminal notification is last");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn submission_order_is_exact_under_parallel_completions() {
    for round in 0..ROUNDS {
        let base = round * SLOTS;
        let processor = OrderedProcessor::new(jittered(None), true);
        let rec = Recorder::new();
        let _sub = processor.subscribe(rec.clone());

        run_round(&processor, base).await;

        let notes = rec.notes();
        assert_single_trailing_completion(&notes);
        let expected: Vec<Note> = (base..base + SLOTS).map(Note::Next).collect();
        assert_eq!(&notes[..notes.len() - 1], &expected[..], "round {round}");
        assert_eq!(processor.stats().published, SLOTS as usize);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn completion_order_publishes_each_slot_once_under_parallel_completions() {
    for round in 0..ROUNDS {
        let base = round * SLOTS;
        let processor = OrderedProcessor::new(jittered(None), false);
        let rec = Recorder::new();
        let _sub = processor.subscribe(rec.clone());

        run_round(&processor, base).await;

        let notes = rec.notes();
        assert_single_trailing_completion(&notes);
        let mut seen: BTreeMap<u64, usize> = BTreeMap::new();
        for note in &notes[..notes.len() - 1] {
            match note {
                Note::Next(n) => *seen.entry(*n).or_default() += 1,
                other => panic!("round {round}: unexpected {other:?}"),
            }
        }
        assert_eq!(seen.len(), SLOTS as usize, "round {round}");
        assert!(seen.keys().copied().eq(base..base + SLOTS), "round {round}");
        assert!(seen.values().all(|count| *count == 1), "round {round}: duplicate publish");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_submitters_keep_submission_order_by_index() {
    let processor = Arc::new(OrderedProcessor::new(jittered(None), true));
    let rec = Recorder::new();
    let _sub = processor.subscribe(rec.clone());

    let mut handles = Vec::new();
    for worker in 0..4u64 {
        let processor = Arc::clone(&processor);
        handles.push(tokio::spawn(async move {
            for i in 0..SLOTS / 4 {
                processor.submit(worker * SLOTS + i).unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    processor.complete();
    time::timeout(DEADLINE, processor.join())
        .await
        .expect("stream drains within the deadline");

    let notes = rec.notes();
    assert_single_trailing_completion(&notes);
    let expected: Vec<Note> = (0..SLOTS as usize)
        .map(|index| processor.input(index).map(|n| Note::Next(*n)).unwrap())
        .collect();
    assert_eq!(&notes[..notes.len() - 1], &expected[..]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn skip_failures_race_to_a_single_completion() {
    for round in 0..ROUNDS {
        let base = round * SLOTS;
        let processor = OrderedProcessor::builder(jittered(Some(7)))
            .with_order(OrderMode::Completion)
            .with_failure_policy(FailurePolicy::Skip)
            .build();
        let rec = Recorder::new();
        let _sub = processor.subscribe(rec.clone());

        run_round(&processor, base).await;

        let notes = rec.notes();
        assert_single_trailing_completion(&notes);
        let mut published = Vec::new();
        let mut failed = Vec::new();
        for note in &notes[..notes.len() - 1] {
            match note {
                Note::Next(n) => published.push(*n),
                Note::Error(index) => failed.push(base + *index as u64),
                Note::Completed => unreachable!(),
            }
        }
        published.sort_unstable();
        failed.sort_unstable();
        let (want_failed, want_published): (Vec<u64>, Vec<u64>) =
            (base..base + SLOTS).partition(|n| n % 7 == 0);
        assert_eq!(published, want_published, "round {round}");
        assert_eq!(failed, want_failed, "round {round}");

        let stats = processor.stats();
        assert_eq!(stats.published + stats.failed, SLOTS as usize);
    }
}
