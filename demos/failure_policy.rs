//! # Failure Policy Example
//!
//! Submits two inputs in submission-order mode. The first one fails, the second one
//! succeeds, and the outcome for the second depends on the [`FailurePolicy`]:
//!
//! - `Stall`: the error for slot 0 is delivered, slot 1 is never published and the
//!   stream never completes; `shutdown` releases the observers.
//! - `Skip`: the error for slot 0 is delivered, then slot 1 is published and the
//!   stream completes.
//!
//! ## Run
//! ```bash
//! cargo run --example failure_policy
//! ```

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use seqvisor::{
    FailurePolicy, Observer, OperationFn, OperationRef, OrderedProcessor, ProcessError, SlotError,
};

struct Printer(&'static str);

#[async_trait]
impl Observer<String> for Printer {
    async fn on_next(&self, output: &String) {
        println!("[{}] next: {output}", self.0);
    }

    async fn on_error(&self, error: &SlotError) {
        println!("[{}] error: {error} ({})", self.0, error.source.as_label());
    }

    async fn on_completed(&self) {
        println!("[{}] completed", self.0);
    }
}

/// Fails on "bad" input after a short delay.
fn validate() -> OperationRef<&'static str, String> {
    OperationFn::arc("validate", |input: Arc<&'static str>, _ctx: CancellationToken| async move {
        tokio::time::sleep(Duration::from_millis(if *input == "bad" { 100 } else { 20 })).await;
        if *input == "bad" {
            return Err(ProcessError::fail("input rejected"));
        }
        Ok(input.to_uppercase())
    })
}

async fn run(label: &'static str, policy: FailurePolicy) -> anyhow::Result<()> {
    let processor = OrderedProcessor::builder(validate())
        .with_failure_policy(policy)
        .with_grace(Duration::from_secs(1))
        .build();
    let _sub = processor.subscribe(Arc::new(Printer(label)));

    processor.submit("bad")?;
    processor.submit("good")?;
    processor.complete();

    match tokio::time::timeout(Duration::from_millis(500), processor.join()).await {
        Ok(()) => println!("[{label}] stream finished"),
        Err(_) => {
            println!("[{label}] stream stalled, shutting down");
            processor.shutdown().await?;
        }
    }

    let stats = processor.stats();
    println!(
        "[{label}] submitted={} completed={} published={} failed={}",
        stats.submitted, stats.completed, stats.published, stats.failed
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    run("stall", FailurePolicy::Stall).await?;
    println!();
    run("skip", FailurePolicy::Skip).await?;
    Ok(())
}
