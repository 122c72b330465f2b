//! # Ordered Delays Example
//!
//! Runs the same three inputs (processing delays 300ms, 100ms, 200ms) through two
//! processors: one publishing in completion order, one in submission order.
//!
//! Expected output order:
//! - completion order: 100, 200, 300
//! - submission order: 300, 100, 200 (all released at ~300ms)
//!
//! Diagnostic events are printed by the built-in [`LogWriter`].
//!
//! ## Run
//! ```bash
//! cargo run --example ordered_delays --features logging
//! ```

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use seqvisor::{
    LogWriter, Observer, OperationFn, OperationRef, OrderMode, OrderedProcessor, ProcessError,
};

struct Printer {
    label: &'static str,
    start: Instant,
}

#[async_trait]
impl Observer<u64> for Printer {
    async fn on_next(&self, output: &u64) {
        println!(
            "{:>10} │ t={:>4}ms │ output {output}ms",
            self.label,
            self.start.elapsed().as_millis()
        );
    }

    async fn on_completed(&self) {
        println!(
            "{:>10} │ t={:>4}ms │ completed",
            self.label,
            self.start.elapsed().as_millis()
        );
    }

    fn name(&self) -> &'static str {
        "printer"
    }
}

fn delayed_echo() -> OperationRef<u64, u64> {
    OperationFn::arc("delayed-echo", |delay: Arc<u64>, ctx: CancellationToken| async move {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(*delay)) => Ok(*delay),
            _ = ctx.cancelled() => Err(ProcessError::Canceled),
        }
    })
}

async fn run(label: &'static str, order: OrderMode) -> anyhow::Result<()> {
    let processor = OrderedProcessor::builder(delayed_echo())
        .with_order(order)
        .build();
    let logger = LogWriter::new().attach(processor.events());
    let _sub = processor.subscribe(Arc::new(Printer {
        label,
        start: Instant::now(),
    }));

    for delay in [300, 100, 200] {
        processor.submit(delay)?;
    }
    processor.complete();
    processor.join().await;

    let stats = processor.stats();
    println!(
        "{label:>10} │ submitted={} published={} failed={}",
        stats.submitted, stats.published, stats.failed
    );

    // Give the printer a moment to flush, then stop it.
    tokio::time::sleep(Duration::from_millis(10)).await;
    logger.abort();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== completion order ===");
    run("completion", OrderMode::Completion).await?;

    println!();
    println!("=== submission order ===");
    run("submission", OrderMode::Submission).await?;
    Ok(())
}
