//! # Processing operation abstraction.
//!
//! An [`Operation`] turns one input into one output, asynchronously and possibly failing.
//! The processor calls [`Operation::process`] once per submitted input; calls for
//! different inputs run concurrently and may finish in any order.
//!
//! The operation receives a [`CancellationToken`] and should check it to stop
//! cooperatively during shutdown. The processor stops waiting on a cancelled slot
//! either way; checking the token only lets the operation release its own resources early.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::ProcessError;

/// Boxed future returned by [`Operation::process`].
pub type BoxOperationFuture<O> =
    Pin<Box<dyn Future<Output = Result<O, ProcessError>> + Send + 'static>>;

/// Shared handle to an operation (`Arc<dyn Operation<I, O>>`).
pub type OperationRef<I, O> = Arc<dyn Operation<I, O>>;

/// # Asynchronous input → output transformation.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use seqvisor::{BoxOperationFuture, Operation, ProcessError};
///
/// struct Double;
///
/// impl Operation<u64, u64> for Double {
///     fn name(&self) -> &str { "double" }
///
///     fn process(&self, input: Arc<u64>, ctx: CancellationToken) -> BoxOperationFuture<u64> {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(ProcessError::Canceled);
///             }
///             Ok(*input * 2)
///         })
///     }
/// }
/// ```
pub trait Operation<I, O>: Send + Sync + 'static {
    /// Returns a stable, human-readable name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Creates the future that processes one input.
    ///
    /// The input is shared with the processor's slot record, hence `Arc<I>`.
    fn process(&self, input: Arc<I>, ctx: CancellationToken) -> BoxOperationFuture<O>;
}
