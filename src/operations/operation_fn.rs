//! # Function-backed operation (`OperationFn`)
//!
//! [`OperationFn`] wraps a closure `F: Fn(Arc<I>, CancellationToken) -> Fut`, producing a
//! fresh future per input. This avoids shared mutable state between slots; if slots
//! need to share something, capture an `Arc<...>` explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use seqvisor::{OperationFn, OperationRef, ProcessError};
//!
//! let op: OperationRef<String, usize> =
//!     OperationFn::arc("len", |input: Arc<String>, _ctx: CancellationToken| async move {
//!         Ok::<_, ProcessError>(input.len())
//!     });
//!
//! assert_eq!(op.name(), "len");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::ProcessError;
use crate::operations::operation::{BoxOperationFuture, Operation};

/// Function-backed operation implementation.
///
/// Wraps a closure that *creates* a new future per input.
#[derive(Debug)]
pub struct OperationFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> OperationFn<F> {
    /// Creates a new function-backed operation.
    ///
    /// Prefer [`OperationFn::arc`] when you immediately need an
    /// [`OperationRef`](crate::OperationRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the operation and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<I, O, F, Fut> Operation<I, O> for OperationFn<F>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
    F: Fn(Arc<I>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ProcessError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, input: Arc<I>, ctx: CancellationToken) -> BoxOperationFuture<O> {
        Box::pin((self.f)(input, ctx))
    }
}
