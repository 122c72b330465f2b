//! # Processing operations.
//!
//! This module provides the user-facing side of the processing step:
//! - [`Operation`] - trait for async, fallible, cancelable input → output transformations
//! - [`OperationFn`] - closure-backed implementation
//! - [`OperationRef`] - shared reference to an operation (`Arc<dyn Operation<I, O>>`)

mod operation;
mod operation_fn;

pub use operation::{BoxOperationFuture, Operation, OperationRef};
pub use operation_fn::OperationFn;
