//! Ordering and failure policies.
//!
//! This module groups the knobs that control **when** a completed output may be
//! published and **what** a failed slot does to the outputs queued behind it.
//!
//! ## Contents
//! - [`OrderMode`] submission order vs. completion order
//! - [`FailurePolicy`] stall vs. skip on a failed slot
//!
//! ## Quick wiring
//! ```text
//! ProcessorConfig { order: OrderMode, on_failure: FailurePolicy, .. }
//!      └─► core::coordinator::Coordinator uses:
//!           - order to publish immediately or sweep from the cursor
//!           - on_failure to stop at or step over failed slots
//! ```
//!
//! ## Defaults
//! - `OrderMode::Submission`
//! - `FailurePolicy::Stall`

mod failure;
mod order;

pub use failure::FailurePolicy;
pub use order::OrderMode;
