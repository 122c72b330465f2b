//! # Processor configuration.
//!
//! Provides [`ProcessorConfig`] centralized settings for one
//! [`OrderedProcessor`](crate::OrderedProcessor).
//!
//! ## Sentinel values
//! - `timeout = 0s` → no per-slot timeout
//! - `grace = 0s` → shutdown does not wait for in-flight slots
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::policies::{FailurePolicy, OrderMode};

/// Configuration of one processor instance.
///
/// Defines:
/// - **Ordering**: submission order vs. completion order
/// - **Failure handling**: stall vs. skip on failed slots
/// - **Per-slot timeout**: optional upper bound on each operation
/// - **Shutdown behavior**: grace period for in-flight slots
/// - **Diagnostics**: bus capacity for event delivery
///
/// All fields are immutable once the processor is built.
#[derive(Clone, Debug)]
pub struct ProcessorConfig {
    /// When completed outputs may be published.
    pub order: OrderMode,

    /// What a failed slot does to the submission-order sweep.
    pub on_failure: FailurePolicy,

    /// Per-slot operation timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = a slot still running after this long fails with `ProcessError::Timeout`
    pub timeout: Duration,

    /// Maximum time [`OrderedProcessor::shutdown`](crate::OrderedProcessor::shutdown) waits
    /// for cancelled slots and observer workers before aborting them.
    pub grace: Duration,

    /// Capacity of the diagnostics broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl ProcessorConfig {
    /// Returns a config with the given order mode and defaults elsewhere.
    pub fn with_order(order: OrderMode) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Returns the per-slot timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per slot
    #[inline]
    pub fn slot_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ProcessorConfig {
    /// Default configuration:
    ///
    /// - `order = OrderMode::Submission`
    /// - `on_failure = FailurePolicy::Stall`
    /// - `timeout = 0s` (no timeout)
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            order: OrderMode::default(),
            on_failure: FailurePolicy::default(),
            timeout: Duration::ZERO,
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}
