use std::sync::Arc;
use std::time::Duration;

use crate::{
    core::{config::ProcessorConfig, processor::OrderedProcessor},
    observers::Observer,
    operations::OperationRef,
    policies::{FailurePolicy, OrderMode},
};

/// Builder for constructing an [`OrderedProcessor`] with optional settings.
pub struct ProcessorBuilder<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    operation: OperationRef<I, O>,
    cfg: ProcessorConfig,
    observers: Vec<Arc<dyn Observer<O>>>,
}

impl<I, O> ProcessorBuilder<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    /// Creates a new builder for `operation` with the default configuration.
    pub fn new(operation: OperationRef<I, O>) -> Self {
        Self {
            operation,
            cfg: ProcessorConfig::default(),
            observers: Vec::new(),
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, cfg: ProcessorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the publication order.
    pub fn with_order(mut self, order: OrderMode) -> Self {
        self.cfg.order = order;
        self
    }

    /// Sets what a failed slot does to submission-order publication.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.cfg.on_failure = policy;
        self
    }

    /// Sets the per-slot operation timeout (`Duration::ZERO` disables it).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.timeout = timeout;
        self
    }

    /// Sets the shutdown grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.cfg.grace = grace;
        self
    }

    /// Sets observers that stay registered for the processor's whole lifetime.
    ///
    /// They are attached before the first submission, so they see every output.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observer<O>>>) -> Self {
        self.observers = observers;
        self
    }

    /// Builds and returns the processor.
    ///
    /// Spawns one delivery worker per configured observer, so a Tokio runtime is required
    /// when observers were given.
    pub fn build(self) -> OrderedProcessor<I, O> {
        let processor = OrderedProcessor::from_parts(self.operation, self.cfg);
        for observer in self.observers {
            processor.subscribe(observer).forget();
        }
        processor
    }
}
