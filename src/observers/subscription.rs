//! # Subscription handle.
//!
//! [`Subscription`] is returned by
//! [`OrderedProcessor::subscribe`](crate::OrderedProcessor::subscribe).
//! Releasing it (explicitly via [`Subscription::unsubscribe`] or by dropping it) removes the
//! observer from the processor's table.
//!
//! ## Rules
//! - Release only affects **future** publications; notifications already queued for the
//!   observer are still delivered.
//! - Release is idempotent: the second and later calls do nothing.
//! - The handle holds a weak reference; it never keeps the processor alive.
//! - [`Subscription::forget`] drops the handle while leaving the observer subscribed.

use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::observers::ObserverId;

/// Something an observer can be detached from.
pub(crate) trait Unsubscribe: Send + Sync {
    fn remove_observer(&self, id: ObserverId);
}

/// Scoped registration of one observer.
#[must_use = "dropping a Subscription unsubscribes the observer immediately"]
pub struct Subscription {
    id: ObserverId,
    owner: Weak<dyn Unsubscribe>,
    released: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(id: ObserverId, owner: Weak<dyn Unsubscribe>) -> Self {
        Self {
            id,
            owner,
            released: AtomicBool::new(false),
        }
    }

    /// Returns the observer's identity.
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Removes the observer from the processor. Repeated calls are no-ops.
    pub fn unsubscribe(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            owner.remove_observer(self.id);
        }
    }

    /// Returns `true` until the handle has been released.
    pub fn is_active(&self) -> bool {
        !self.released.load(Ordering::Acquire)
    }

    /// Drops the handle **without** unsubscribing; the observer stays registered
    /// for the rest of the processor's lifetime.
    pub fn forget(self) {
        self.released.store(true, Ordering::Release);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
