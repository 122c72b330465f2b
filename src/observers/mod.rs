//! # Observers of published outputs.
//!
//! This module provides the [`Observer`] trait, the processor's subscriber table
//! ([`ObserverSet`]) and the scoped [`Subscription`] handle.
//!
//! ## Architecture
//! ```text
//! Delivery flow:
//!   Coordinator ── emit(Notification) ──► ObserverSet ──► per-observer queue ──► worker
//!   (under lock: order is decided here)                                           │
//!                                                              ┌────────┬─────────┤
//!                                                              ▼        ▼         ▼
//!                                                          on_next  on_error  on_completed
//! ```
//!
//! ## Implementing custom observers
//! ```no_run
//! use seqvisor::Observer;
//! use async_trait::async_trait;
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl Observer<String> for Printer {
//!     async fn on_next(&self, output: &String) {
//!         println!("{output}");
//!     }
//!
//!     async fn on_completed(&self) {
//!         println!("done");
//!     }
//! }
//! ```

mod observer;
mod set;
mod subscription;

pub use observer::Observer;
pub use set::ObserverId;
pub use subscription::Subscription;

pub(crate) use set::{Notification, ObserverSet};
pub(crate) use subscription::Unsubscribe;
