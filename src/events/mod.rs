//! Diagnostic events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to diagnostic events emitted by the coordinator, the
//! slot runners and the observer workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//! - `LogWriter` stdout printer (feature `logging`)
//!
//! ## Quick reference
//! - **Publishers**: `Coordinator` (slot/stream/observer bookkeeping), `runner::run_slot`
//!   (timeouts), `ObserverSet` workers (panics), `OrderedProcessor::shutdown`.
//! - **Consumers**: anything holding a receiver from `OrderedProcessor::events()`.
//!
//! See `core/mod.rs` for the system-level wiring diagram.

mod bus;
mod event;
#[cfg(feature = "logging")]
mod log;

pub use bus::Bus;
pub use event::{Event, EventKind};
#[cfg(feature = "logging")]
pub use log::LogWriter;
