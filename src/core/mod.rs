//! Runtime core: slot bookkeeping, ordering and lifecycle.
//!
//! The only public entry points from this module are [`OrderedProcessor`] and its
//! [`ProcessorBuilder`], plus the plain data types they expose.
//!
//! Internal modules:
//! - [`slot`]: one record per submitted input and its state machine;
//! - [`coordinator`]: the critical section that decides what gets published and when;
//! - [`runner`]: executes one slot's operation with timeout, cancellation and panic capture;
//! - [`processor`]: spawns slot tasks and observer workers, handles shutdown;
//! - [`builder`]: assembles a processor from an operation and a [`ProcessorConfig`].
//!
//! ```text
//! OrderedProcessor ──► Mutex<Coordinator> ──► ObserverSet ──► observer workers
//!        │                    ▲
//!        └─► JoinSet<slot> ───┘ finish_slot(i, result)
//! ```

mod builder;
mod config;
mod coordinator;
mod processor;
mod runner;
mod slot;

pub use builder::ProcessorBuilder;
pub use config::ProcessorConfig;
pub use coordinator::Stats;
pub use processor::OrderedProcessor;
pub use slot::{SlotIndex, SlotStatus};
