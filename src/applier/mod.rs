//! Applier Module
//!
//! The single writer. Applies decisions in log order and folds confirmations
//! from the delivery side into the same serialized stream.
//!
//! ## Architecture
//! ```text
//!   DecisionSource ──► ┌──────────────────────┐ ──► Transport
//!   (log order)        │       Applier        │     (next_config heads)
//!                      │  owns ClusterState   │
//!   ApplierHandle ───► │  (&mut, one thread)  │ ──► SharedRoutingTable
//!   (ack / reject)     └──────────────────────┘     (read by routers)
//! ```
//!
//! ## Ordering
//! - queued ack/reject events are drained before the next log decision
//! - decisions with `seq <= last_applied` are replays and are skipped
//! - contract violations stop the applier; stale confirmations are dropped;
//!   decisions that do not fit the current state are logged and skipped

mod runner;
mod event;
mod transport;

pub use runner::{ApplyOutcome, Applier};
pub use event::{ApplierHandle, Event};
pub use transport::Transport;
