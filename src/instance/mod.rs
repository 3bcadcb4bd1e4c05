//! Instance Module
//!
//! Coordinator-side identity of storage-node process incarnations and the
//! configuration acknowledgment protocol.
//!
//! ## Ack Protocol
//! ```text
//!              add_config(n)            ack_config(head) / reject_config(head)
//!   pending: [ c1 | c2 | ... | cn ] ◄──────   ──────► pops c1, moves watermark
//!              ▲ head = next_config()
//! ```
//! - numbers strictly increase towards the tail
//! - only the head may be confirmed; anything else is stale
//!
//! ## Identity
//! The incarnation `token` is the identity. A node restarted on the same
//! address registers a new token and is a different [`Instance`].

mod bindings;
mod record;
mod registry;

pub use bindings::InstanceBindings;
pub use record::{Instance, PendingConfig};
pub use registry::InstanceRegistry;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one process incarnation (its token)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance({:#018x})", self.0)
    }
}

/// Liveness as decided by the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceStatus {
    /// Receives configurations and may be placed as a replica
    Live,

    /// Declared failed; kept until removed so late confirmations still resolve
    Failed,
}
