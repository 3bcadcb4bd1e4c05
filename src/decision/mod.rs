//! Decision Module
//!
//! Topology-changing decisions and the log interface that supplies them.
//!
//! ## Responsibilities
//! - [`Decision`]: everything that may change cluster state, including
//!   confirmations folded back from the delivery side
//! - [`SpaceSpec`]: serializable description of a space, turned into a
//!   validated [`crate::topology::Space`] when applied
//! - [`DecisionSource`]: the ordered, durable log consumed by the applier
//!
//! Decisions are plain data so they can be persisted by whatever log
//! produces them (see `crate::journal` for a single-node one).

mod spec;
mod source;

pub use spec::{RegionLayout, RegionSpec, SpaceSpec, SubspaceSpec};
pub use source::{DecisionSource, LoggedDecision, MemoryDecisionLog};

use serde::{Deserialize, Serialize};

use crate::instance::{InstanceBindings, InstanceId};

/// A topology decision, applied in log order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    /// A storage process came up and registered
    RegisterInstance {
        bindings: InstanceBindings,
        pid: u32,
        token: u64,
    },

    /// An instance stopped responding
    InstanceFailed { id: InstanceId },

    /// An instance leaves the cluster for good
    RemoveInstance { id: InstanceId },

    /// Create a new space
    CreateSpace(SpaceSpec),

    /// Replace an existing space's partitioning
    Repartition(SpaceSpec),

    /// Delete a space
    DropSpace { name: String },

    /// Change the fault-tolerance target of every region in a space
    ChangeReplicationTarget { space: String, desired_f: u32 },

    /// An instance applied configuration `num`
    ConfigAcked { id: InstanceId, num: u64 },

    /// An instance could not apply configuration `num`
    ConfigRejected { id: InstanceId, num: u64 },
}

impl Decision {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::RegisterInstance { .. } => "register-instance",
            Decision::InstanceFailed { .. } => "instance-failed",
            Decision::RemoveInstance { .. } => "remove-instance",
            Decision::CreateSpace(_) => "create-space",
            Decision::Repartition(_) => "repartition",
            Decision::DropSpace { .. } => "drop-space",
            Decision::ChangeReplicationTarget { .. } => "change-replication-target",
            Decision::ConfigAcked { .. } => "config-acked",
            Decision::ConfigRejected { .. } => "config-rejected",
        }
    }
}
