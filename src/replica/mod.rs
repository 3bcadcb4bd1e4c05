//! Replica Module
//!
//! Replica-set bookkeeping and fault-tolerance arithmetic for regions.
//!
//! ## Responsibilities
//! - Append/remove replicas while keeping chain order
//! - Derive `current_f` from the replica count (never stored)
//! - Classify a region against its `desired_f` target
//!
//! ```text
//!   replicas      current_f     desired_f = 1
//!   []               -1         Unassigned
//!   [X]               0         UnderReplicated { missing: 1 }
//!   [X, Y]            1         Satisfied
//!   [X, Y, Z]         2         OverReplicated { excess: 1 }
//! ```
//!
//! Placement (which instances to add) is the job of `crate::reconcile`.

mod health;

pub use health::ReplicaHealth;

use crate::instance::InstanceId;
use crate::topology::Region;

impl Region {
    /// Tolerated failures beyond the primary: `len(replicas) - 1`
    pub fn current_f(&self) -> i64 {
        self.replicas.len() as i64 - 1
    }

    /// Target replica-set size
    pub fn target_replicas(&self) -> usize {
        self.desired_f() as usize + 1
    }

    /// Append `instance` to the tail of the chain
    ///
    /// Does not deduplicate; callers must not add an instance twice.
    pub fn add_replica(&mut self, instance: InstanceId) {
        self.replicas.push(instance);
    }

    /// Drop every replica listed in `bad`, keeping survivor order
    ///
    /// Returns how many replicas were removed.
    pub fn remove_replicas(&mut self, bad: &[InstanceId]) -> usize {
        let before = self.replicas.len();
        self.replicas.retain(|r| !bad.contains(r));
        before - self.replicas.len()
    }

    /// Classify the replica set against the target
    pub fn health(&self) -> ReplicaHealth {
        ReplicaHealth::assess(self.replicas.len(), self.target_replicas())
    }

    /// Replicas to add before the target is met
    pub fn replicas_needed(&self) -> usize {
        self.target_replicas().saturating_sub(self.replicas.len())
    }

    /// Replacement region with a new target
    ///
    /// The result compares unequal to `self` when the target differs. The
    /// replica chain carries over, truncated head-first to the new size.
    pub fn retargeted(&self, desired_f: u32) -> Region {
        let mut region = self.clone();
        region.set_desired_f(desired_f);
        region.replicas.truncate(desired_f as usize + 1);
        region
    }
}
