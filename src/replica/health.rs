//! Replica health classification

/// How a region's replica set compares to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicaHealth {
    /// No replicas at all (`current_f == -1`)
    Unassigned,

    /// Fewer replicas than `desired_f + 1`
    UnderReplicated { missing: usize },

    /// Exactly `desired_f + 1` replicas
    Satisfied,

    /// More replicas than the target
    OverReplicated { excess: usize },
}

impl ReplicaHealth {
    pub(crate) fn assess(replicas: usize, target: usize) -> Self {
        if replicas == 0 {
            ReplicaHealth::Unassigned
        } else if replicas < target {
            ReplicaHealth::UnderReplicated {
                missing: target - replicas,
            }
        } else if replicas == target {
            ReplicaHealth::Satisfied
        } else {
            ReplicaHealth::OverReplicated {
                excess: replicas - target,
            }
        }
    }

    /// True when reconciliation must propose more replicas
    pub fn needs_replicas(&self) -> bool {
        matches!(
            self,
            ReplicaHealth::Unassigned | ReplicaHealth::UnderReplicated { .. }
        )
    }
}
