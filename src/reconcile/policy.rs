//! Placement policies

use crate::instance::InstanceId;
use crate::topology::Region;

/// An instance eligible to receive a replica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub id: InstanceId,

    /// Regions this instance currently replicates, across all spaces
    pub load: usize,
}

/// A region asking for more replicas
#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest<'a> {
    pub space: &'a str,
    pub region: &'a Region,

    /// How many replicas the region is short
    pub needed: usize,

    /// Live, non-excluded instances with their load
    pub candidates: &'a [Candidate],
}

/// Chooses instances for under-replicated regions
///
/// Implementations may return fewer than `needed` ids (or none) when no
/// good placement exists; the region stays under-replicated until a later
/// decision changes the picture.
pub trait PlacementPolicy: Send {
    fn propose(&self, request: &PlacementRequest<'_>) -> Vec<InstanceId>;
}

/// Picks the least-loaded candidates not already in the region
///
/// Ties break on instance id so placement is deterministic across replays.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastLoadedPolicy;

impl PlacementPolicy for LeastLoadedPolicy {
    fn propose(&self, request: &PlacementRequest<'_>) -> Vec<InstanceId> {
        let mut eligible: Vec<&Candidate> = request
            .candidates
            .iter()
            .filter(|c| !request.region.replicas().contains(&c.id))
            .collect();
        eligible.sort_by_key(|c| (c.load, c.id));
        eligible
            .into_iter()
            .take(request.needed)
            .map(|c| c.id)
            .collect()
    }
}
