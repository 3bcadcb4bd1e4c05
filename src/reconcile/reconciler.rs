//! Reconciliation driver

use std::collections::{BTreeMap, HashMap};

use crate::error::{CoordError, Result};
use crate::instance::{InstanceId, InstanceRegistry};
use crate::topology::{Region, Space};
use super::{Candidate, PlacementPolicy, PlacementRequest};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Replicas added across all regions
    pub added: usize,

    /// Regions still short of their target afterwards
    pub under_replicated: usize,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.added > 0
    }
}

/// Append `id` to `region` after checking it is a live registered instance
///
/// A dead or unknown id here is a coordinator bug, not a placement choice.
pub fn add_checked_replica(
    region: &mut Region,
    registry: &InstanceRegistry,
    id: InstanceId,
) -> Result<()> {
    if !registry.is_live(id) {
        let err = CoordError::MissingInstance(id);
        tracing::error!("coordinator bug: {}", err);
        return Err(err);
    }
    region.add_replica(id);
    Ok(())
}

/// Offer every under-replicated region to `policy`
///
/// `excluded` instances are live but must not receive replicas this pass.
pub fn reconcile(
    spaces: &mut BTreeMap<String, Space>,
    registry: &InstanceRegistry,
    policy: &dyn PlacementPolicy,
    excluded: &[InstanceId],
) -> Result<ReconcileReport> {
    let mut loads: HashMap<InstanceId, usize> = registry
        .live()
        .filter(|i| !excluded.contains(&i.id()))
        .map(|i| (i.id(), 0))
        .collect();

    for space in spaces.values() {
        for region in space.regions() {
            for replica in region.replicas() {
                if let Some(load) = loads.get_mut(replica) {
                    *load += 1;
                }
            }
        }
    }

    let mut report = ReconcileReport::default();

    for (name, space) in spaces.iter_mut() {
        for region in space.regions_mut() {
            if !region.health().needs_replicas() {
                continue;
            }

            let mut candidates: Vec<Candidate> = loads
                .iter()
                .map(|(id, load)| Candidate { id: *id, load: *load })
                .collect();
            candidates.sort_by_key(|c| c.id);

            let needed = region.replicas_needed();
            let proposed = policy.propose(&PlacementRequest {
                space: name,
                region,
                needed,
                candidates: &candidates,
            });

            let mut accepted = 0;
            for id in proposed {
                if accepted == needed {
                    break;
                }
                if region.replicas().contains(&id) {
                    continue;
                }
                if !loads.contains_key(&id) {
                    tracing::warn!(
                        "Placement policy proposed ineligible {} for {} in '{}'",
                        id,
                        region,
                        name
                    );
                    continue;
                }
                add_checked_replica(region, registry, id)?;
                if let Some(load) = loads.get_mut(&id) {
                    *load += 1;
                }
                accepted += 1;
            }
            report.added += accepted;

            if region.health().needs_replicas() {
                report.under_replicated += 1;
                tracing::warn!(
                    "{} in '{}' remains under-replicated (current_f={})",
                    region,
                    name,
                    region.current_f()
                );
            }
        }
    }

    Ok(report)
}
