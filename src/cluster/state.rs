//! Cluster state

use std::collections::BTreeMap;

use crate::error::{CoordError, Result};
use crate::instance::{Instance, InstanceBindings, InstanceId, InstanceRegistry};
use crate::reconcile::{self, PlacementPolicy, ReconcileReport};
use crate::routing::RoutingTable;
use crate::topology::{inherit_replicas, Space, SubspaceDiff};
use super::ConfigSnapshot;

/// Spaces, instances and the configuration counter
#[derive(Debug)]
pub struct ClusterState {
    /// Spaces by name
    spaces: BTreeMap<String, Space>,

    instances: InstanceRegistry,

    /// Number of the last configuration issued (0 = none yet)
    config_version: u64,

    /// Queue depth above which an instance is reported as lagging
    pending_warn_threshold: usize,
}

impl ClusterState {
    pub fn new(pending_warn_threshold: usize) -> Self {
        Self {
            spaces: BTreeMap::new(),
            instances: InstanceRegistry::new(),
            config_version: 0,
            pending_warn_threshold,
        }
    }

    // =========================================================================
    // Instances
    // =========================================================================

    /// Register a new process incarnation
    ///
    /// A live instance already bound to the same endpoint is an earlier
    /// incarnation of the same node; it is failed and purged first.
    /// Returns the new id and the superseded one, if any.
    pub fn register_instance(
        &mut self,
        bindings: InstanceBindings,
        pid: u32,
        token: u64,
    ) -> Result<(InstanceId, Option<InstanceId>)> {
        let id = InstanceId(token);
        if self.instances.contains(id) {
            return Err(CoordError::DuplicateInstance(id));
        }

        let superseded = self.instances.live_at_endpoint(&bindings);
        if let Some(old) = superseded {
            tracing::info!("{} replaces earlier incarnation {} at {}", id, old, bindings);
            self.fail_instance(old)?;
        }

        self.instances.register(Instance::new(bindings, pid, token))?;
        Ok((id, superseded))
    }

    /// Declare an instance failed and purge it from every region
    ///
    /// Returns false if it was already failed.
    pub fn fail_instance(&mut self, id: InstanceId) -> Result<bool> {
        if !self.instances.mark_failed(id)? {
            return Ok(false);
        }
        let purged = self.purge(id);
        tracing::info!("{} failed, removed from {} regions", id, purged);
        Ok(true)
    }

    /// Remove an instance for good
    pub fn remove_instance(&mut self, id: InstanceId) -> Result<Instance> {
        if !self.instances.contains(id) {
            return Err(CoordError::UnknownInstance(id));
        }
        self.purge(id);
        if self.spaces.values().any(|s| s.references(id)) {
            let err = CoordError::InstanceStillReferenced(id);
            tracing::error!("coordinator bug: {}", err);
            return Err(err);
        }
        self.instances.remove(id)
    }

    /// Remove `id` from every region. Returns how many regions lost it.
    fn purge(&mut self, id: InstanceId) -> usize {
        let bad = [id];
        self.spaces
            .values_mut()
            .flat_map(|s| s.regions_mut())
            .map(|r| r.remove_replicas(&bad))
            .filter(|removed| *removed > 0)
            .count()
    }

    pub fn instances(&self) -> &InstanceRegistry {
        &self.instances
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    // =========================================================================
    // Spaces
    // =========================================================================

    pub fn create_space(&mut self, space: Space) -> Result<()> {
        if self.spaces.contains_key(space.name()) {
            return Err(CoordError::SpaceExists(space.name().to_string()));
        }
        tracing::info!(
            "Creating space '{}' ({} subspaces, {} regions)",
            space.name(),
            space.subspaces().len(),
            space.regions().count()
        );
        self.spaces.insert(space.name().to_string(), space);
        Ok(())
    }

    /// Replace a space with a new partitioning of the same name
    ///
    /// Regions equal to an old region of the paired subspace inherit its
    /// replica chain; all others start empty.
    pub fn repartition(&mut self, mut space: Space) -> Result<Vec<SubspaceDiff>> {
        let old = self
            .spaces
            .get(space.name())
            .ok_or_else(|| CoordError::UnknownSpace(space.name().to_string()))?;

        let diffs = inherit_replicas(old, &mut space);
        for (i, diff) in diffs.iter().enumerate() {
            tracing::info!(
                "Repartition '{}' subspace {}: {} unchanged, {} announced, {} retired",
                space.name(),
                i,
                diff.unchanged(),
                diff.announced(),
                diff.retired
            );
        }

        self.spaces.insert(space.name().to_string(), space);
        Ok(diffs)
    }

    pub fn drop_space(&mut self, name: &str) -> Result<Space> {
        self.spaces
            .remove(name)
            .ok_or_else(|| CoordError::UnknownSpace(name.to_string()))
    }

    /// Replace every region of a space with one targeting `desired_f`
    ///
    /// Returns how many regions changed target.
    pub fn change_replication_target(&mut self, name: &str, desired_f: u32) -> Result<usize> {
        let space = self
            .spaces
            .get_mut(name)
            .ok_or_else(|| CoordError::UnknownSpace(name.to_string()))?;

        let mut changed = 0;
        for region in space.regions_mut() {
            if region.desired_f() != desired_f {
                *region = region.retargeted(desired_f);
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn spaces(&self) -> impl Iterator<Item = &Space> {
        self.spaces.values()
    }

    pub fn space(&self, name: &str) -> Option<&Space> {
        self.spaces.get(name)
    }

    // =========================================================================
    // Replicas
    // =========================================================================

    /// Append a replica to one region by position
    pub fn add_replica(
        &mut self,
        space: &str,
        subspace: usize,
        region: usize,
        id: InstanceId,
    ) -> Result<()> {
        let target = self
            .spaces
            .get_mut(space)
            .ok_or_else(|| CoordError::UnknownSpace(space.to_string()))?
            .subspaces_mut()
            .get_mut(subspace)
            .and_then(|s| s.regions_mut().get_mut(region))
            .ok_or_else(|| {
                CoordError::InvalidTopology(format!(
                    "space '{}' has no region {}/{}",
                    space, subspace, region
                ))
            })?;
        reconcile::add_checked_replica(target, &self.instances, id)
    }

    /// Fill under-replicated regions using `policy`
    pub fn reconcile(
        &mut self,
        policy: &dyn PlacementPolicy,
        excluded: &[InstanceId],
    ) -> Result<ReconcileReport> {
        reconcile::reconcile(&mut self.spaces, &self.instances, policy, excluded)
    }

    // =========================================================================
    // Configurations
    // =========================================================================

    /// Number of the last configuration issued
    pub fn config_version(&self) -> u64 {
        self.config_version
    }

    /// Snapshot of the current topology under the current version
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            version: self.config_version,
            spaces: self.spaces.values().cloned().collect(),
            instances: self
                .instances
                .live()
                .map(|i| (i.id(), i.bindings()))
                .collect(),
        }
    }

    /// Number, encode and enqueue a new configuration for every live instance
    pub fn issue_config(&mut self) -> Result<u64> {
        self.config_version += 1;
        let version = self.config_version;
        let payload = self.snapshot().encode()?;

        let threshold = self.pending_warn_threshold;
        let mut recipients = 0;
        for instance in self.instances.live_mut() {
            instance.add_config(version, payload.clone())?;
            recipients += 1;
            if instance.pending_len() > threshold {
                tracing::warn!(
                    "{} has {} unconfirmed configurations (last acked {})",
                    instance.id(),
                    instance.pending_len(),
                    instance.last_acked()
                );
            }
        }

        tracing::info!(
            "Issued config {} ({} bytes) to {} instances",
            version,
            payload.len(),
            recipients
        );
        Ok(version)
    }

    /// Apply an acknowledgment from `id`
    pub fn ack_config(&mut self, id: InstanceId, num: u64) -> Result<()> {
        self.confirming(id, num)?.ack_config(num)
    }

    /// Apply a rejection from `id`
    ///
    /// The instance could not take on its placement, so it is dropped from
    /// every region it replicates. Returns how many regions lost it.
    pub fn reject_config(&mut self, id: InstanceId, num: u64) -> Result<usize> {
        self.confirming(id, num)?.reject_config(num)?;
        Ok(self.purge(id))
    }

    /// The instance a confirmation is from
    ///
    /// A removed instance may still have confirmations in flight; those are
    /// late, not a bad decision.
    fn confirming(&mut self, id: InstanceId, num: u64) -> Result<&mut Instance> {
        self.instances
            .require_mut(id)
            .map_err(|_| CoordError::LateConfirmation { instance: id, num })
    }

    /// Routing view of the current state
    pub fn routing_table(&self) -> RoutingTable {
        RoutingTable::build(self.config_version, self.spaces.values(), &self.instances)
    }
}
