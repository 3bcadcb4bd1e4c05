//! Instance registry
//!
//! All incarnations known to the coordinator, keyed by token.

use std::collections::BTreeMap;

use crate::error::{CoordError, Result};
use super::{Instance, InstanceBindings, InstanceId};

/// Registered instances, live and failed
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: BTreeMap<InstanceId, Instance>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly registered instance
    pub fn register(&mut self, instance: Instance) -> Result<InstanceId> {
        let id = instance.id();
        if self.instances.contains_key(&id) {
            return Err(CoordError::DuplicateInstance(id));
        }
        self.instances.insert(id, instance);
        Ok(id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// Mutable lookup, failing on unknown ids
    pub fn require_mut(&mut self, id: InstanceId) -> Result<&mut Instance> {
        self.instances
            .get_mut(&id)
            .ok_or(CoordError::UnknownInstance(id))
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn is_live(&self, id: InstanceId) -> bool {
        self.instances.get(&id).map(Instance::is_live).unwrap_or(false)
    }

    /// Mark an instance failed. Returns false if it already was.
    pub fn mark_failed(&mut self, id: InstanceId) -> Result<bool> {
        let instance = self.require_mut(id)?;
        if !instance.is_live() {
            return Ok(false);
        }
        instance.mark_failed();
        Ok(true)
    }

    /// Drop an instance from the registry
    pub fn remove(&mut self, id: InstanceId) -> Result<Instance> {
        self.instances
            .remove(&id)
            .ok_or(CoordError::UnknownInstance(id))
    }

    /// Live instance bound to the same address and incoming port
    pub fn live_at_endpoint(&self, bindings: &InstanceBindings) -> Option<InstanceId> {
        self.live()
            .find(|i| i.bindings().same_endpoint(bindings))
            .map(Instance::id)
    }

    /// Live instances in id order
    pub fn live(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values().filter(|i| i.is_live())
    }

    pub(crate) fn live_mut(&mut self) -> impl Iterator<Item = &mut Instance> {
        self.instances.values_mut().filter(|i| i.is_live())
    }

    /// Every instance in id order
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
