//! Routing table

use std::collections::HashMap;

use crate::instance::{InstanceBindings, InstanceId, InstanceRegistry};
use crate::topology::Space;

/// One region as routers see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRoute {
    pub prefix: u64,
    pub mask: u64,

    /// Replica chain, head first
    pub replicas: Vec<(InstanceId, InstanceBindings)>,
}

impl RegionRoute {
    pub fn contains(&self, hash: u64) -> bool {
        hash & self.mask == self.prefix
    }

    /// Head of the chain
    pub fn head(&self) -> Option<&InstanceBindings> {
        self.replicas.first().map(|(_, b)| b)
    }

    /// Tail of the chain
    pub fn tail(&self) -> Option<&InstanceBindings> {
        self.replicas.last().map(|(_, b)| b)
    }
}

/// Regions of one subspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubspaceRoute {
    /// Names of the hashed dimensions
    pub dimensions: Vec<String>,
    pub regions: Vec<RegionRoute>,
}

/// Routing view at one configuration version
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    version: u64,
    spaces: HashMap<String, Vec<SubspaceRoute>>,
}

impl RoutingTable {
    /// Build from the current spaces
    ///
    /// Replicas without live bindings are left out.
    pub fn build<'a>(
        version: u64,
        spaces: impl Iterator<Item = &'a Space>,
        registry: &InstanceRegistry,
    ) -> Self {
        let spaces = spaces
            .map(|space| {
                let subspaces = space
                    .subspaces()
                    .iter()
                    .map(|subspace| SubspaceRoute {
                        dimensions: subspace
                            .dimensions()
                            .iter()
                            .map(|d| d.name().to_string())
                            .collect(),
                        regions: subspace
                            .regions()
                            .iter()
                            .map(|region| RegionRoute {
                                prefix: region.prefix(),
                                mask: region.mask(),
                                replicas: region
                                    .replicas()
                                    .iter()
                                    .filter_map(|id| {
                                        registry
                                            .get(*id)
                                            .filter(|i| i.is_live())
                                            .map(|i| (*id, i.bindings()))
                                    })
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect();
                (space.name().to_string(), subspaces)
            })
            .collect();

        Self { version, spaces }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Subspaces of a space
    pub fn subspaces(&self, space: &str) -> Option<&[SubspaceRoute]> {
        self.spaces.get(space).map(Vec::as_slice)
    }

    /// The region of `space`'s `subspace` that owns `hash`
    pub fn lookup(&self, space: &str, subspace: usize, hash: u64) -> Option<&RegionRoute> {
        self.spaces
            .get(space)?
            .get(subspace)?
            .regions
            .iter()
            .find(|r| r.contains(hash))
    }

    pub fn space_names(&self) -> impl Iterator<Item = &str> {
        self.spaces.keys().map(String::as_str)
    }
}
