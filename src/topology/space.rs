//! Space definitions

use serde::{Deserialize, Serialize};

use crate::error::{CoordError, Result};
use crate::instance::InstanceId;
use super::{Dimension, Region, Subspace};

/// A named schema: dimensions plus the subspaces partitioning them
///
/// The first dimension is the key. Dimensions and subspaces are fixed at
/// construction; repartitioning builds a new `Space` with the same name.
/// Decoding goes through the same checks as [`Space::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SpaceParts")]
pub struct Space {
    name: String,
    dimensions: Vec<Dimension>,
    subspaces: Vec<Subspace>,
}

#[derive(Deserialize)]
struct SpaceParts {
    name: String,
    dimensions: Vec<Dimension>,
    subspaces: Vec<Subspace>,
}

impl TryFrom<SpaceParts> for Space {
    type Error = CoordError;

    fn try_from(parts: SpaceParts) -> Result<Self> {
        Space::new(parts.name, parts.dimensions, parts.subspaces)
    }
}

impl Space {
    /// Create a space
    ///
    /// Every subspace may only hash dimensions that belong to this space.
    pub fn new(
        name: impl Into<String>,
        dimensions: Vec<Dimension>,
        subspaces: Vec<Subspace>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoordError::InvalidTopology(
                "space name must not be empty".to_string(),
            ));
        }
        if dimensions.is_empty() {
            return Err(CoordError::InvalidTopology(format!(
                "space '{}' has no key dimension",
                name
            )));
        }
        for (i, dim) in dimensions.iter().enumerate() {
            if dimensions[..i].iter().any(|d| d.name() == dim.name()) {
                return Err(CoordError::InvalidTopology(format!(
                    "space '{}' declares dimension '{}' twice",
                    name,
                    dim.name()
                )));
            }
        }
        for subspace in &subspaces {
            if let Some(dim) = subspace.dimensions().iter().find(|d| !dimensions.contains(d)) {
                return Err(CoordError::InvalidTopology(format!(
                    "subspace of '{}' hashes foreign dimension {}",
                    name, dim
                )));
            }
        }

        Ok(Self {
            name,
            dimensions,
            subspaces,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Look up a dimension by name
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name() == name)
    }

    /// The key dimension
    pub fn key(&self) -> &Dimension {
        &self.dimensions[0]
    }

    pub fn subspaces(&self) -> &[Subspace] {
        &self.subspaces
    }

    pub(crate) fn subspaces_mut(&mut self) -> &mut [Subspace] {
        &mut self.subspaces
    }

    /// Every region across all subspaces
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.subspaces.iter().flat_map(|s| s.regions().iter())
    }

    pub(crate) fn regions_mut(&mut self) -> impl Iterator<Item = &mut Region> {
        self.subspaces
            .iter_mut()
            .flat_map(|s| s.regions_mut().iter_mut())
    }

    /// True if any region lists `instance` as a replica
    pub fn references(&self, instance: InstanceId) -> bool {
        self.regions().any(|r| r.replicas().contains(&instance))
    }
}
