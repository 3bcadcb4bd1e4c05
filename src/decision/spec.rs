//! Serializable space descriptions

use serde::{Deserialize, Serialize};

use crate::error::{CoordError, Result};
use crate::topology::{Datatype, Dimension, Region, Space, Subspace};

/// A space as carried in a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceSpec {
    pub name: String,

    /// `(name, datatype)`; the first is the key
    pub dimensions: Vec<(String, Datatype)>,

    pub subspaces: Vec<SubspaceSpec>,
}

/// A subspace referring to dimensions by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubspaceSpec {
    pub dimensions: Vec<String>,

    #[serde(default)]
    pub nosearch: Vec<String>,

    pub regions: RegionLayout,
}

/// How a subspace's regions are laid out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionLayout {
    /// `2^bits` equal regions on the top hash bits
    Uniform { bits: u32, desired_f: u32 },

    /// Explicit cells; must still form a partition
    Explicit(Vec<RegionSpec>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub prefix: u64,
    pub mask: u64,
    pub desired_f: u32,
}

impl SpaceSpec {
    /// Validate and build the space. All regions start with no replicas.
    pub fn build(&self) -> Result<Space> {
        let dimensions = self
            .dimensions
            .iter()
            .map(|(name, datatype)| Dimension::new(name.clone(), *datatype))
            .collect::<Result<Vec<_>>>()?;

        let subspaces = self
            .subspaces
            .iter()
            .map(|s| s.build(&self.name, &dimensions))
            .collect::<Result<Vec<_>>>()?;

        Space::new(self.name.clone(), dimensions, subspaces)
    }
}

impl SubspaceSpec {
    fn build(&self, space: &str, dimensions: &[Dimension]) -> Result<Subspace> {
        let resolve = |name: &String| -> Result<Dimension> {
            dimensions
                .iter()
                .find(|d| d.name() == name)
                .cloned()
                .ok_or_else(|| {
                    CoordError::InvalidTopology(format!(
                        "space '{}' has no dimension '{}'",
                        space, name
                    ))
                })
        };

        let hashed = self.dimensions.iter().map(resolve).collect::<Result<Vec<_>>>()?;
        let nosearch = self.nosearch.iter().map(resolve).collect::<Result<Vec<_>>>()?;

        let regions = match &self.regions {
            RegionLayout::Uniform { bits, desired_f } => {
                Subspace::uniform_regions(*bits, *desired_f)?
            }
            RegionLayout::Explicit(cells) => cells
                .iter()
                .map(|c| Region::new(c.prefix, c.mask, c.desired_f))
                .collect::<Result<Vec<_>>>()?,
        };

        Subspace::new(hashed, nosearch, regions)
    }
}
