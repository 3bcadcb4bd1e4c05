//! Region definitions
//!
//! One cell of a subspace's partition. Replica bookkeeping lives in
//! `crate::replica`.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{CoordError, Result};
use crate::instance::InstanceId;

/// A partition cell plus its target and current replica set
///
/// ## Equality
/// Two regions are equal when `(prefix, mask, desired_f)` match, whatever
/// their replicas. Diffing relies on this to tell a re-announced region from
/// a pure membership change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RegionParts")]
pub struct Region {
    prefix: u64,
    mask: u64,
    desired_f: u32,

    /// Replication chain, head first
    pub(crate) replicas: Vec<InstanceId>,
}

/// Decoded form of a [`Region`], checked by [`Region::new`]
#[derive(Deserialize)]
struct RegionParts {
    prefix: u64,
    mask: u64,
    desired_f: u32,
    replicas: Vec<InstanceId>,
}

impl TryFrom<RegionParts> for Region {
    type Error = CoordError;

    fn try_from(parts: RegionParts) -> Result<Self> {
        let mut region = Region::new(parts.prefix, parts.mask, parts.desired_f)?;
        region.replicas = parts.replicas;
        Ok(region)
    }
}

impl Region {
    /// Create a region with no replicas
    ///
    /// `prefix` may only set bits that are also set in `mask`.
    pub fn new(prefix: u64, mask: u64, desired_f: u32) -> Result<Self> {
        if prefix & !mask != 0 {
            return Err(CoordError::InvalidTopology(format!(
                "region prefix {:#x} has bits outside mask {:#x}",
                prefix, mask
            )));
        }
        Ok(Self {
            prefix,
            mask,
            desired_f,
            replicas: Vec::new(),
        })
    }

    pub fn prefix(&self) -> u64 {
        self.prefix
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }

    pub fn desired_f(&self) -> u32 {
        self.desired_f
    }

    pub(crate) fn set_desired_f(&mut self, desired_f: u32) {
        self.desired_f = desired_f;
    }

    /// Replicas in chain order (head first)
    pub fn replicas(&self) -> &[InstanceId] {
        &self.replicas
    }

    /// True if `hash` falls in this cell
    pub fn contains(&self, hash: u64) -> bool {
        hash & self.mask == self.prefix
    }

    /// True if some hash falls in both cells
    pub fn overlaps(&self, other: &Region) -> bool {
        (self.prefix ^ other.prefix) & self.mask & other.mask == 0
    }

    /// Number of hash values covered by this cell
    pub fn cell_size(&self) -> u128 {
        1u128 << (64 - self.mask.count_ones())
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.mask == other.mask && self.desired_f == other.desired_f
    }
}

impl Eq for Region {}

impl Hash for Region {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.prefix.hash(state);
        self.mask.hash(state);
        self.desired_f.hash(state);
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region(prefix={:#x}, mask={:#x}, desired_f={})",
            self.prefix, self.mask, self.desired_f
        )
    }
}
