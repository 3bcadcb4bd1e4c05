//! Subspace definitions
//!
//! A subspace hashes a subset of a space's dimensions and splits the
//! resulting 64-bit domain into regions.

use serde::{Deserialize, Serialize};

use crate::error::{CoordError, Result};
use super::{Dimension, Region};

/// Largest `bits` accepted by [`Subspace::uniform_regions`] (65536 regions)
pub const MAX_UNIFORM_BITS: u32 = 16;

/// A partitioning of some dimensions into disjoint regions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SubspaceParts")]
pub struct Subspace {
    dimensions: Vec<Dimension>,
    nosearch: Vec<Dimension>,
    regions: Vec<Region>,
}

#[derive(Deserialize)]
struct SubspaceParts {
    dimensions: Vec<Dimension>,
    nosearch: Vec<Dimension>,
    regions: Vec<Region>,
}

impl TryFrom<SubspaceParts> for Subspace {
    type Error = CoordError;

    fn try_from(parts: SubspaceParts) -> Result<Self> {
        Subspace::new(parts.dimensions, parts.nosearch, parts.regions)
    }
}

impl Subspace {
    /// Create a subspace
    ///
    /// Checks:
    /// 1. At least one dimension, no duplicates
    /// 2. `nosearch` is a subset of `dimensions`
    /// 3. `regions` are pairwise disjoint and cover the whole hash domain
    pub fn new(
        dimensions: Vec<Dimension>,
        nosearch: Vec<Dimension>,
        regions: Vec<Region>,
    ) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(CoordError::InvalidTopology(
                "subspace must hash at least one dimension".to_string(),
            ));
        }

        for (i, dim) in dimensions.iter().enumerate() {
            if dimensions[..i].iter().any(|d| d.name() == dim.name()) {
                return Err(CoordError::InvalidTopology(format!(
                    "subspace lists dimension '{}' twice",
                    dim.name()
                )));
            }
        }

        let mut nosearch_dedup: Vec<Dimension> = Vec::with_capacity(nosearch.len());
        for dim in nosearch {
            if !dimensions.contains(&dim) {
                return Err(CoordError::InvalidTopology(format!(
                    "nosearch dimension '{}' is not hashed by the subspace",
                    dim.name()
                )));
            }
            if !nosearch_dedup.contains(&dim) {
                nosearch_dedup.push(dim);
            }
        }

        check_partition(&regions)?;

        Ok(Self {
            dimensions,
            nosearch: nosearch_dedup,
            regions,
        })
    }

    /// Build `2^bits` regions splitting the domain on the top `bits` bits
    ///
    /// `bits == 0` yields a single region covering everything.
    pub fn uniform_regions(bits: u32, desired_f: u32) -> Result<Vec<Region>> {
        if bits > MAX_UNIFORM_BITS {
            return Err(CoordError::InvalidTopology(format!(
                "partition bits {} exceeds maximum {}",
                bits, MAX_UNIFORM_BITS
            )));
        }
        if bits == 0 {
            return Ok(vec![Region::new(0, 0, desired_f)?]);
        }

        let shift = 64 - bits;
        let mask = u64::MAX << shift;
        (0..1u64 << bits)
            .map(|i| Region::new(i << shift, mask, desired_f))
            .collect()
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn nosearch(&self) -> &[Dimension] {
        &self.nosearch
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub(crate) fn regions_mut(&mut self) -> &mut [Region] {
        &mut self.regions
    }

    /// True if the named dimension is indexed for search
    pub fn is_searchable(&self, name: &str) -> bool {
        self.dimensions.iter().any(|d| d.name() == name)
            && !self.nosearch.iter().any(|d| d.name() == name)
    }

    /// The region responsible for `hash`
    ///
    /// Always `Some` for a validated subspace; the partition is total.
    pub fn region_for(&self, hash: u64) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(hash))
    }

    /// True if both subspaces hash the same dimensions in the same order
    pub fn same_dimensions(&self, other: &Subspace) -> bool {
        self.dimensions == other.dimensions
    }
}

/// Verify that `regions` is a total, non-overlapping partition
///
/// Disjoint cells with sizes summing to 2^64 cover the domain exactly.
fn check_partition(regions: &[Region]) -> Result<()> {
    let overlap = if regions.iter().all(|r| is_prefix_mask(r.mask())) {
        first_overlap_sorted(regions, |r| (r.prefix(), r.mask()))
    } else if regions.iter().all(|r| is_prefix_mask(r.mask().reverse_bits())) {
        // Low-bit masks are prefix masks read backwards
        first_overlap_sorted(regions, |r| (r.prefix().reverse_bits(), r.mask().reverse_bits()))
    } else {
        first_overlap_pairwise(regions)
    };
    if let Some((a, b)) = overlap {
        return Err(CoordError::InvalidTopology(format!(
            "{} overlaps {}",
            a, b
        )));
    }

    let covered: u128 = regions.iter().map(Region::cell_size).sum();
    if covered != 1u128 << 64 {
        return Err(CoordError::InvalidTopology(format!(
            "regions cover {} of {} hash values",
            covered,
            1u128 << 64
        )));
    }

    Ok(())
}

/// Mask whose set bits are a contiguous run from the top (or no bits)
fn is_prefix_mask(mask: u64) -> bool {
    mask.leading_ones() + mask.trailing_zeros() == 64
}

/// Overlap search for prefix-mask cells
///
/// Each cell is the interval `[prefix, prefix | !mask]`. After sorting by
/// start, any overlap shows up between neighbours.
fn first_overlap_sorted<F>(regions: &[Region], key: F) -> Option<(&Region, &Region)>
where
    F: Fn(&Region) -> (u64, u64),
{
    let mut cells: Vec<(u64, u64, &Region)> = regions
        .iter()
        .map(|r| {
            let (prefix, mask) = key(r);
            (prefix, prefix | !mask, r)
        })
        .collect();
    cells.sort_unstable_by_key(|&(start, end, _)| (start, end));

    cells.windows(2).find_map(|pair| {
        let (_, prev_end, prev) = pair[0];
        let (start, _, next) = pair[1];
        (start <= prev_end).then_some((prev, next))
    })
}

fn first_overlap_pairwise(regions: &[Region]) -> Option<(&Region, &Region)> {
    regions.iter().enumerate().find_map(|(i, a)| {
        regions[i + 1..]
            .iter()
            .find(|b| a.overlaps(b))
            .map(|b| (a, b))
    })
}
