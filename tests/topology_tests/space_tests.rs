//! Tests for Dimension, Subspace and Space
//!
//! These tests verify:
//! - Name and membership validation
//! - Partition validation (overlaps, gaps)
//! - Uniform partition construction and region lookup
//! - Partition validation at the uniform-layout limit, for top-bit and
//!   low-bit masks

use std::time::{Duration, Instant};

use atlascoord::topology::{Datatype, Dimension, Region, Space, Subspace, MAX_UNIFORM_BITS};

// =============================================================================
// Helper Functions
// =============================================================================

fn dim(name: &str) -> Dimension {
    Dimension::new(name, Datatype::String).unwrap()
}

fn whole_domain(desired_f: u32) -> Vec<Region> {
    vec![Region::new(0, 0, desired_f).unwrap()]
}

// =============================================================================
// Dimension Tests
// =============================================================================

#[test]
fn test_dimension_requires_name() {
    assert!(Dimension::new("", Datatype::Int64).is_err());
    assert!(Dimension::new("   ", Datatype::Int64).is_err());

    let d = Dimension::new("age", Datatype::Int64).unwrap();
    assert_eq!(d.name(), "age");
    assert_eq!(d.datatype(), Datatype::Int64);
}

// =============================================================================
// Subspace Tests
// =============================================================================

#[test]
fn test_subspace_accepts_exact_partition() {
    let regions = vec![
        Region::new(0b00, 0b11, 0).unwrap(),
        Region::new(0b01, 0b11, 0).unwrap(),
        Region::new(0b10, 0b10, 0).unwrap(),
    ];

    let subspace = Subspace::new(vec![dim("k")], vec![], regions).unwrap();
    assert_eq!(subspace.regions().len(), 3);
}

#[test]
fn test_subspace_rejects_overlap() {
    let regions = vec![
        Region::new(0, 0, 0).unwrap(),
        Region::new(0b1, 0b1, 0).unwrap(),
    ];

    assert!(Subspace::new(vec![dim("k")], vec![], regions).is_err());
}

#[test]
fn test_subspace_rejects_gap() {
    let regions = vec![Region::new(0b0, 0b1, 0).unwrap()];

    assert!(Subspace::new(vec![dim("k")], vec![], regions).is_err());
}

#[test]
fn test_subspace_rejects_empty_regions() {
    assert!(Subspace::new(vec![dim("k")], vec![], vec![]).is_err());
}

#[test]
fn test_subspace_requires_dimensions() {
    assert!(Subspace::new(vec![], vec![], whole_domain(0)).is_err());
}

#[test]
fn test_subspace_rejects_duplicate_dimension() {
    assert!(Subspace::new(vec![dim("a"), dim("a")], vec![], whole_domain(0)).is_err());
}

#[test]
fn test_nosearch_must_be_hashed() {
    let result = Subspace::new(vec![dim("a")], vec![dim("b")], whole_domain(0));
    assert!(result.is_err());
}

#[test]
fn test_nosearch_marks_dimension_unsearchable() {
    let subspace =
        Subspace::new(vec![dim("a"), dim("b")], vec![dim("b"), dim("b")], whole_domain(0)).unwrap();

    assert_eq!(subspace.nosearch().len(), 1);
    assert!(subspace.is_searchable("a"));
    assert!(!subspace.is_searchable("b"));
    assert!(!subspace.is_searchable("c"));
}

#[test]
fn test_uniform_regions_partition_domain() {
    let regions = Subspace::uniform_regions(3, 1).unwrap();
    assert_eq!(regions.len(), 8);

    let subspace = Subspace::new(vec![dim("k")], vec![], regions).unwrap();

    for hash in [0u64, 1, 1 << 61, 1 << 62, 1 << 63, u64::MAX] {
        let owners = subspace.regions().iter().filter(|r| r.contains(hash)).count();
        assert_eq!(owners, 1, "hash {:#x} owned by {} regions", hash, owners);
    }
}

#[test]
fn test_uniform_zero_bits_is_single_region() {
    let regions = Subspace::uniform_regions(0, 2).unwrap();
    assert_eq!(regions, vec![Region::new(0, 0, 2).unwrap()]);
}

#[test]
fn test_uniform_rejects_too_many_bits() {
    assert!(Subspace::uniform_regions(MAX_UNIFORM_BITS + 1, 0).is_err());
}

#[test]
fn test_region_for_uses_top_bits() {
    let regions = Subspace::uniform_regions(1, 0).unwrap();
    let subspace = Subspace::new(vec![dim("k")], vec![], regions).unwrap();

    assert_eq!(subspace.region_for(0).unwrap().prefix(), 0);
    assert_eq!(subspace.region_for(u64::MAX).unwrap().prefix(), 1 << 63);
}

// =============================================================================
// Large Partition Tests
// =============================================================================

#[test]
fn test_largest_uniform_layout_validates_quickly() {
    let regions = Subspace::uniform_regions(MAX_UNIFORM_BITS, 2).unwrap();
    assert_eq!(regions.len(), 1 << MAX_UNIFORM_BITS);

    let started = Instant::now();
    let subspace = Subspace::new(vec![dim("k")], vec![], regions).unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "validation took {:?}",
        started.elapsed()
    );
    assert_eq!(subspace.regions().len(), 1 << MAX_UNIFORM_BITS);
}

#[test]
fn test_overlap_found_among_many_regions() {
    let mut regions = Subspace::uniform_regions(12, 0).unwrap();
    // Replace the last cell with one covering the whole top half
    regions.pop();
    regions.push(Region::new(1 << 63, 1 << 63, 0).unwrap());

    assert!(Subspace::new(vec![dim("k")], vec![], regions).is_err());
}

#[test]
fn test_gap_found_among_many_regions() {
    let mut regions = Subspace::uniform_regions(12, 0).unwrap();
    regions.remove(1234);

    assert!(Subspace::new(vec![dim("k")], vec![], regions).is_err());
}

#[test]
fn test_nested_cells_with_equal_prefix_overlap() {
    let mut regions = Subspace::uniform_regions(2, 0).unwrap();
    regions.push(Region::new(0, 1 << 63, 0).unwrap());

    assert!(Subspace::new(vec![dim("k")], vec![], regions).is_err());
}

#[test]
fn test_low_bit_partition() {
    let mask = 0xff;
    let regions: Vec<Region> = (0..=mask)
        .map(|prefix| Region::new(prefix, mask, 0).unwrap())
        .collect();
    assert!(Subspace::new(vec![dim("k")], vec![], regions.clone()).is_ok());

    let mut overlapping = regions;
    overlapping[7] = Region::new(3, 0b11, 0).unwrap();
    assert!(Subspace::new(vec![dim("k")], vec![], overlapping).is_err());
}

// =============================================================================
// Space Tests
// =============================================================================

#[test]
fn test_space_requires_name_and_key() {
    assert!(Space::new("", vec![dim("k")], vec![]).is_err());
    assert!(Space::new("kv", vec![], vec![]).is_err());
}

#[test]
fn test_space_rejects_duplicate_dimensions() {
    assert!(Space::new("kv", vec![dim("k"), dim("k")], vec![]).is_err());
}

#[test]
fn test_space_rejects_foreign_subspace_dimension() {
    let subspace = Subspace::new(vec![dim("other")], vec![], whole_domain(0)).unwrap();
    assert!(Space::new("kv", vec![dim("k")], vec![subspace]).is_err());
}

#[test]
fn test_space_accessors() {
    let key = Subspace::new(vec![dim("k")], vec![], whole_domain(0)).unwrap();
    let by_v = Subspace::new(
        vec![dim("v")],
        vec![],
        Subspace::uniform_regions(2, 1).unwrap(),
    )
    .unwrap();

    let space = Space::new("kv", vec![dim("k"), dim("v")], vec![key, by_v]).unwrap();

    assert_eq!(space.name(), "kv");
    assert_eq!(space.key().name(), "k");
    assert!(space.dimension("v").is_some());
    assert!(space.dimension("w").is_none());
    assert_eq!(space.subspaces().len(), 2);
    assert_eq!(space.regions().count(), 5);
}
