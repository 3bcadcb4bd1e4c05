//! Tests for replica management
//!
//! These tests verify:
//! - current_f tracks the replica count through any sequence of changes
//! - remove_replicas filters and keeps survivor order
//! - Health classification and retargeting

use atlascoord::instance::InstanceId;
use atlascoord::replica::ReplicaHealth;
use atlascoord::topology::Region;

const X: InstanceId = InstanceId(1);
const Y: InstanceId = InstanceId(2);
const Z: InstanceId = InstanceId(3);

// =============================================================================
// current_f Tests
// =============================================================================

#[test]
fn test_scenario_a_current_f_grows_with_replicas() {
    let mut region = Region::new(0, 0b11, 1).unwrap();
    assert_eq!(region.current_f(), -1);

    region.add_replica(X);
    assert_eq!(region.current_f(), 0);

    region.add_replica(Y);
    assert_eq!(region.current_f(), 1);
    assert_eq!(region.current_f(), region.desired_f() as i64);
}

#[test]
fn test_scenario_b_removal_drops_below_target() {
    let mut region = Region::new(0, 0b11, 1).unwrap();
    region.add_replica(X);
    region.add_replica(Y);

    let removed = region.remove_replicas(&[X]);

    assert_eq!(removed, 1);
    assert_eq!(region.replicas(), &[Y]);
    assert_eq!(region.current_f(), 0);
    assert!(region.health().needs_replicas());
}

#[test]
fn test_current_f_consistent_after_mixed_operations() {
    let mut region = Region::new(0, 0, 2).unwrap();
    let steps: Vec<(bool, InstanceId)> = vec![
        (true, X),
        (true, Y),
        (false, X),
        (true, Z),
        (true, X),
        (false, Y),
        (false, InstanceId(99)),
    ];

    for (add, id) in steps {
        if add {
            region.add_replica(id);
        } else {
            region.remove_replicas(&[id]);
        }
        assert_eq!(region.current_f(), region.replicas().len() as i64 - 1);
    }
    assert_eq!(region.replicas(), &[Z, X]);
}

// =============================================================================
// remove_replicas Tests
// =============================================================================

#[test]
fn test_remove_preserves_survivor_order() {
    let mut region = Region::new(0, 0, 3).unwrap();
    for id in [X, Y, Z, InstanceId(4)] {
        region.add_replica(id);
    }

    region.remove_replicas(&[Y, InstanceId(4)]);

    assert_eq!(region.replicas(), &[X, Z]);
}

#[test]
fn test_remove_absent_instance_is_noop() {
    let mut region = Region::new(0, 0, 1).unwrap();
    region.add_replica(X);

    let removed = region.remove_replicas(&[Y, Z]);

    assert_eq!(removed, 0);
    assert_eq!(region.replicas(), &[X]);
}

#[test]
fn test_remove_everything_leaves_unassigned() {
    let mut region = Region::new(0, 0, 1).unwrap();
    region.add_replica(X);
    region.add_replica(Y);

    region.remove_replicas(&[X, Y]);

    assert!(region.replicas().is_empty());
    assert_eq!(region.current_f(), -1);
    assert_eq!(region.health(), ReplicaHealth::Unassigned);
}

#[test]
fn test_add_does_not_deduplicate() {
    let mut region = Region::new(0, 0, 1).unwrap();
    region.add_replica(X);
    region.add_replica(X);

    assert_eq!(region.replicas(), &[X, X]);

    // Removal takes out every copy
    region.remove_replicas(&[X]);
    assert!(region.replicas().is_empty());
}

// =============================================================================
// Health / Retarget Tests
// =============================================================================

#[test]
fn test_health_classification() {
    let mut region = Region::new(0, 0, 1).unwrap();
    assert_eq!(region.health(), ReplicaHealth::Unassigned);
    assert_eq!(region.replicas_needed(), 2);

    region.add_replica(X);
    assert_eq!(region.health(), ReplicaHealth::UnderReplicated { missing: 1 });

    region.add_replica(Y);
    assert_eq!(region.health(), ReplicaHealth::Satisfied);
    assert_eq!(region.replicas_needed(), 0);

    region.add_replica(Z);
    assert_eq!(region.health(), ReplicaHealth::OverReplicated { excess: 1 });
    assert!(!region.health().needs_replicas());
}

#[test]
fn test_retarget_down_truncates_tail() {
    let mut region = Region::new(0, 0, 2).unwrap();
    for id in [X, Y, Z] {
        region.add_replica(id);
    }

    let smaller = region.retargeted(0);

    assert_ne!(smaller, region);
    assert_eq!(smaller.desired_f(), 0);
    assert_eq!(smaller.replicas(), &[X]);
    assert_eq!(smaller.prefix(), region.prefix());
    assert_eq!(smaller.mask(), region.mask());
}

#[test]
fn test_retarget_up_keeps_chain() {
    let mut region = Region::new(0, 0, 0).unwrap();
    region.add_replica(X);

    let bigger = region.retargeted(2);

    assert_eq!(bigger.replicas(), &[X]);
    assert_eq!(bigger.replicas_needed(), 2);
}
