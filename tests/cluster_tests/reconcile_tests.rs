//! Tests for reconciliation and placement policies
//!
//! These tests verify:
//! - Under-replicated regions are filled up to desired_f + 1
//! - LeastLoadedPolicy spreads load and breaks ties on id
//! - Proposals naming ineligible, duplicate or excluded ids are dropped
//! - Regions stay under-replicated when there are too few instances

use atlascoord::instance::InstanceId;
use atlascoord::reconcile::{LeastLoadedPolicy, PlacementPolicy, PlacementRequest};
use atlascoord::replica::ReplicaHealth;

use crate::common::{kv_space, new_state, register};

// =============================================================================
// Test Policies
// =============================================================================

/// Always proposes the same list, whatever the request
struct FixedPolicy(Vec<InstanceId>);

impl PlacementPolicy for FixedPolicy {
    fn propose(&self, _request: &PlacementRequest<'_>) -> Vec<InstanceId> {
        self.0.clone()
    }
}

/// Never places anything
struct NoPlacement;

impl PlacementPolicy for NoPlacement {
    fn propose(&self, _request: &PlacementRequest<'_>) -> Vec<InstanceId> {
        Vec::new()
    }
}

// =============================================================================
// LeastLoadedPolicy Tests
// =============================================================================

#[test]
fn test_fills_every_region_to_target() {
    let mut state = new_state();
    state.create_space(kv_space(2, 1)).unwrap();
    for n in 1..=4 {
        register(&mut state, n);
    }

    let report = state.reconcile(&LeastLoadedPolicy, &[]).unwrap();

    assert_eq!(report.added, 8);
    assert_eq!(report.under_replicated, 0);
    assert!(report.changed());
    for region in state.space("kv").unwrap().regions() {
        assert_eq!(region.current_f(), 1);
        assert_eq!(region.health(), ReplicaHealth::Satisfied);
    }
}

#[test]
fn test_load_is_spread_evenly() {
    let mut state = new_state();
    state.create_space(kv_space(2, 0)).unwrap();
    let ids: Vec<_> = (1..=4).map(|n| register(&mut state, n)).collect();

    state.reconcile(&LeastLoadedPolicy, &[]).unwrap();

    // Four single-replica regions over four idle instances: one each, in id order
    let heads: Vec<InstanceId> = state
        .space("kv")
        .unwrap()
        .regions()
        .map(|r| r.replicas()[0])
        .collect();
    assert_eq!(heads, ids);
}

#[test]
fn test_reconcile_is_noop_when_satisfied() {
    let mut state = new_state();
    state.create_space(kv_space(0, 0)).unwrap();
    register(&mut state, 1);

    state.reconcile(&LeastLoadedPolicy, &[]).unwrap();
    let report = state.reconcile(&LeastLoadedPolicy, &[]).unwrap();

    assert!(!report.changed());
    assert_eq!(report.under_replicated, 0);
}

#[test]
fn test_too_few_instances_stays_under_replicated() {
    let mut state = new_state();
    state.create_space(kv_space(0, 2)).unwrap();
    let a = register(&mut state, 1);

    let report = state.reconcile(&LeastLoadedPolicy, &[]).unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(report.under_replicated, 1);
    let region = state.space("kv").unwrap().regions().next().unwrap().clone();
    assert_eq!(region.replicas(), &[a]);
    assert_eq!(region.health(), ReplicaHealth::UnderReplicated { missing: 2 });
}

#[test]
fn test_no_instances_leaves_regions_unassigned() {
    let mut state = new_state();
    state.create_space(kv_space(1, 0)).unwrap();

    let report = state.reconcile(&LeastLoadedPolicy, &[]).unwrap();

    assert_eq!(report.added, 0);
    assert_eq!(report.under_replicated, 2);
    assert!(state
        .space("kv")
        .unwrap()
        .regions()
        .all(|r| r.current_f() == -1 && r.health() == ReplicaHealth::Unassigned));
}

#[test]
fn test_failed_instance_replaced_on_next_pass() {
    let mut state = new_state();
    state.create_space(kv_space(0, 1)).unwrap();
    let a = register(&mut state, 1);
    let b = register(&mut state, 2);
    state.reconcile(&LeastLoadedPolicy, &[]).unwrap();

    state.fail_instance(a).unwrap();
    let c = register(&mut state, 3);
    let report = state.reconcile(&LeastLoadedPolicy, &[]).unwrap();

    assert_eq!(report.added, 1);
    let region = state.space("kv").unwrap().regions().next().unwrap().clone();
    assert_eq!(region.replicas(), &[b, c]);
}

// =============================================================================
// Proposal Filtering Tests
// =============================================================================

#[test]
fn test_excluded_instance_is_not_placed() {
    let mut state = new_state();
    state.create_space(kv_space(0, 0)).unwrap();
    let a = register(&mut state, 1);
    let b = register(&mut state, 2);

    state.reconcile(&LeastLoadedPolicy, &[a]).unwrap();

    let region = state.space("kv").unwrap().regions().next().unwrap().clone();
    assert_eq!(region.replicas(), &[b]);
}

#[test]
fn test_ineligible_proposals_are_dropped() {
    let mut state = new_state();
    state.create_space(kv_space(0, 2)).unwrap();
    let a = register(&mut state, 1);
    let dead = register(&mut state, 2);
    state.fail_instance(dead).unwrap();

    let policy = FixedPolicy(vec![InstanceId(999), dead, a, a]);
    let report = state.reconcile(&policy, &[]).unwrap();

    assert_eq!(report.added, 1);
    let region = state.space("kv").unwrap().regions().next().unwrap().clone();
    assert_eq!(region.replicas(), &[a]);
}

#[test]
fn test_surplus_proposals_are_capped() {
    let mut state = new_state();
    state.create_space(kv_space(0, 0)).unwrap();
    let ids: Vec<_> = (1..=3).map(|n| register(&mut state, n)).collect();

    let report = state.reconcile(&FixedPolicy(ids.clone()), &[]).unwrap();

    assert_eq!(report.added, 1);
    let region = state.space("kv").unwrap().regions().next().unwrap().clone();
    assert_eq!(region.replicas(), &ids[..1]);
}

#[test]
fn test_empty_proposal_is_allowed() {
    let mut state = new_state();
    state.create_space(kv_space(1, 0)).unwrap();
    register(&mut state, 1);

    let report = state.reconcile(&NoPlacement, &[]).unwrap();

    assert_eq!(report.added, 0);
    assert_eq!(report.under_replicated, 2);
}
