//! Reconcile Module
//!
//! Brings regions back to their fault-tolerance target.
//!
//! ## Contract
//! - every region with `current_f < desired_f` is offered to the
//!   [`PlacementPolicy`] for more replicas
//! - proposals are filtered before use: ids that are not eligible candidates,
//!   already replicate the region, or repeat are dropped
//! - failed instances are purged from regions by the caller before
//!   reconciliation runs, and are never candidates
//!
//! Which instances to pick is policy. The core only enforces the arithmetic.

mod policy;
mod reconciler;

pub use policy::{Candidate, LeastLoadedPolicy, PlacementPolicy, PlacementRequest};
pub use reconciler::{add_checked_replica, reconcile, ReconcileReport};
