//! Cluster Module
//!
//! The coordinator's whole mutable state and the operations decisions map to.
//!
//! ## Ownership
//! [`ClusterState`] has no interior mutability. The applier owns it and
//! mutates it through `&mut self`, one decision at a time; that exclusive
//! borrow is what keeps configuration numbers ordered.
//!
//! ## Ordering Rules
//! - a failed or removed instance is purged from every region before the
//!   next configuration is issued
//! - configuration numbers come from one counter and only grow
//! - every live instance receives every issued configuration

mod state;
mod snapshot;

pub use state::ClusterState;
pub use snapshot::ConfigSnapshot;
