//! # atlascoord
//!
//! Topology and configuration-distribution core of a coordinator for a
//! partitioned key-value store:
//! - Spaces, subspaces and regions partitioning a hashed key space
//! - Replica sets with fault-tolerance targets, kept full by a placement policy
//! - Strictly ordered, acknowledged configuration delivery per instance
//! - A single serialized applier driven by an ordered decision log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Decision Log (ordered)                       │
//! │           register / fail / repartition / ...                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one at a time
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Applier                                 │◄── ack / reject
//! │                  (single writer)                             │    (ApplierHandle)
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Topology   │          │  Instances  │
//!   │  + replicas │          │ (pending q) │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Routing   │          │  Transport  │
//!   │    Table    │          │ (delivery)  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod topology;
pub mod replica;
pub mod instance;
pub mod reconcile;
pub mod routing;
pub mod cluster;
pub mod decision;
pub mod journal;
pub mod applier;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CoordError, ErrorClass, Result};
pub use config::Config;
pub use applier::{Applier, ApplierHandle};
pub use cluster::ClusterState;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of atlascoord
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
