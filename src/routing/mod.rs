//! Routing Module
//!
//! Read-only view of the topology for request routing.
//!
//! ## Responsibilities
//! - Map `(space, subspace, hash)` to the region responsible for it
//! - Expose each region's replica chain as network bindings
//! - Share the latest table between the applier (writer) and any number of
//!   routing threads (readers)
//!
//! ## Concurrency
//! The applier replaces the whole table under a short `parking_lot` write
//! lock after each state change. Readers clone what they need under the read
//! lock and never see a half-built table.

mod table;

pub use table::{RegionRoute, RoutingTable, SubspaceRoute};

use std::sync::Arc;

use parking_lot::RwLock;

/// Routing table shared between the applier and readers
pub type SharedRoutingTable = Arc<RwLock<RoutingTable>>;

/// An empty shared table (version 0)
pub fn shared_table() -> SharedRoutingTable {
    Arc::new(RwLock::new(RoutingTable::default()))
}
