//! Topology Module
//!
//! Schema and partition structure of the key space.
//!
//! ## Responsibilities
//! - Immutable schema: [`Space`] and its [`Dimension`]s
//! - Partition structure: [`Subspace`] and its [`Region`]s
//! - Partition validation (total, non-overlapping cover of the hash domain)
//! - Diffing two versions of a space to carry replica sets across repartitions
//!
//! ## Hash Domain
//! ```text
//!  63                                                   0
//! ┌──────────┬────────────────────────────────────────────┐
//! │ prefix   │          free bits (mask = 0)              │
//! └──────────┴────────────────────────────────────────────┘
//!  h belongs to region (prefix, mask)  iff  h & mask == prefix
//! ```
//!
//! Values are hashed to a `u64` by the client library; the hash function
//! itself lives outside this crate.

mod dimension;
mod space;
mod subspace;
mod region;
mod diff;

pub use dimension::{Datatype, Dimension};
pub use space::Space;
pub use subspace::{Subspace, MAX_UNIFORM_BITS};
pub use region::Region;
pub use diff::{diff_subspace, inherit_replicas, RegionChange, SubspaceDiff};
