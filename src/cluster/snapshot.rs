//! Configuration snapshots
//!
//! What an instance receives: the full topology at one configuration number.
//! The encoding is private to coordinator and storage nodes; the ack protocol
//! treats it as opaque bytes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::instance::{InstanceBindings, InstanceId};
use crate::topology::Space;

/// Topology as of configuration `version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub version: u64,
    pub spaces: Vec<Space>,

    /// Live instances and where to reach them
    pub instances: Vec<(InstanceId, InstanceBindings)>,
}

impl ConfigSnapshot {
    pub fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(bincode::serialize(self)?))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Bindings of an instance named in this snapshot
    pub fn bindings_of(&self, id: InstanceId) -> Option<InstanceBindings> {
        self.instances
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, b)| *b)
    }
}
