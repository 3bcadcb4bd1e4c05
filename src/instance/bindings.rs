//! Network bindings of an instance

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Immutable network identity used by routing collaborators
///
/// `inver`/`outver` are the epoch of each port binding, bumped by the node
/// when it rebinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceBindings {
    pub addr: IpAddr,
    pub inport: u16,
    pub inver: u16,
    pub outport: u16,
    pub outver: u16,
}

impl InstanceBindings {
    /// True if both bind the same address and incoming port
    pub fn same_endpoint(&self, other: &InstanceBindings) -> bool {
        self.addr == other.addr && self.inport == other.inport
    }
}

impl fmt::Display for InstanceBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}.{}/{}.{}",
            self.addr, self.inport, self.inver, self.outport, self.outver
        )
    }
}
