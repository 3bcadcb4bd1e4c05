//! Instance record and its pending configuration queue

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::{CoordError, Result};
use super::{InstanceBindings, InstanceId, InstanceStatus};

/// A configuration waiting for the instance to confirm it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfig {
    /// Configuration number (strictly increasing per instance)
    pub num: u64,

    /// Encoded configuration, opaque to the protocol
    pub data: Bytes,
}

/// One storage-node process incarnation as seen by the coordinator
///
/// ## Concurrency
/// No internal locking. Every mutation goes through the applier, which
/// holds the registry by `&mut`.
#[derive(Debug, Clone)]
pub struct Instance {
    bindings: InstanceBindings,
    pid: u32,
    token: u64,
    status: InstanceStatus,

    /// Unconfirmed configurations, oldest first
    pending: VecDeque<PendingConfig>,

    last_acked: u64,
    last_rejected: u64,
}

impl Instance {
    /// Create a live instance with an empty queue
    pub fn new(bindings: InstanceBindings, pid: u32, token: u64) -> Self {
        Self {
            bindings,
            pid,
            token,
            status: InstanceStatus::Live,
            pending: VecDeque::new(),
            last_acked: 0,
            last_rejected: 0,
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn id(&self) -> InstanceId {
        InstanceId(self.token)
    }

    /// Network identity for routing
    pub fn bindings(&self) -> InstanceBindings {
        self.bindings
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn status(&self) -> InstanceStatus {
        self.status
    }

    pub fn is_live(&self) -> bool {
        self.status == InstanceStatus::Live
    }

    pub(crate) fn mark_failed(&mut self) {
        self.status = InstanceStatus::Failed;
    }

    // =========================================================================
    // Config Protocol
    // =========================================================================

    /// Enqueue configuration `num` at the tail
    ///
    /// `num` must exceed every number enqueued so far. Anything else means two
    /// writers assigned numbers, and is a contract violation.
    pub fn add_config(&mut self, num: u64, data: Bytes) -> Result<()> {
        if let Some(tail) = self.pending.back() {
            if num <= tail.num {
                let err = CoordError::ConfigOutOfOrder {
                    instance: self.id(),
                    num,
                    last: tail.num,
                };
                tracing::error!("coordinator bug: {}", err);
                return Err(err);
            }
        }
        self.pending.push_back(PendingConfig { num, data });
        Ok(())
    }

    /// Oldest unconfirmed configuration, if any
    pub fn next_config(&self) -> Option<&PendingConfig> {
        self.pending.front()
    }

    /// Confirm that the instance applied configuration `num`
    pub fn ack_config(&mut self, num: u64) -> Result<()> {
        self.pop_head(num)?;
        self.last_acked = num;
        Ok(())
    }

    /// Record that the instance could not apply configuration `num`
    pub fn reject_config(&mut self, num: u64) -> Result<()> {
        self.pop_head(num)?;
        self.last_rejected = num;
        Ok(())
    }

    /// Remove the head iff it is `num`; leaves the queue untouched otherwise
    fn pop_head(&mut self, num: u64) -> Result<()> {
        let head = match self.pending.front() {
            Some(head) => head.num,
            None => {
                return Err(CoordError::NothingPending {
                    instance: self.id(),
                    num,
                })
            }
        };
        if head != num {
            return Err(CoordError::StaleConfirmation {
                instance: self.id(),
                expected: head,
                got: num,
            });
        }
        self.pending.pop_front();
        Ok(())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pending configurations, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &PendingConfig> {
        self.pending.iter()
    }

    pub fn last_acked(&self) -> u64 {
        self.last_acked
    }

    pub fn last_rejected(&self) -> u64 {
        self.last_rejected
    }
}
