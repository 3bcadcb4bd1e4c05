//! Delivery transport interface

use crate::error::Result;
use crate::instance::{InstanceBindings, InstanceId, PendingConfig};

/// Pushes a configuration to an instance
///
/// Called with the head of the instance's queue, possibly many times for the
/// same entry. Delivery must be idempotent on the receiving side; the outcome
/// comes back through [`super::ApplierHandle`], not through the return value.
/// An error only means "try again at the next redelivery"; that includes
/// [`crate::CoordError::EventQueueFull`] from a report made inside `deliver`.
pub trait Transport {
    fn deliver(
        &self,
        id: InstanceId,
        bindings: &InstanceBindings,
        config: &PendingConfig,
    ) -> Result<()>;
}
