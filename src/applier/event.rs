//! Delivery-side events

use crossbeam::channel::{Sender, TrySendError};

use crate::error::{CoordError, Result};
use crate::instance::InstanceId;

/// Something the delivery subsystem reports to the applier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Instance applied configuration `num`
    Ack { id: InstanceId, num: u64 },

    /// Instance could not apply configuration `num`
    Reject { id: InstanceId, num: u64 },

    /// Stop the apply loop after draining earlier events
    Shutdown,
}

/// Cloneable sender for delivery threads
///
/// Sending never touches cluster state; the applier picks events up before
/// its next log decision.
///
/// Sends never block. A transport may report from inside
/// [`super::Transport::deliver`], which runs on the applier thread, so a
/// blocking send into a full queue would wait on itself. A full queue yields
/// [`CoordError::EventQueueFull`]; the report can be dropped, since the
/// configuration stays queued and is redelivered.
#[derive(Debug, Clone)]
pub struct ApplierHandle {
    tx: Sender<Event>,
}

impl ApplierHandle {
    pub(crate) fn new(tx: Sender<Event>) -> Self {
        Self { tx }
    }

    /// Report that `id` applied configuration `num`
    pub fn report_ack(&self, id: InstanceId, num: u64) -> Result<()> {
        self.send(Event::Ack { id, num })
    }

    /// Report that `id` could not apply configuration `num`
    pub fn report_reject(&self, id: InstanceId, num: u64) -> Result<()> {
        self.send(Event::Reject { id, num })
    }

    /// Ask the apply loop to stop
    pub fn shutdown(&self) -> Result<()> {
        self.send(Event::Shutdown)
    }

    fn send(&self, event: Event) -> Result<()> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => CoordError::EventQueueFull,
            TrySendError::Disconnected(_) => CoordError::ApplierStopped,
        })
    }
}
