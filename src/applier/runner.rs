//! Decision applier
//!
//! Owns the cluster state and is the only code path that mutates it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::cluster::ClusterState;
use crate::config::Config;
use crate::decision::{Decision, DecisionSource, LoggedDecision};
use crate::error::{ErrorClass, Result};
use crate::instance::InstanceId;
use crate::reconcile::PlacementPolicy;
use crate::routing::{self, SharedRoutingTable};
use super::{ApplierHandle, Event, Transport};

/// What applying one decision or event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Applied; `config` is the configuration issued because of it, if any
    Applied { config: Option<u64> },

    /// Sequence already applied (log replay)
    Replayed,

    /// Did not fit the current state; logged and skipped
    Skipped,

    /// Duplicate or out-of-date confirmation; dropped
    Stale,
}

/// The single serialized applier
///
/// ## Concurrency Model: Single Writer
///
/// - All state lives in `state`, reachable only through `&mut self`
/// - Delivery threads talk to it through [`ApplierHandle`] (a channel)
/// - Routers read the published [`SharedRoutingTable`]
///
/// Nothing inside needs a lock; the borrow checker is the serialization
/// point.
pub struct Applier {
    state: ClusterState,

    /// Chooses instances for under-replicated regions
    policy: Box<dyn PlacementPolicy>,

    /// Latest routing view, replaced after every state change
    routing: SharedRoutingTable,

    /// Sequence of the last log decision applied (0 = none)
    last_applied: u64,

    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,

    /// Head last handed to the transport per instance, and when
    sent: HashMap<InstanceId, (u64, Instant)>,

    redelivery: Duration,
}

impl Applier {
    // =========================================================================
    // Internal Constants
    // =========================================================================

    /// Longest wait for an event while the log has nothing new
    const IDLE_POLL: Duration = Duration::from_millis(10);

    /// Create an applier with empty state
    pub fn new(config: &Config, policy: Box<dyn PlacementPolicy>) -> Result<Self> {
        config.validate()?;
        let (events_tx, events_rx) = channel::bounded(config.event_queue_capacity);

        Ok(Self {
            state: ClusterState::new(config.pending_warn_threshold),
            policy,
            routing: routing::shared_table(),
            last_applied: 0,
            events_tx,
            events_rx,
            sent: HashMap::new(),
            redelivery: Duration::from_millis(config.redelivery_interval_ms),
        })
    }

    /// Handle for delivery threads
    pub fn handle(&self) -> ApplierHandle {
        ApplierHandle::new(self.events_tx.clone())
    }

    /// Shared routing table, kept current by the applier
    pub fn routing(&self) -> SharedRoutingTable {
        self.routing.clone()
    }

    pub fn state(&self) -> &ClusterState {
        &self.state
    }

    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }

    /// Instances with a configuration handed to the transport
    pub fn in_flight(&self) -> usize {
        self.sent.len()
    }

    // =========================================================================
    // Applying
    // =========================================================================

    /// Apply one logged decision
    ///
    /// Steps:
    /// 1. Skip replays (`seq <= last_applied`)
    /// 2. Mutate state; reconcile and issue a configuration if needed
    /// 3. Advance `last_applied` unless the error was fatal
    /// 4. Publish the routing table
    pub fn apply(&mut self, logged: LoggedDecision) -> Result<ApplyOutcome> {
        if logged.seq <= self.last_applied {
            tracing::debug!(
                "Skipping replayed decision {} ({}), already at {}",
                logged.seq,
                logged.decision.kind(),
                self.last_applied
            );
            return Ok(ApplyOutcome::Replayed);
        }

        let kind = logged.decision.kind();
        let result = self.apply_decision(logged.decision);
        let outcome = self.settle(result, kind)?;
        self.last_applied = logged.seq;

        tracing::debug!("Decision {} ({}) -> {:?}", logged.seq, kind, outcome);
        Ok(outcome)
    }

    /// Apply one delivery-side event
    pub fn handle_event(&mut self, event: Event) -> Result<ApplyOutcome> {
        let decision = match event {
            Event::Ack { id, num } => Decision::ConfigAcked { id, num },
            Event::Reject { id, num } => Decision::ConfigRejected { id, num },
            Event::Shutdown => return Ok(ApplyOutcome::Skipped),
        };
        let kind = decision.kind();
        let result = self.apply_decision(decision);
        self.settle(result, kind)
    }

    /// Sort an apply result into an outcome, or propagate a fatal error
    fn settle(&mut self, result: Result<Option<u64>>, kind: &str) -> Result<ApplyOutcome> {
        match result {
            Ok(config) => {
                // Every topology change issues a configuration
                if config.is_some() {
                    self.publish();
                }
                Ok(ApplyOutcome::Applied { config })
            }
            Err(e) => match e.class() {
                ErrorClass::Protocol => {
                    tracing::debug!("Dropping {}: {}", kind, e);
                    Ok(ApplyOutcome::Stale)
                }
                ErrorClass::Decision => {
                    tracing::warn!("Skipping {} decision: {}", kind, e);
                    Ok(ApplyOutcome::Skipped)
                }
                ErrorClass::Contract | ErrorClass::Environment => {
                    tracing::error!("Applier stopping on {}: {}", kind, e);
                    Err(e)
                }
            },
        }
    }

    /// Mutate state for one decision. Returns the configuration issued.
    fn apply_decision(&mut self, decision: Decision) -> Result<Option<u64>> {
        match decision {
            Decision::RegisterInstance {
                bindings,
                pid,
                token,
            } => {
                let (id, superseded) = self.state.register_instance(bindings, pid, token)?;
                if let Some(old) = superseded {
                    self.sent.remove(&old);
                }
                tracing::info!("Registered {} at {} (pid {})", id, bindings, pid);
                self.reconcile_and_issue(&[]).map(Some)
            }

            Decision::InstanceFailed { id } => {
                if !self.state.fail_instance(id)? {
                    return Ok(None);
                }
                self.sent.remove(&id);
                self.reconcile_and_issue(&[]).map(Some)
            }

            Decision::RemoveInstance { id } => {
                self.state.remove_instance(id)?;
                self.sent.remove(&id);
                tracing::info!("Removed {}", id);
                self.reconcile_and_issue(&[]).map(Some)
            }

            Decision::CreateSpace(spec) => {
                let space = spec.build()?;
                self.state.create_space(space)?;
                self.reconcile_and_issue(&[]).map(Some)
            }

            Decision::Repartition(spec) => {
                let space = spec.build()?;
                self.state.repartition(space)?;
                self.reconcile_and_issue(&[]).map(Some)
            }

            Decision::DropSpace { name } => {
                self.state.drop_space(&name)?;
                tracing::info!("Dropped space '{}'", name);
                self.state.issue_config().map(Some)
            }

            Decision::ChangeReplicationTarget { space, desired_f } => {
                let changed = self.state.change_replication_target(&space, desired_f)?;
                tracing::info!(
                    "Space '{}' now targets desired_f={} ({} regions replaced)",
                    space,
                    desired_f,
                    changed
                );
                if changed == 0 {
                    return Ok(None);
                }
                self.reconcile_and_issue(&[]).map(Some)
            }

            Decision::ConfigAcked { id, num } => {
                self.state.ack_config(id, num)?;
                tracing::debug!("{} acked config {}", id, num);
                Ok(None)
            }

            Decision::ConfigRejected { id, num } => {
                let purged = self.state.reject_config(id, num)?;
                tracing::warn!(
                    "{} rejected config {}, dropped from {} regions",
                    id,
                    num,
                    purged
                );
                if purged == 0 {
                    return Ok(None);
                }
                self.reconcile_and_issue(&[id]).map(Some)
            }
        }
    }

    /// Fill under-replicated regions, then issue the resulting configuration
    fn reconcile_and_issue(&mut self, excluded: &[InstanceId]) -> Result<u64> {
        let report = self.state.reconcile(self.policy.as_ref(), excluded)?;
        if report.changed() {
            tracing::info!(
                "Reconciliation added {} replicas ({} regions still short)",
                report.added,
                report.under_replicated
            );
        }
        self.state.issue_config()
    }

    fn publish(&self) {
        let table = self.state.routing_table();
        *self.routing.write() = table;
    }

    // =========================================================================
    // Delivery
    // =========================================================================

    /// Hand each live instance's head configuration to `transport`
    ///
    /// New heads go out immediately; a head already sent is resent once the
    /// redelivery interval has passed. Returns how many sends were attempted.
    pub fn deliver<T: Transport + ?Sized>(&mut self, transport: &T) -> usize {
        let now = Instant::now();
        let mut attempts = 0;

        for instance in self.state.instances().live() {
            let head = match instance.next_config() {
                Some(head) => head,
                None => continue,
            };

            let due = match self.sent.get(&instance.id()) {
                Some((num, at)) => *num != head.num || now.duration_since(*at) >= self.redelivery,
                None => true,
            };
            if !due {
                continue;
            }

            attempts += 1;
            match transport.deliver(instance.id(), &instance.bindings(), head) {
                Ok(()) => {
                    tracing::trace!("Delivered config {} to {}", head.num, instance.id());
                }
                Err(e) => {
                    tracing::debug!(
                        "Delivery of config {} to {} failed, will retry: {}",
                        head.num,
                        instance.id(),
                        e
                    );
                }
            }
            self.sent.insert(instance.id(), (head.num, now));
        }

        attempts
    }

    // =========================================================================
    // Loops
    // =========================================================================

    /// Apply everything currently available, then return
    ///
    /// Drains queued events before each decision and delivers after each
    /// change. Returns the number of log decisions consumed.
    pub fn run_until_idle<S, T>(&mut self, source: &mut S, transport: &T) -> Result<u64>
    where
        S: DecisionSource + ?Sized,
        T: Transport + ?Sized,
    {
        let mut consumed = 0;
        loop {
            if self.drain_events()? {
                return Ok(consumed);
            }
            match source.next_decision()? {
                Some(logged) => {
                    self.apply(logged)?;
                    consumed += 1;
                    self.deliver(transport);
                }
                None => {
                    self.deliver(transport);
                    return Ok(consumed);
                }
            }
        }
    }

    /// Run until [`Event::Shutdown`] or a fatal error
    pub fn run<S, T>(&mut self, source: &mut S, transport: &T) -> Result<()>
    where
        S: DecisionSource + ?Sized,
        T: Transport + ?Sized,
    {
        tracing::info!("Applier started at seq {}", self.last_applied);

        loop {
            if self.drain_events()? {
                break;
            }

            if let Some(logged) = source.next_decision()? {
                self.apply(logged)?;
                self.deliver(transport);
                continue;
            }

            self.deliver(transport);
            match self.events_rx.recv_timeout(Self::IDLE_POLL) {
                Ok(Event::Shutdown) => break,
                Ok(event) => {
                    self.handle_event(event)?;
                    self.deliver(transport);
                }
                Err(RecvTimeoutError::Timeout) => {}
                // We hold a sender ourselves, so the channel never disconnects
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        tracing::info!("Applier stopped at seq {}", self.last_applied);
        Ok(())
    }

    /// Apply every queued event. Returns true on shutdown.
    fn drain_events(&mut self) -> Result<bool> {
        while let Ok(event) = self.events_rx.try_recv() {
            if event == Event::Shutdown {
                return Ok(true);
            }
            self.handle_event(event)?;
        }
        Ok(false)
    }
}
