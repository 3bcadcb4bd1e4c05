//! Decision log interface

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::Decision;

/// A decision with its position in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedDecision {
    /// Log sequence number, strictly increasing
    pub seq: u64,

    pub decision: Decision,
}

/// An ordered, durable stream of decisions
///
/// Implementations yield each decision in increasing `seq` order. After a
/// crash they may replay decisions the applier already saw; the applier
/// skips those by sequence number.
pub trait DecisionSource {
    /// Next decision, or `None` if none is ready yet
    fn next_decision(&mut self) -> Result<Option<LoggedDecision>>;
}

/// In-memory decision log
///
/// Sequence numbers start at 1.
#[derive(Debug)]
pub struct MemoryDecisionLog {
    queue: VecDeque<LoggedDecision>,
    next_seq: u64,
}

impl MemoryDecisionLog {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_seq: 1,
        }
    }

    /// Append a decision, returning its sequence number
    pub fn append(&mut self, decision: Decision) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push_back(LoggedDecision { seq, decision });
        seq
    }

    /// Re-deliver an already numbered decision (crash replay)
    pub fn replay(&mut self, logged: LoggedDecision) {
        self.next_seq = self.next_seq.max(logged.seq + 1);
        self.queue.push_back(logged);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for MemoryDecisionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionSource for MemoryDecisionLog {
    fn next_decision(&mut self) -> Result<Option<LoggedDecision>> {
        Ok(self.queue.pop_front())
    }
}
