//! Error types for atlascoord
//!
//! Provides a unified error type for all operations.
//!
//! Errors fall into four classes (see [`ErrorClass`]). Only contract
//! violations are fatal; everything else is handled by the caller.

use thiserror::Error;

use crate::instance::InstanceId;

/// Result type alias using CoordError
pub type Result<T> = std::result::Result<T, CoordError>;

/// How a caller is expected to treat an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Coordinator-internal bug. The single-applier ordering was broken;
    /// continuing could send an instance a configuration out of order.
    Contract,

    /// Duplicate or stale confirmation from the network. Ignorable.
    Protocol,

    /// A decision that cannot be applied to the current state. Skipped.
    Decision,

    /// I/O, encoding and configuration failures.
    Environment,
}

/// Unified error type for atlascoord operations
#[derive(Debug, Error)]
pub enum CoordError {
    // -------------------------------------------------------------------------
    // Contract Violations
    // -------------------------------------------------------------------------
    #[error("contract violation: config {num} enqueued for {instance} after config {last}")]
    ConfigOutOfOrder {
        instance: InstanceId,
        num: u64,
        last: u64,
    },

    #[error("contract violation: replica {0} is not a live registered instance")]
    MissingInstance(InstanceId),

    #[error("contract violation: {0} removed while still replicating a region")]
    InstanceStillReferenced(InstanceId),

    // -------------------------------------------------------------------------
    // Protocol-State Violations
    // -------------------------------------------------------------------------
    #[error("{instance} confirmed config {num} with nothing pending")]
    NothingPending { instance: InstanceId, num: u64 },

    #[error("{instance} confirmed config {got}, oldest pending is {expected}")]
    StaleConfirmation {
        instance: InstanceId,
        expected: u64,
        got: u64,
    },

    #[error("{instance} confirmed config {num} but is no longer registered")]
    LateConfirmation { instance: InstanceId, num: u64 },

    // -------------------------------------------------------------------------
    // Decision Errors
    // -------------------------------------------------------------------------
    #[error("unknown instance: {0}")]
    UnknownInstance(InstanceId),

    #[error("instance already registered: {0}")]
    DuplicateInstance(InstanceId),

    #[error("unknown space: {0}")]
    UnknownSpace(String),

    #[error("space already exists: {0}")]
    SpaceExists(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Journal Errors
    // -------------------------------------------------------------------------
    #[error("journal corruption detected: {0}")]
    LogCorruption(String),

    #[error("journal write failed: {0}")]
    LogWrite(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    // -------------------------------------------------------------------------
    // Configuration / Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("applier has stopped")]
    ApplierStopped,

    #[error("applier event queue is full")]
    EventQueueFull,
}

impl CoordError {
    /// Classify this error
    pub fn class(&self) -> ErrorClass {
        match self {
            CoordError::ConfigOutOfOrder { .. }
            | CoordError::MissingInstance(_)
            | CoordError::InstanceStillReferenced(_) => ErrorClass::Contract,

            CoordError::NothingPending { .. }
            | CoordError::StaleConfirmation { .. }
            | CoordError::LateConfirmation { .. } => ErrorClass::Protocol,

            CoordError::UnknownInstance(_)
            | CoordError::DuplicateInstance(_)
            | CoordError::UnknownSpace(_)
            | CoordError::SpaceExists(_)
            | CoordError::InvalidTopology(_) => ErrorClass::Decision,

            CoordError::Io(_)
            | CoordError::LogCorruption(_)
            | CoordError::LogWrite(_)
            | CoordError::Serialization(_)
            | CoordError::Config(_)
            | CoordError::ApplierStopped
            | CoordError::EventQueueFull => ErrorClass::Environment,
        }
    }

    /// True for coordinator bugs that must stop the applier
    pub fn is_contract_violation(&self) -> bool {
        self.class() == ErrorClass::Contract
    }

    /// True for duplicate/stale confirmations the delivery side should drop
    pub fn is_stale_confirmation(&self) -> bool {
        self.class() == ErrorClass::Protocol
    }
}
