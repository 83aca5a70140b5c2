//! # Domain Errors
//!
//! Error types for the group middleware.

use shared_bus::SubscriptionError;
use shared_types::ProcessId;
use thiserror::Error;

/// Errors surfaced by the middleware facade.
///
/// Timeouts are not errors: a read that expires returns `None`. Messages for
/// unregistered recipients are dropped by the router and never reach here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComError {
    /// More members tried to join than the group size allows.
    #[error("Group is full: id {id} does not fit a group of {size}")]
    GroupFull {
        /// Id the allocator handed out
        id: ProcessId,
        /// Configured group size
        size: u32,
    },

    /// Target or source id outside `0..N`.
    #[error("Unknown process: P{0}")]
    UnknownProcess(ProcessId),

    /// A synchronous exchange addressed to the caller itself.
    #[error("Process P{0} cannot rendezvous with itself")]
    SelfRendezvous(ProcessId),

    /// Invalid critical-section state transition.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state
        from: String,
        /// Attempted state
        to: String,
    },

    /// A critical-section request is already pending or granted.
    #[error("Critical section already requested")]
    AlreadyRequested,

    /// A protocol invariant did not hold.
    #[error("Invariant violated: {0}")]
    InvariantViolated(String),

    /// Invalid group configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The transport refused a subscription.
    #[error("Transport error: {0}")]
    Transport(#[from] SubscriptionError),
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A group needs at least one member.
    #[error("Invalid group size: {0} (must be at least 1)")]
    InvalidGroupSize(u32),

    /// An environment variable could not be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },
}
