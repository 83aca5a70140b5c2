//! # Inbound Ports
//!
//! API trait the business logic of a process is written against.

use std::time::Duration;

use shared_types::{GroupMessage, Payload, ProcessId, Timestamp};

use crate::domain::{BarrierArrival, ComError};

/// Group communication API - inbound port.
///
/// Every send ticks the local clock and stamps the message with the new value;
/// every message handed out has already been merged into the clock.
pub trait GroupCommunication: Send + Sync {
    /// Id of this process.
    fn id(&self) -> ProcessId;

    /// Display name of this process.
    fn name(&self) -> &str;

    /// Number of processes in the group.
    fn group_size(&self) -> u32;

    /// Snapshot of the local Lamport clock.
    fn clock(&self) -> Timestamp;

    /// Record a local event: tick the clock and return the new value.
    fn local_event(&self) -> Timestamp;

    /// Send `payload` to every process, this one included.
    fn broadcast(&self, payload: &str) -> Timestamp;

    /// Send `payload` to `target` only.
    fn send_to(&self, payload: &str, target: ProcessId) -> Result<Timestamp, ComError>;

    /// Next application message, if one is queued.
    fn get_message(&self) -> Option<GroupMessage>;

    /// Next application message, waiting up to `timeout`.
    fn wait_for_message(&self, timeout: Duration) -> Option<GroupMessage>;

    /// Block until the token is held, then enter the critical section.
    fn request_critical_section(&self) -> Result<(), ComError>;

    /// Leave the critical section and pass the token on.
    fn release_critical_section(&self) -> Result<(), ComError>;

    /// Rendezvous with every other member of the group.
    fn synchronize(&self) -> BarrierArrival;

    /// Group-wide synchronous broadcast of `payload` by `origin`.
    ///
    /// Every member calls this with the same arguments; all return the payload
    /// once every member has seen it.
    fn broadcast_sync(&self, payload: &str, origin: ProcessId) -> Result<Payload, ComError>;

    /// Send `payload` to `target` and block until it confirms receipt.
    fn send_to_sync(&self, payload: &str, target: ProcessId) -> Result<(), ComError>;

    /// Block until `source` sends synchronously, confirm receipt and return the payload.
    fn receive_from_sync(&self, source: ProcessId) -> Result<Payload, ComError>;
}
