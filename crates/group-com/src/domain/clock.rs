//! # Lamport Clock
//!
//! One per process. `tick` stamps local events and outgoing messages,
//! `observe` merges the timestamp of a received message.

use parking_lot::Mutex;
use shared_types::Timestamp;

/// Thread-safe Lamport counter.
#[derive(Debug, Default)]
pub struct LogicalClock {
    value: Mutex<Timestamp>,
}

impl LogicalClock {
    /// Create a clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by one and return the new value.
    pub fn tick(&self) -> Timestamp {
        let mut value = self.value.lock();
        *value += 1;
        *value
    }

    /// Merge a remote timestamp: `value = max(value, remote) + 1`.
    ///
    /// Returns `(previous, new)`.
    pub fn observe(&self, remote: Timestamp) -> (Timestamp, Timestamp) {
        let mut value = self.value.lock();
        let previous = *value;
        *value = previous.max(remote) + 1;
        (previous, *value)
    }

    /// Snapshot of the current value.
    pub fn value(&self) -> Timestamp {
        *self.value.lock()
    }
}
