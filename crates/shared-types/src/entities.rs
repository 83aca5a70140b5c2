//! # Core Entities
//!
//! Identities and scalar types shared by every crate in the workspace.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a process inside its group.
///
/// Assigned consecutively from 0 at construction time and never reused while
/// the process is alive.
pub type ProcessId = u32;

/// A Lamport timestamp.
pub type Timestamp = u64;

/// Immutable message content, shared by reference between mailboxes.
pub type Payload = Arc<str>;

/// Unique identifier of a single published message.
///
/// A broadcast keeps the same id in every mailbox it lands in, which makes
/// duplicate delivery observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ring successor of `id` in a group of `group_size` processes.
///
/// # Panics
///
/// Panics if `group_size` is zero.
#[must_use]
pub fn ring_successor(id: ProcessId, group_size: u32) -> ProcessId {
    assert!(group_size > 0, "group size must be at least 1");
    (id + 1) % group_size
}

/// Default display name of a process (`P0`, `P1`, ...).
#[must_use]
pub fn default_process_name(prefix: &str, id: ProcessId) -> String {
    format!("{prefix}{id}")
}
