//! # Event Filtering
//!
//! Subscribers register for a subset of the messages on the bus. Every
//! subscription gets its own dispatcher, so kinds whose relative order matters
//! must share one filter.

use shared_types::{GroupMessage, MessageKind, ProcessId};

/// Filter for subscribing to specific messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<MessageKind>,
    /// Senders to include. Empty means all senders.
    pub senders: Vec<ProcessId>,
}

impl EventFilter {
    /// Create a filter that accepts every message.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for a single kind.
    #[must_use]
    pub fn kind(kind: MessageKind) -> Self {
        Self::kinds(vec![kind])
    }

    /// Create a filter for specific kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<MessageKind>) -> Self {
        Self {
            kinds,
            senders: Vec::new(),
        }
    }

    /// Create a filter for messages from specific processes.
    #[must_use]
    pub fn from_senders(senders: Vec<ProcessId>) -> Self {
        Self {
            kinds: Vec::new(),
            senders,
        }
    }

    /// Check if a message matches this filter.
    #[must_use]
    pub fn matches(&self, event: &GroupMessage) -> bool {
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&event.kind());
        let sender_match = self.senders.is_empty() || self.senders.contains(&event.sender());
        kind_match && sender_match
    }
}
