//! # Group Messages
//!
//! The tagged records that travel on the shared bus.
//!
//! | Variant     | Addressed to               | Carries payload |
//! |-------------|----------------------------|-----------------|
//! | `Broadcast` | every registered mailbox   | yes             |
//! | `Directed`  | one recipient              | yes             |
//! | `Token`     | the holder's ring successor | no             |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::{MessageId, Payload, ProcessId, Timestamp};

/// Discriminant used by subscribers to pick the messages they handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Group-wide message.
    Broadcast,
    /// Single-recipient message.
    Directed,
    /// The critical-section token.
    Token,
}

impl MessageKind {
    /// All kinds, in routing order.
    pub const ALL: [MessageKind; 3] = [Self::Broadcast, Self::Directed, Self::Token];

    /// Lowercase label used in logs and metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broadcast => "broadcast",
            Self::Directed => "directed",
            Self::Token => "token",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the sender expects the message to be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Fire-and-forget.
    #[default]
    Async,
    /// Part of a synchronous send; the receiver rendezvouses with the sender.
    Synchronous,
    /// Receipt confirmation for a synchronous send. Middleware control traffic.
    Acknowledgement,
}

/// A message delivered to every mailbox, the sender's included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub id: MessageId,
    pub timestamp: Timestamp,
    pub sender: ProcessId,
    pub mode: DeliveryMode,
    pub payload: Payload,
}

/// A message delivered to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectedMessage {
    pub id: MessageId,
    pub timestamp: Timestamp,
    pub sender: ProcessId,
    pub recipient: ProcessId,
    pub mode: DeliveryMode,
    pub payload: Payload,
}

/// The critical-section token on its way from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMessage {
    pub id: MessageId,
    pub timestamp: Timestamp,
    pub from: ProcessId,
    pub to: ProcessId,
}

/// Every record that can be published on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupMessage {
    Broadcast(BroadcastMessage),
    Directed(DirectedMessage),
    Token(TokenMessage),
}

impl GroupMessage {
    /// Build a broadcast.
    #[must_use]
    pub fn broadcast(
        timestamp: Timestamp,
        sender: ProcessId,
        mode: DeliveryMode,
        payload: impl Into<Payload>,
    ) -> Self {
        Self::Broadcast(BroadcastMessage {
            id: MessageId::new(),
            timestamp,
            sender,
            mode,
            payload: payload.into(),
        })
    }

    /// Build a directed message.
    #[must_use]
    pub fn directed(
        timestamp: Timestamp,
        sender: ProcessId,
        recipient: ProcessId,
        mode: DeliveryMode,
        payload: impl Into<Payload>,
    ) -> Self {
        Self::Directed(DirectedMessage {
            id: MessageId::new(),
            timestamp,
            sender,
            recipient,
            mode,
            payload: payload.into(),
        })
    }

    /// Build the acknowledgement of a synchronous directed message.
    #[must_use]
    pub fn acknowledgement(timestamp: Timestamp, sender: ProcessId, recipient: ProcessId) -> Self {
        Self::directed(timestamp, sender, recipient, DeliveryMode::Acknowledgement, "")
    }

    /// Build a token hop.
    #[must_use]
    pub fn token(timestamp: Timestamp, from: ProcessId, to: ProcessId) -> Self {
        Self::Token(TokenMessage {
            id: MessageId::new(),
            timestamp,
            from,
            to,
        })
    }

    /// Get the kind of this message (for filtering).
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Broadcast(_) => MessageKind::Broadcast,
            Self::Directed(_) => MessageKind::Directed,
            Self::Token(_) => MessageKind::Token,
        }
    }

    #[must_use]
    pub fn id(&self) -> MessageId {
        match self {
            Self::Broadcast(m) => m.id,
            Self::Directed(m) => m.id,
            Self::Token(m) => m.id,
        }
    }

    /// Lamport timestamp stamped by the sender.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Broadcast(m) => m.timestamp,
            Self::Directed(m) => m.timestamp,
            Self::Token(m) => m.timestamp,
        }
    }

    /// The originating process.
    #[must_use]
    pub fn sender(&self) -> ProcessId {
        match self {
            Self::Broadcast(m) => m.sender,
            Self::Directed(m) => m.sender,
            Self::Token(m) => m.from,
        }
    }

    /// The single addressee, `None` for broadcasts.
    #[must_use]
    pub fn recipient(&self) -> Option<ProcessId> {
        match self {
            Self::Broadcast(_) => None,
            Self::Directed(m) => Some(m.recipient),
            Self::Token(m) => Some(m.to),
        }
    }

    /// Message content, `None` for the token.
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Broadcast(m) => Some(&m.payload),
            Self::Directed(m) => Some(&m.payload),
            Self::Token(_) => None,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Option<DeliveryMode> {
        match self {
            Self::Broadcast(m) => Some(m.mode),
            Self::Directed(m) => Some(m.mode),
            Self::Token(_) => None,
        }
    }

    /// True for messages plain reads may hand out: asynchronous broadcasts and
    /// directed messages. Synchronous traffic belongs to the rendezvous
    /// helpers; the token and acknowledgements are middleware control traffic.
    #[must_use]
    pub fn is_application(&self) -> bool {
        self.mode() == Some(DeliveryMode::Async)
    }
}

impl fmt::Display for GroupMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast(m) => write!(f, "broadcast[P{} @{}] {}", m.sender, m.timestamp, m.payload),
            Self::Directed(m) => write!(
                f,
                "directed[P{}->P{} @{}] {}",
                m.sender, m.recipient, m.timestamp, m.payload
            ),
            Self::Token(m) => write!(f, "token[P{}->P{} @{}]", m.from, m.to, m.timestamp),
        }
    }
}
