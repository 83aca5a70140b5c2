//! # Outbound Ports
//!
//! What the middleware needs from its surroundings.

use shared_types::TokenMessage;

pub use shared_bus::Transport;

/// Receiver of the tokens a mailbox intercepts.
///
/// Called on the transport's dispatcher thread, before any payload message
/// deposited later reaches the owning process.
pub trait TokenSink: Send + Sync {
    /// Take possession of a token addressed to this process.
    fn on_token(&self, token: TokenMessage);
}
