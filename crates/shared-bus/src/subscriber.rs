//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use std::sync::Weak;

use parking_lot::RwLock;
use shared_types::GroupMessage;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::events::EventFilter;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The dispatcher thread could not be started.
    #[error("Failed to spawn dispatcher thread: {0}")]
    Spawn(String),

    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// Callback invoked on the dispatcher thread for every matching message.
pub type EventHandler = Box<dyn Fn(GroupMessage) + Send + 'static>;

/// Trait for subscribing to events from the bus.
pub trait EventSubscriber: Send + Sync {
    /// Register `handler` for every message matching `filter`.
    ///
    /// Messages are handed to the handler one at a time, in publish order, on
    /// a thread owned by the subscription.
    fn subscribe(
        &self,
        filter: EventFilter,
        handler: EventHandler,
    ) -> Result<Subscription, SubscriptionError>;
}

/// Bus-side record of a live subscription.
pub(crate) struct SubscriberSlot {
    pub(crate) id: u64,
    pub(crate) filter: EventFilter,
    pub(crate) sender: mpsc::UnboundedSender<GroupMessage>,
}

/// A subscription handle.
///
/// When dropped, the subscription is removed from the bus, its channel closes
/// and its dispatcher thread exits after draining what was already queued.
pub struct Subscription {
    id: u64,
    filter: EventFilter,
    slots: Weak<RwLock<Vec<SubscriberSlot>>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, filter: EventFilter, slots: Weak<RwLock<Vec<SubscriberSlot>>>) -> Self {
        Self { id, filter, slots }
    }

    /// Bus-unique id of this subscription.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Whether the bus still routes messages to this subscription.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.slots
            .upgrade()
            .is_some_and(|slots| slots.read().iter().any(|slot| slot.id == self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(slots) = self.slots.upgrade() else {
            return;
        };
        slots.write().retain(|slot| slot.id != self.id);
        debug!(subscription = self.id, kinds = ?self.filter.kinds, "Subscription dropped");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("filter", &self.filter)
            .finish()
    }
}
