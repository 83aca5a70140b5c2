//! # Event Publisher
//!
//! Defines the publishing side of the event bus and the in-memory bus itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::RwLock;
use shared_types::GroupMessage;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::events::EventFilter;
use crate::subscriber::{
    EventHandler, EventSubscriber, SubscriberSlot, Subscription, SubscriptionError,
};
use crate::DISPATCHER_THREAD_PREFIX;

/// Trait for publishing events to the bus.
///
/// This is the interface processes use to emit messages for consumption by
/// the rest of the group.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of subscriptions the event was queued for.
    fn publish(&self, event: GroupMessage) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Each subscription owns an unbounded `tokio::sync::mpsc` channel drained by
/// its own dispatcher thread. Publishing never blocks and never drops a
/// message for a live subscription.
pub struct InMemoryEventBus {
    /// Live subscriptions, in registration order.
    slots: Arc<RwLock<Vec<SubscriberSlot>>>,

    /// Id handed to the next subscription.
    next_subscription_id: AtomicU64,

    /// Total events published.
    events_published: AtomicU64,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(RwLock::new(Vec::new())),
            next_subscription_id: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
        }
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.slots.read().len()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, event: GroupMessage) -> usize {
        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let kind = event.kind();
        let sender = event.sender();
        let slots = self.slots.read();
        let mut receivers = 0;

        for slot in slots.iter().filter(|slot| slot.filter.matches(&event)) {
            // A closed channel means the dispatcher died; its Subscription
            // will clear the slot when dropped.
            if slot.sender.send(event.clone()).is_ok() {
                receivers += 1;
            }
        }

        if receivers == 0 {
            warn!(kind = %kind, sender, "Event dropped (no receivers)");
        } else {
            trace!(kind = %kind, sender, receivers, "Event published");
        }
        receivers
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(
        &self,
        filter: EventFilter,
        handler: EventHandler,
    ) -> Result<Subscription, SubscriptionError> {
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        let (sender, mut receiver) = mpsc::unbounded_channel::<GroupMessage>();

        thread::Builder::new()
            .name(format!("{DISPATCHER_THREAD_PREFIX}-{id}"))
            .spawn(move || {
                while let Some(event) = receiver.blocking_recv() {
                    handler(event);
                }
            })
            .map_err(|e| SubscriptionError::Spawn(e.to_string()))?;

        self.slots.write().push(SubscriberSlot {
            id,
            filter: filter.clone(),
            sender,
        });

        debug!(subscription = id, kinds = ?filter.kinds, "New subscription created");

        Ok(Subscription::new(id, filter, Arc::downgrade(&self.slots)))
    }
}
