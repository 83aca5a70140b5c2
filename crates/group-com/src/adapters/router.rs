//! # Message Router
//!
//! Bridges the transport to the mailboxes of one group through two
//! subscriptions:
//!
//! - **payload**: broadcast and directed messages share one dispatcher, so
//!   everything a sender publishes reaches a mailbox in publish order
//! - **control**: the token has its own dispatcher, so pacing the token never
//!   holds up payload delivery

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use shared_bus::{EventFilter, EventSubscriber, Subscription, SubscriptionError};
use shared_types::{GroupMessage, MessageKind, ProcessId};
use tracing::{debug, trace};

use crate::domain::Mailbox;
use crate::metrics::GroupMetrics;

/// Message kinds carried by one router subscription.
const CHANNELS: [&[MessageKind]; 2] = [
    &[MessageKind::Broadcast, MessageKind::Directed],
    &[MessageKind::Token],
];

/// Delivers transport events into registered mailboxes.
pub struct MessageRouter {
    mailboxes: RwLock<HashMap<ProcessId, Arc<Mailbox>>>,
    subscriptions: Mutex<Vec<Subscription>>,
    metrics: Arc<GroupMetrics>,
}

impl MessageRouter {
    /// Create a router and subscribe it to every message on `transport`.
    ///
    /// Handlers hold the router weakly: dropping the last `Arc` detaches it.
    pub fn attach<S>(transport: &S, metrics: Arc<GroupMetrics>) -> Result<Arc<Self>, SubscriptionError>
    where
        S: EventSubscriber + ?Sized,
    {
        let router = Arc::new(Self {
            mailboxes: RwLock::new(HashMap::new()),
            subscriptions: Mutex::new(Vec::new()),
            metrics,
        });

        let mut subscriptions = Vec::with_capacity(CHANNELS.len());
        for kinds in CHANNELS {
            let weak: Weak<Self> = Arc::downgrade(&router);
            let subscription = transport.subscribe(
                EventFilter::kinds(kinds.to_vec()),
                Box::new(move |event| {
                    if let Some(router) = weak.upgrade() {
                        router.route(event);
                    }
                }),
            )?;
            subscriptions.push(subscription);
        }
        *router.subscriptions.lock() = subscriptions;

        debug!("Message router attached");
        Ok(router)
    }

    /// Make `mailbox` reachable under `id`, replacing any previous one.
    pub fn register_mailbox(&self, id: ProcessId, mailbox: Arc<Mailbox>) {
        self.mailboxes.write().insert(id, mailbox);
        debug!(process_id = id, "Mailbox registered");
    }

    /// Stop delivering to `id`. Later messages for it are dropped.
    pub fn unregister_mailbox(&self, id: ProcessId) {
        if self.mailboxes.write().remove(&id).is_some() {
            debug!(process_id = id, "Mailbox unregistered");
        }
    }

    /// Ids with a registered mailbox, ascending.
    pub fn registered_processes(&self) -> Vec<ProcessId> {
        let mut ids: Vec<_> = self.mailboxes.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Whether the router still listens on the transport.
    pub fn is_attached(&self) -> bool {
        !self.subscriptions.lock().is_empty()
    }

    /// Detach from the transport. Registered mailboxes stay registered but
    /// receive nothing more.
    pub fn shutdown(&self) {
        let dropped = std::mem::take(&mut *self.subscriptions.lock());
        if !dropped.is_empty() {
            debug!(subscriptions = dropped.len(), "Message router detached");
        }
    }

    /// Deposit `event` into the mailbox(es) it is addressed to.
    pub fn route(&self, event: GroupMessage) {
        match event.recipient() {
            None => self.deliver_to_all(event),
            Some(recipient) => self.deliver_to(recipient, event),
        }
    }

    fn deliver_to_all(&self, event: GroupMessage) {
        // Deposit outside the lock: registration must not wait on delivery.
        let targets: Vec<Arc<Mailbox>> = self.mailboxes.read().values().cloned().collect();
        trace!(sender = event.sender(), recipients = targets.len(), "Broadcast fan-out");
        for mailbox in &targets {
            mailbox.deposit(event.clone());
        }
        self.metrics.record_delivered(targets.len() as u64);
    }

    fn deliver_to(&self, recipient: ProcessId, event: GroupMessage) {
        let target = self.mailboxes.read().get(&recipient).cloned();
        match target {
            Some(mailbox) => {
                mailbox.deposit(event);
                self.metrics.record_delivered(1);
            }
            None => {
                debug!(
                    recipient,
                    sender = event.sender(),
                    kind = %event.kind(),
                    "Dropping message for unregistered process"
                );
                self.metrics.record_dropped();
            }
        }
    }
}

impl std::fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRouter")
            .field("registered", &self.registered_processes())
            .field("attached", &self.is_attached())
            .finish()
    }
}
