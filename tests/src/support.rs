//! Fixtures shared by the integration tests and benchmarks.

use std::sync::Arc;
use std::time::Duration;

use group_com::{Com, GroupConfig, ProcessGroup};
use parking_lot::Mutex;
use shared_bus::{
    EventFilter, EventHandler, EventPublisher, EventSubscriber, InMemoryEventBus, Subscription,
    SubscriptionError,
};
use shared_types::{GroupMessage, ProcessId};

/// Token pacing used by the fixtures: fast, but the ring never spins.
pub const FAST_TOKEN: Duration = Duration::from_millis(1);

/// In-memory bus that remembers where the token was sent.
#[derive(Default)]
pub struct RecordingTransport {
    inner: InMemoryEventBus,
    token_visits: Mutex<Vec<ProcessId>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every token destination so far, in publish order.
    pub fn token_visits(&self) -> Vec<ProcessId> {
        self.token_visits.lock().clone()
    }
}

impl EventPublisher for RecordingTransport {
    fn publish(&self, event: GroupMessage) -> usize {
        if let GroupMessage::Token(token) = &event {
            self.token_visits.lock().push(token.to);
        }
        self.inner.publish(event)
    }

    fn events_published(&self) -> u64 {
        self.inner.events_published()
    }
}

impl EventSubscriber for RecordingTransport {
    fn subscribe(
        &self,
        filter: EventFilter,
        handler: EventHandler,
    ) -> Result<Subscription, SubscriptionError> {
        self.inner.subscribe(filter, handler)
    }
}

/// A full group of `n` members on the in-memory bus.
pub fn full_group(n: u32) -> (ProcessGroup, Vec<Arc<Com>>) {
    let config = GroupConfig::with_process_count(n).token_pass_delay(FAST_TOKEN);
    let group = ProcessGroup::new(config).expect("valid group");
    let members = (0..n)
        .map(|_| Arc::new(Com::join(&group).expect("free slot")))
        .collect();
    (group, members)
}

/// A full group of `n` members whose token traffic is recorded.
pub fn recorded_group(n: u32) -> (ProcessGroup, Vec<Arc<Com>>, Arc<RecordingTransport>) {
    recorded_group_paced(n, FAST_TOKEN)
}

/// Like [`recorded_group`], with each idle holder keeping the token for `pacing`.
pub fn recorded_group_paced(
    n: u32,
    pacing: Duration,
) -> (ProcessGroup, Vec<Arc<Com>>, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let config = GroupConfig::with_process_count(n).token_pass_delay(pacing);
    let group = ProcessGroup::with_transport(config, transport.clone()).expect("valid group");
    let members = (0..n)
        .map(|_| Arc::new(Com::join(&group).expect("free slot")))
        .collect();
    (group, members, transport)
}
