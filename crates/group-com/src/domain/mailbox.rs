//! # Mailbox
//!
//! Per-process FIFO of delivered messages. Any dispatcher thread may deposit;
//! only the owning process consumes. Blocking reads wait on a condition
//! variable, never poll.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use shared_types::{GroupMessage, ProcessId};
use tracing::trace;

use crate::ports::TokenSink;

/// Inbound queue of one process.
pub struct Mailbox {
    owner: ProcessId,
    queue: Mutex<VecDeque<GroupMessage>>,
    available: Condvar,
    token_sink: Option<Arc<dyn TokenSink>>,
}

impl Mailbox {
    /// Plain mailbox: tokens are queued like any other message.
    pub fn new(owner: ProcessId) -> Self {
        Self {
            owner,
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            token_sink: None,
        }
    }

    /// Mailbox that hands every deposited token to `sink` instead of queueing it.
    pub fn with_token_sink(owner: ProcessId, sink: Arc<dyn TokenSink>) -> Self {
        Self {
            token_sink: Some(sink),
            ..Self::new(owner)
        }
    }

    /// Owning process.
    pub fn owner(&self) -> ProcessId {
        self.owner
    }

    /// Append to the tail and wake blocked readers.
    pub fn deposit(&self, message: GroupMessage) {
        let message = match (message, &self.token_sink) {
            (GroupMessage::Token(token), Some(sink)) => {
                sink.on_token(token);
                return;
            }
            (message, _) => message,
        };

        trace!(process_id = self.owner, message = %message, "Deposited");
        self.queue.lock().push_back(message);
        // Readers may be waiting on different predicates.
        self.available.notify_all();
    }

    /// Remove and return the head, if any.
    pub fn try_take(&self) -> Option<GroupMessage> {
        self.queue.lock().pop_front()
    }

    /// Remove and return the head, waiting up to `timeout` for one to arrive.
    pub fn take(&self, timeout: Duration) -> Option<GroupMessage> {
        self.take_where(|_| true, Some(timeout))
    }

    /// Remove and return the first queued message matching `predicate` without
    /// waiting. Every other message keeps its place.
    pub fn try_take_where<P>(&self, predicate: P) -> Option<GroupMessage>
    where
        P: Fn(&GroupMessage) -> bool,
    {
        let mut queue = self.queue.lock();
        remove_first(&mut queue, &predicate)
    }

    /// Remove and return the first queued message matching `predicate`,
    /// waiting until one arrives or `timeout` elapses. `None` waits forever.
    ///
    /// Non-matching messages are never reordered.
    pub fn take_where<P>(&self, predicate: P, timeout: Option<Duration>) -> Option<GroupMessage>
    where
        P: Fn(&GroupMessage) -> bool,
    {
        // An unrepresentable deadline is as good as none.
        let Some(deadline) = timeout.and_then(|t| Instant::now().checked_add(t)) else {
            return Some(self.wait_where(predicate));
        };
        let mut queue = self.queue.lock();

        loop {
            if let Some(message) = remove_first(&mut queue, &predicate) {
                return Some(message);
            }
            if self.available.wait_until(&mut queue, deadline).timed_out() {
                return remove_first(&mut queue, &predicate);
            }
        }
    }

    /// Remove and return the first queued message matching `predicate`,
    /// blocking for as long as it takes.
    pub fn wait_where<P>(&self, predicate: P) -> GroupMessage
    where
        P: Fn(&GroupMessage) -> bool,
    {
        let mut queue = self.queue.lock();
        loop {
            if let Some(message) = remove_first(&mut queue, &predicate) {
                return message;
            }
            self.available.wait(&mut queue);
        }
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

fn remove_first<P>(queue: &mut VecDeque<GroupMessage>, predicate: &P) -> Option<GroupMessage>
where
    P: Fn(&GroupMessage) -> bool,
{
    let position = queue.iter().position(predicate)?;
    queue.remove(position)
}

impl std::fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("owner", &self.owner)
            .field("queued", &self.len())
            .field("intercepts_tokens", &self.token_sink.is_some())
            .finish()
    }
}
