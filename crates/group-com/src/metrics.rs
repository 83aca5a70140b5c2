//! Counters for group traffic.
//!
//! One [`GroupMetrics`] is shared by every component of a group. The
//! telemetry crate turns snapshots into Prometheus series.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Thread-safe counters for one group.
#[derive(Debug, Default)]
pub struct GroupMetrics {
    /// Messages published by members (broadcast, directed, acknowledgement)
    pub messages_sent: AtomicU64,
    /// Deposits made by the router (a broadcast counts once per mailbox)
    pub messages_delivered: AtomicU64,
    /// Messages for unregistered recipients
    pub messages_dropped: AtomicU64,
    /// Messages handed to a process and merged into its clock
    pub messages_received: AtomicU64,
    /// Token hops published
    pub token_passes: AtomicU64,
    /// Critical-section entries
    pub critical_section_entries: AtomicU64,
    /// Completed barrier rounds
    pub barrier_rounds: AtomicU64,
}

impl GroupMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a published application or control message
    pub fn record_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` mailbox deposits
    pub fn record_delivered(&self, count: u64) {
        self.messages_delivered.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a message nobody was registered to receive
    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message taken out of a mailbox
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a token hop
    pub fn record_token_pass(&self) {
        self.token_passes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a critical-section entry
    pub fn record_critical_section_entry(&self) {
        self.critical_section_entries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a released barrier round
    pub fn record_barrier_round(&self) {
        self.barrier_rounds.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            token_passes: self.token_passes.load(Ordering::Relaxed),
            critical_section_entries: self.critical_section_entries.load(Ordering::Relaxed),
            barrier_rounds: self.barrier_rounds.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`GroupMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub messages_sent: u64,
    pub messages_delivered: u64,
    pub messages_dropped: u64,
    pub messages_received: u64,
    pub token_passes: u64,
    pub critical_section_entries: u64,
    pub barrier_rounds: u64,
}
