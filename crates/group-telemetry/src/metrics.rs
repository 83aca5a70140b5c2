//! Prometheus metrics for process-group runs.
//!
//! All metrics follow the naming convention: `pg_<area>_<metric>_<unit>`
//!
//! The middleware keeps its own lock-free [`GroupMetrics`]; these series are
//! brought up to date from a snapshot with [`record_snapshot`].
//!
//! [`GroupMetrics`]: group_com::GroupMetrics

use group_com::MetricsSnapshot;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry of this crate
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MESSAGING
    // =========================================================================

    /// Messages published by members
    pub static ref MESSAGES_SENT: IntCounter = IntCounter::new(
        "pg_messages_sent_total",
        "Messages published by group members"
    ).expect("metric creation failed");

    /// Mailbox deposits made by the router
    pub static ref MESSAGES_DELIVERED: IntCounter = IntCounter::new(
        "pg_messages_delivered_total",
        "Mailbox deposits made by the router"
    ).expect("metric creation failed");

    /// Messages addressed to unregistered processes
    pub static ref MESSAGES_DROPPED: IntCounter = IntCounter::new(
        "pg_messages_dropped_total",
        "Messages addressed to unregistered processes"
    ).expect("metric creation failed");

    /// Messages consumed by processes
    pub static ref MESSAGES_RECEIVED: IntCounter = IntCounter::new(
        "pg_messages_received_total",
        "Messages taken out of mailboxes"
    ).expect("metric creation failed");

    // =========================================================================
    // COORDINATION
    // =========================================================================

    /// Token hops
    pub static ref TOKEN_PASSES: IntCounter = IntCounter::new(
        "pg_token_passes_total",
        "Token hops between ring neighbours"
    ).expect("metric creation failed");

    /// Critical-section entries
    pub static ref CRITICAL_SECTION_ENTRIES: IntCounter = IntCounter::new(
        "pg_critical_section_entries_total",
        "Critical-section entries across the group"
    ).expect("metric creation failed");

    /// Barrier rounds
    pub static ref BARRIER_ROUNDS: IntCounter = IntCounter::new(
        "pg_barrier_rounds_total",
        "Completed barrier rounds"
    ).expect("metric creation failed");

    // =========================================================================
    // GROUP STATE
    // =========================================================================

    /// Configured group size
    pub static ref GROUP_SIZE: IntGauge = IntGauge::new(
        "pg_group_size",
        "Number of processes in the group"
    ).expect("metric creation failed");

    /// Lamport clock per process
    pub static ref PROCESS_CLOCK: IntGaugeVec = IntGaugeVec::new(
        Opts::new("pg_process_clock", "Latest Lamport clock value per process"),
        &["process"]
    ).expect("metric creation failed");
}

/// Proof that the metrics are registered.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    _registry: Registry,
}

/// Register all metrics with [`REGISTRY`]. Registering again is a no-op.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MESSAGES_SENT.clone()),
        Box::new(MESSAGES_DELIVERED.clone()),
        Box::new(MESSAGES_DROPPED.clone()),
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(TOKEN_PASSES.clone()),
        Box::new(CRITICAL_SECTION_ENTRIES.clone()),
        Box::new(BARRIER_ROUNDS.clone()),
        Box::new(GROUP_SIZE.clone()),
        Box::new(PROCESS_CLOCK.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: REGISTRY.clone(),
    })
}

/// Bring the counters up to the totals in `snapshot`.
pub fn record_snapshot(snapshot: &MetricsSnapshot) {
    advance(&MESSAGES_SENT, snapshot.messages_sent);
    advance(&MESSAGES_DELIVERED, snapshot.messages_delivered);
    advance(&MESSAGES_DROPPED, snapshot.messages_dropped);
    advance(&MESSAGES_RECEIVED, snapshot.messages_received);
    advance(&TOKEN_PASSES, snapshot.token_passes);
    advance(&CRITICAL_SECTION_ENTRIES, snapshot.critical_section_entries);
    advance(&BARRIER_ROUNDS, snapshot.barrier_rounds);
}

/// Record the latest clock of `process`.
pub fn record_process_clock(process: &str, clock: u64) {
    PROCESS_CLOCK
        .with_label_values(&[process])
        .set(i64::try_from(clock).unwrap_or(i64::MAX));
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
