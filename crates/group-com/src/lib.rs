//! # Group Com
//!
//! Communication middleware for a closed, statically-sized group of
//! processes.
//!
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Lamport clocks stamped on every send and merged on every receipt
//! - Per-process mailboxes fed by a single router per group
//! - Mutual exclusion through one token circulating on the ring `(id + 1) mod N`
//! - Reusable barriers guarded by a generation counter
//!
//! ## Data Flow
//!
//! ```text
//! Com::send_to ── tick ──▶ Transport ──▶ MessageRouter ──▶ Mailbox (target)
//!                                                            │
//!                          Com::get_message ◀── observe ─────┘
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! group-com/
//! ├── domain/          # Clock, Mailbox, Barrier, ids, CS state, invariants
//! ├── algorithms/      # Ring token coordinator
//! ├── adapters/        # MessageRouter (transport -> mailboxes)
//! ├── ports/           # GroupCommunication API + outbound traits
//! └── service/         # ProcessGroup container and Com facade
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use group_com::{Com, GroupCommunication, GroupConfig, ProcessGroup};
//!
//! let group = ProcessGroup::new(GroupConfig::with_process_count(2))?;
//! let p0 = Com::join(&group)?;
//! let p1 = Com::join(&group)?;
//!
//! p0.send_to("hello", p1.id())?;
//! p0.request_critical_section()?;
//! p0.release_critical_section()?;
//! # Ok::<(), group_com::ComError>(())
//! ```

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::MessageRouter;
pub use algorithms::CriticalSectionCoordinator;
pub use config::GroupConfig;
pub use domain::{
    invariant_clock_merge, invariant_ring_order, invariant_sender_fifo, invariant_single_holder,
    Barrier, BarrierArrival, ComError, ConfigError, CriticalSectionState, CriticalSectionStatus,
    LogicalClock, Mailbox, ProcessIdAllocator,
};
pub use metrics::{GroupMetrics, MetricsSnapshot};
pub use ports::{GroupCommunication, TokenSink, Transport};
pub use service::{Com, ProcessGroup, ProcessInfo};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
