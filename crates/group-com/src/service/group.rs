//! # Process Group
//!
//! Owns what the members of one group share: transport, router, id
//! allocator, barrier, metrics and configuration. Every [`Com`] is created from
//! a group.
//!
//! [`Com`]: super::Com

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use shared_bus::InMemoryEventBus;
use shared_types::{GroupMessage, ProcessId};
use tracing::{debug, info};

use crate::adapters::MessageRouter;
use crate::config::GroupConfig;
use crate::domain::{Barrier, ComError, ProcessIdAllocator};
use crate::metrics::GroupMetrics;
use crate::ports::Transport;

/// Shared state of a closed, statically-sized group.
pub struct ProcessGroup {
    config: GroupConfig,
    transport: Arc<dyn Transport>,
    router: Arc<MessageRouter>,
    allocator: ProcessIdAllocator,
    barrier: Arc<Barrier>,
    metrics: Arc<GroupMetrics>,
    joined: AtomicU32,
}

impl ProcessGroup {
    /// Group on a fresh in-memory event bus.
    pub fn new(config: GroupConfig) -> Result<Self, ComError> {
        Self::with_transport(config, Arc::new(InMemoryEventBus::new()))
    }

    /// Group on a caller-provided transport.
    pub fn with_transport(config: GroupConfig, transport: Arc<dyn Transport>) -> Result<Self, ComError> {
        config.validate()?;
        let metrics = Arc::new(GroupMetrics::new());
        let router = MessageRouter::attach(transport.as_ref(), Arc::clone(&metrics))?;

        info!(
            process_count = config.process_count,
            token_pass_delay_ms = config.token_pass_delay.as_millis() as u64,
            "Process group created"
        );

        Ok(Self {
            barrier: Arc::new(Barrier::new(config.process_count)),
            config,
            transport,
            router,
            allocator: ProcessIdAllocator::new(),
            metrics,
            joined: AtomicU32::new(0),
        })
    }

    /// Group configuration.
    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// N.
    pub fn size(&self) -> u32 {
        self.config.process_count
    }

    /// Members that have joined so far.
    pub fn joined(&self) -> u32 {
        self.joined.load(Ordering::SeqCst)
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn router(&self) -> Arc<MessageRouter> {
        Arc::clone(&self.router)
    }

    pub fn barrier(&self) -> Arc<Barrier> {
        Arc::clone(&self.barrier)
    }

    pub fn metrics(&self) -> Arc<GroupMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn allocator(&self) -> &ProcessIdAllocator {
        &self.allocator
    }

    /// Reserve the next id, refusing ids beyond the group size.
    pub(crate) fn allocate_id(&self) -> Result<ProcessId, ComError> {
        self.allocator
            .next_below(self.size())
            .ok_or(ComError::GroupFull {
                id: self.allocator.issued(),
                size: self.size(),
            })
    }

    /// Record a member whose mailbox is registered. The last one to join
    /// releases the token to process 0.
    pub(crate) fn member_joined(&self, id: ProcessId) {
        let joined = self.joined.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(process_id = id, joined, size = self.size(), "Member joined");
        if joined == self.size() {
            self.inject_token();
        }
    }

    fn inject_token(&self) {
        let last = self.size() - 1;
        self.metrics.record_token_pass();
        info!(size = self.size(), "Group complete, token released to P0");
        self.transport.publish(GroupMessage::token(0, last, 0));
    }
}

impl std::fmt::Debug for ProcessGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessGroup")
            .field("config", &self.config)
            .field("joined", &self.joined())
            .finish()
    }
}
