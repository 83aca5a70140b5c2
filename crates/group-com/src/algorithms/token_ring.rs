//! # Ring Token Mutual Exclusion
//!
//! Per-process coordinator of the single circulating token.
//!
//! ## Protocol
//!
//! 1. The group injects one token, addressed to process 0, once all N members
//!    have joined.
//! 2. A token arriving while a request is pending is kept and the requester
//!    is woken.
//! 3. A token arriving with no pending request is forwarded to
//!    `(id + 1) mod N`, after the optional pacing delay. A request made during
//!    that delay keeps the token.
//! 4. Release always forwards the token to the successor.
//!
//! Tokens arrive on the transport's dispatcher thread; requests block the
//! caller's own thread on the coordinator's condition variable.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use shared_types::{ring_successor, GroupMessage, ProcessId, TokenMessage};
use tracing::{debug, error, info};

use crate::domain::{ComError, CriticalSectionState, CriticalSectionStatus, LogicalClock};
use crate::metrics::GroupMetrics;
use crate::ports::{TokenSink, Transport};

#[derive(Debug, Default)]
struct TokenState {
    phase: CriticalSectionState,
    has_token: bool,
    wants: bool,
}

/// Critical-section coordinator of one process.
pub struct CriticalSectionCoordinator {
    id: ProcessId,
    group_size: u32,
    pass_delay: Duration,
    clock: Arc<LogicalClock>,
    transport: Arc<dyn Transport>,
    metrics: Arc<GroupMetrics>,
    state: Mutex<TokenState>,
    token_ready: Condvar,
}

impl CriticalSectionCoordinator {
    /// Create a tokenless, idle coordinator for process `id`.
    pub fn new(
        id: ProcessId,
        group_size: u32,
        pass_delay: Duration,
        clock: Arc<LogicalClock>,
        transport: Arc<dyn Transport>,
        metrics: Arc<GroupMetrics>,
    ) -> Self {
        Self {
            id,
            group_size,
            pass_delay,
            clock,
            transport,
            metrics,
            state: Mutex::new(TokenState::default()),
            token_ready: Condvar::new(),
        }
    }

    /// Ring successor of this process.
    pub fn successor(&self) -> ProcessId {
        ring_successor(self.id, self.group_size)
    }

    /// Block until this process holds the token, then enter the critical section.
    ///
    /// Not cancellable. Fails with [`ComError::AlreadyRequested`] if a request
    /// is already pending or granted.
    pub fn request_critical_section(&self) -> Result<(), ComError> {
        let mut state = self.state.lock();
        if state.wants {
            return Err(ComError::AlreadyRequested);
        }
        state.wants = true;
        if !state.has_token {
            state.phase = CriticalSectionState::WantsToken;
        }
        debug!(process_id = self.id, "Requesting critical section");

        while !(state.has_token && state.wants) {
            self.token_ready.wait(&mut state);
        }
        state.phase = CriticalSectionState::InCriticalSection;
        drop(state);

        let timestamp = self.clock.tick();
        self.metrics.record_critical_section_entry();
        info!(process_id = self.id, timestamp, "Entered critical section");
        Ok(())
    }

    /// Leave the critical section and pass the token to the successor.
    ///
    /// Calling this outside the critical section is a protocol violation: it
    /// is logged and rejected, and the state is left untouched.
    pub fn release_critical_section(&self) -> Result<(), ComError> {
        let mut state = self.state.lock();
        if state.phase != CriticalSectionState::InCriticalSection {
            error!(
                process_id = self.id,
                state = %state.phase,
                "Release without holding the critical section"
            );
            return Err(ComError::InvalidTransition {
                from: state.phase.to_string(),
                to: CriticalSectionState::Idle.to_string(),
            });
        }
        state.wants = false;
        state.has_token = false;
        state.phase = CriticalSectionState::Idle;
        drop(state);

        let timestamp = self.clock.tick();
        info!(process_id = self.id, timestamp, "Left critical section");
        self.forward_token();
        Ok(())
    }

    /// Snapshot of the coordinator state.
    pub fn status(&self) -> CriticalSectionStatus {
        let state = self.state.lock();
        CriticalSectionStatus {
            state: state.phase,
            has_token: state.has_token,
            wants: state.wants,
        }
    }

    fn forward_token(&self) {
        let timestamp = self.clock.tick();
        let to = self.successor();
        self.metrics.record_token_pass();
        debug!(process_id = self.id, to, timestamp, "Passing token");
        self.transport
            .publish(GroupMessage::token(timestamp, self.id, to));
    }
}

impl TokenSink for CriticalSectionCoordinator {
    fn on_token(&self, token: TokenMessage) {
        let (_, timestamp) = self.clock.observe(token.timestamp);
        let mut state = self.state.lock();
        state.has_token = true;

        if state.wants {
            debug!(process_id = self.id, from = token.from, timestamp, "Token granted");
            self.token_ready.notify_all();
            return;
        }

        state.phase = CriticalSectionState::HasTokenIdle;
        if !self.pass_delay.is_zero() {
            drop(state);
            // Runs on the token dispatcher only; payload delivery goes on.
            thread::sleep(self.pass_delay);
            state = self.state.lock();
            // A request during the pause keeps the token; a full
            // request/release cycle already forwarded it.
            if !state.has_token || state.wants {
                return;
            }
        }

        state.has_token = false;
        state.phase = CriticalSectionState::Idle;
        drop(state);
        self.forward_token();
    }
}

impl std::fmt::Debug for CriticalSectionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriticalSectionCoordinator")
            .field("id", &self.id)
            .field("group_size", &self.group_size)
            .field("status", &self.status())
            .finish()
    }
}
