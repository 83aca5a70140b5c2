//! # Critical Section State
//!
//! Phases of the per-process token ring state machine.
//!
//! ```text
//! IDLE ──request──▶ WANTS_TOKEN ──token──▶ IN_CRITICAL_SECTION
//!  ▲  ╲                                          │
//!  │   token, no request                         │ release
//!  │    ╲                                        │
//!  └─ HAS_TOKEN_IDLE (forwarding)  ◀─────────────┘ (back to IDLE)
//! ```

use std::fmt;

use serde::Serialize;

/// Phase of a process with respect to the critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriticalSectionState {
    /// Not interested and not holding the token.
    #[default]
    Idle,
    /// Waiting for the token to arrive.
    WantsToken,
    /// Holding the token without a local request; about to forward it.
    HasTokenIdle,
    /// Inside the critical section.
    InCriticalSection,
}

impl CriticalSectionState {
    /// Label used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::WantsToken => "WANTS_TOKEN",
            Self::HasTokenIdle => "HAS_TOKEN_IDLE",
            Self::InCriticalSection => "IN_CRITICAL_SECTION",
        }
    }
}

impl fmt::Display for CriticalSectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CriticalSectionStatus {
    /// Current phase.
    pub state: CriticalSectionState,
    /// Whether this process currently holds the token.
    pub has_token: bool,
    /// Whether a local request is pending or being served.
    pub wants: bool,
}
