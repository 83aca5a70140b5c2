//! # Domain Invariants
//!
//! Protocol rules that must always hold for a group. Used by the scenario
//! tests to check recorded runs.

use std::collections::HashMap;

use shared_types::{ring_successor, GroupMessage, ProcessId, Timestamp};

use super::errors::ComError;
use super::state::CriticalSectionState;

/// Invariant: at most one process is inside the critical section.
pub fn invariant_single_holder(states: &[CriticalSectionState]) -> Result<(), ComError> {
    let inside = states
        .iter()
        .filter(|s| **s == CriticalSectionState::InCriticalSection)
        .count();
    if inside > 1 {
        return Err(ComError::InvariantViolated(format!(
            "{inside} processes in the critical section"
        )));
    }
    Ok(())
}

/// Invariant: the token visits ids in cyclic order without skipping or
/// repeating.
///
/// `visits` lists the recipient of each token hop in publish order.
pub fn invariant_ring_order(visits: &[ProcessId], group_size: u32) -> Result<(), ComError> {
    if group_size == 0 {
        return Err(ComError::InvariantViolated("empty group".to_string()));
    }
    if let Some(bad) = visits.iter().find(|id| **id >= group_size) {
        return Err(ComError::UnknownProcess(*bad));
    }
    for pair in visits.windows(2) {
        let expected = ring_successor(pair[0], group_size);
        if pair[1] != expected {
            return Err(ComError::InvariantViolated(format!(
                "token went P{} -> P{}, expected P{expected}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

/// Invariant: a receipt sets the clock to `max(pre, remote) + 1`.
pub fn invariant_clock_merge(pre: Timestamp, remote: Timestamp, post: Timestamp) -> bool {
    post == pre.max(remote) + 1
}

/// Invariant: messages from one sender arrive in the order they were sent.
///
/// A sender stamps every message with a fresh tick, so per-sender timestamps
/// must strictly increase in receipt order.
pub fn invariant_sender_fifo(received: &[GroupMessage]) -> Result<(), ComError> {
    let mut last: HashMap<ProcessId, Timestamp> = HashMap::new();
    for message in received {
        let sender = message.sender();
        let ts = message.timestamp();
        if let Some(previous) = last.insert(sender, ts) {
            if ts <= previous {
                return Err(ComError::InvariantViolated(format!(
                    "P{sender} message @{ts} received after @{previous}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::DeliveryMode;

    #[test]
    fn test_single_holder() {
        use CriticalSectionState::*;
        assert!(invariant_single_holder(&[Idle, InCriticalSection, WantsToken]).is_ok());
        assert!(invariant_single_holder(&[InCriticalSection, Idle, InCriticalSection]).is_err());
    }

    #[test]
    fn test_ring_order_accepts_cycles() {
        assert!(invariant_ring_order(&[0, 1, 2, 0, 1, 2, 0], 3).is_ok());
        assert!(invariant_ring_order(&[0, 0, 0], 1).is_ok());
        assert!(invariant_ring_order(&[], 3).is_ok());
    }

    #[test]
    fn test_ring_order_rejects_skip() {
        let err = invariant_ring_order(&[0, 2], 3).unwrap_err();
        assert!(err.to_string().contains("expected P1"));
    }

    #[test]
    fn test_ring_order_rejects_outsider() {
        assert_eq!(
            invariant_ring_order(&[0, 3], 3),
            Err(ComError::UnknownProcess(3))
        );
    }

    #[test]
    fn test_clock_merge() {
        assert!(invariant_clock_merge(3, 10, 11));
        assert!(invariant_clock_merge(12, 10, 13));
        assert!(!invariant_clock_merge(12, 10, 11));
    }

    #[test]
    fn test_sender_fifo() {
        let in_order = vec![
            GroupMessage::broadcast(1, 0, DeliveryMode::Async, "a"),
            GroupMessage::broadcast(1, 1, DeliveryMode::Async, "b"),
            GroupMessage::broadcast(2, 0, DeliveryMode::Async, "c"),
        ];
        assert!(invariant_sender_fifo(&in_order).is_ok());

        let swapped = vec![
            GroupMessage::broadcast(2, 0, DeliveryMode::Async, "c"),
            GroupMessage::broadcast(1, 0, DeliveryMode::Async, "a"),
        ];
        assert!(invariant_sender_fifo(&swapped).is_err());
    }
}
