//! # Group-Wide Properties
//!
//! Properties that must hold however the processes interleave:
//!
//! - at most one process is ever inside the critical section
//! - a barrier generation never releases a process of another generation
//! - messages from one sender are received in send order
//! - every message is handed out at most once, and only to its recipients

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use group_com::{
        invariant_clock_merge, invariant_sender_fifo, invariant_single_holder,
        CriticalSectionState, GroupCommunication,
    };
    use proptest::prelude::*;
    use shared_types::{GroupMessage, MessageId, MessageKind, ProcessId};

    use crate::support::full_group;

    const WAIT: Duration = Duration::from_secs(5);

    /// Take exactly `count` application messages, failing after [`WAIT`].
    fn collect<C: GroupCommunication + ?Sized>(com: &C, count: usize) -> Vec<GroupMessage> {
        (0..count)
            .map(|i| {
                com.wait_for_message(WAIT)
                    .unwrap_or_else(|| panic!("{} timed out after {i} messages", com.name()))
            })
            .collect()
    }

    // =========================================================================
    // MUTUAL EXCLUSION
    // =========================================================================

    #[test]
    fn test_at_most_one_process_inside() {
        const ROUNDS: u32 = 5;
        let (group, members) = full_group(4);
        let inside = Arc::new(AtomicU32::new(0));
        let overlaps = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = members
            .iter()
            .map(|com| {
                let com = Arc::clone(com);
                let everyone = members.clone();
                let inside = Arc::clone(&inside);
                let overlaps = Arc::clone(&overlaps);
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        com.request_critical_section().unwrap();
                        if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }

                        // While this process is inside, every status read
                        // reflects the present, so the snapshot is exact.
                        let states: Vec<CriticalSectionState> = everyone
                            .iter()
                            .map(|member| member.critical_section_status().state)
                            .collect();
                        assert_eq!(
                            states[com.id() as usize],
                            CriticalSectionState::InCriticalSection
                        );
                        invariant_single_holder(&states).unwrap();

                        thread::sleep(Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                        com.release_critical_section().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        let snapshot = group.metrics().snapshot();
        assert_eq!(snapshot.critical_section_entries, u64::from(4 * ROUNDS));
        assert!(snapshot.token_passes >= u64::from(4 * ROUNDS));
    }

    // =========================================================================
    // BARRIER GENERATIONS
    // =========================================================================

    #[test]
    fn test_barrier_generations_do_not_mix() {
        const ROUNDS: u64 = 5;
        let (group, members) = full_group(3);

        let handles: Vec<_> = members
            .iter()
            .map(|com| {
                let com = Arc::clone(com);
                thread::spawn(move || {
                    (0..ROUNDS)
                        .map(|round| {
                            // Vary arrival order from round to round.
                            let jitter = (u64::from(com.id()) * 7 + round * 3) % 5;
                            thread::sleep(Duration::from_millis(jitter));
                            com.synchronize().generation
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let expected: Vec<u64> = (0..ROUNDS).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert_eq!(group.metrics().snapshot().barrier_rounds, ROUNDS);
    }

    // =========================================================================
    // ORDERING AND CLOCKS
    // =========================================================================

    #[test]
    fn test_broadcasts_arrive_in_sender_order() {
        const PER_SENDER: usize = 50;
        let (_group, members) = full_group(3);

        let senders: Vec<_> = members
            .iter()
            .map(|com| {
                let com = Arc::clone(com);
                thread::spawn(move || {
                    for i in 0..PER_SENDER {
                        com.broadcast(&format!("{} #{i}", com.name()));
                    }
                })
            })
            .collect();

        let receivers: Vec<_> = members
            .iter()
            .map(|com| {
                let com = Arc::clone(com);
                thread::spawn(move || {
                    let received = collect(&*com, 3 * PER_SENDER);
                    (received, com.clock())
                })
            })
            .collect();

        for sender in senders {
            sender.join().unwrap();
        }
        for receiver in receivers {
            let (received, clock) = receiver.join().unwrap();
            invariant_sender_fifo(&received).unwrap();
            let newest = received.iter().map(GroupMessage::timestamp).max().unwrap();
            assert!(clock > newest);
        }
    }

    #[test]
    fn test_mixed_kinds_arrive_in_sender_order() {
        const ROUNDS: usize = 500;
        let (_group, members) = full_group(2);

        for _ in 0..ROUNDS {
            members[0].broadcast("b");
            members[0].send_to("d", 1).unwrap();
        }

        let received = collect(&*members[1], 2 * ROUNDS);
        invariant_sender_fifo(&received).unwrap();
        let kinds: Vec<MessageKind> = received.iter().map(GroupMessage::kind).take(4).collect();
        assert_eq!(
            kinds,
            vec![
                MessageKind::Broadcast,
                MessageKind::Directed,
                MessageKind::Broadcast,
                MessageKind::Directed
            ]
        );
    }

    #[test]
    fn test_receive_merges_clock() {
        let (_group, members) = full_group(2);
        // Park the token inside P0's critical section: from here on only the
        // messages below touch P1's clock.
        members[0].request_critical_section().unwrap();

        // Remote clock ahead of the receiver.
        for _ in 0..10 {
            members[0].local_event();
        }
        let before = members[1].clock();
        let sent = members[0].send_to("late news", 1).unwrap();
        assert!(sent > before);
        let message = members[1].wait_for_message(WAIT).unwrap();
        assert_eq!(message.timestamp(), sent);
        assert!(invariant_clock_merge(before, sent, members[1].clock()));

        // Receiver ahead of the remote clock.
        for _ in 0..50 {
            members[1].local_event();
        }
        let before = members[1].clock();
        let sent = members[0].send_to("old news", 1).unwrap();
        assert!(sent < before);
        members[1].wait_for_message(WAIT).unwrap();
        assert!(invariant_clock_merge(before, sent, members[1].clock()));
        assert_eq!(members[1].clock(), before + 1);

        members[0].release_critical_section().unwrap();
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_directed_messages_delivered_once_in_order(
            n in 2u32..5,
            sends in prop::collection::vec((0u32..4, 0u32..4), 1..40),
        ) {
            let (_group, members) = full_group(n);
            let sends: Vec<(ProcessId, ProcessId)> =
                sends.into_iter().map(|(from, to)| (from % n, to % n)).collect();

            let mut expected: HashMap<ProcessId, Vec<String>> = HashMap::new();
            for (i, (from, to)) in sends.iter().enumerate() {
                let payload = format!("{from}->{to} #{i}");
                members[*from as usize].send_to(&payload, *to).unwrap();
                expected.entry(*to).or_default().push(payload);
            }

            let mut seen: HashSet<MessageId> = HashSet::new();
            for com in &members {
                let want = expected.remove(&com.id()).unwrap_or_default();
                let got = collect(&**com, want.len());
                for message in &got {
                    prop_assert!(seen.insert(message.id()), "duplicate {}", message.id());
                    prop_assert_eq!(message.recipient(), Some(com.id()));
                }

                // Per-sender order matches send order.
                for sender in 0..n {
                    let sent: Vec<&String> = want
                        .iter()
                        .filter(|p| p.starts_with(&format!("{sender}->")))
                        .collect();
                    let received: Vec<String> = got
                        .iter()
                        .filter(|m| m.sender() == sender)
                        .filter_map(|m| m.payload().map(|p| p.to_string()))
                        .collect();
                    prop_assert_eq!(sent.len(), received.len());
                    prop_assert!(sent.iter().zip(&received).all(|(a, b)| *a == b));
                }
                prop_assert!(com.get_message().is_none());
            }
        }
    }
}
