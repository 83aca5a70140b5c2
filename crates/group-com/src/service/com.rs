//! # Com
//!
//! The facade a process talks to. Composes the process's clock, mailbox and
//! critical-section coordinator with the group's barrier and transport.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shared_types::{
    default_process_name, DeliveryMode, GroupMessage, Payload, ProcessId, Timestamp,
};
use tracing::{debug, info};

use super::group::ProcessGroup;
use crate::adapters::MessageRouter;
use crate::algorithms::CriticalSectionCoordinator;
use crate::domain::{
    Barrier, BarrierArrival, ComError, CriticalSectionStatus, LogicalClock, Mailbox,
};
use crate::metrics::GroupMetrics;
use crate::ports::{GroupCommunication, Transport};

/// Identity of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub id: ProcessId,
    pub name: String,
    pub group_size: u32,
}

/// Middleware handle of one process.
///
/// Dropping it unregisters the mailbox; messages addressed to it afterwards,
/// the token included, are dropped by the router.
pub struct Com {
    id: ProcessId,
    name: String,
    group_size: u32,
    clock: Arc<LogicalClock>,
    mailbox: Arc<Mailbox>,
    coordinator: Arc<CriticalSectionCoordinator>,
    barrier: Arc<Barrier>,
    router: Arc<MessageRouter>,
    transport: Arc<dyn Transport>,
    metrics: Arc<GroupMetrics>,
}

impl Com {
    /// Join `group` under the next free id.
    pub fn join(group: &ProcessGroup) -> Result<Self, ComError> {
        let id = group.allocate_id()?;
        let config = group.config();
        let clock = Arc::new(LogicalClock::new());
        let transport = group.transport();
        let metrics = group.metrics();

        let coordinator = Arc::new(CriticalSectionCoordinator::new(
            id,
            group.size(),
            config.token_pass_delay,
            Arc::clone(&clock),
            Arc::clone(&transport),
            Arc::clone(&metrics),
        ));
        let mailbox = Arc::new(Mailbox::with_token_sink(id, coordinator.clone()));
        let router = group.router();
        router.register_mailbox(id, Arc::clone(&mailbox));

        let com = Self {
            id,
            name: default_process_name(&config.name_prefix, id),
            group_size: group.size(),
            clock,
            mailbox,
            coordinator,
            barrier: group.barrier(),
            router,
            transport,
            metrics,
        };
        info!(process_id = id, name = %com.name, "Joined group");

        group.member_joined(id);
        Ok(com)
    }

    /// Id, name and group size.
    pub fn process_info(&self) -> ProcessInfo {
        ProcessInfo {
            id: self.id,
            name: self.name.clone(),
            group_size: self.group_size,
        }
    }

    /// Queued messages, control traffic included.
    pub fn pending_messages(&self) -> usize {
        self.mailbox.len()
    }

    pub fn has_messages(&self) -> bool {
        !self.mailbox.is_empty()
    }

    pub fn critical_section_status(&self) -> CriticalSectionStatus {
        self.coordinator.status()
    }

    fn check_member(&self, id: ProcessId) -> Result<(), ComError> {
        if id >= self.group_size {
            return Err(ComError::UnknownProcess(id));
        }
        Ok(())
    }

    fn check_peer(&self, id: ProcessId) -> Result<(), ComError> {
        self.check_member(id)?;
        if id == self.id {
            return Err(ComError::SelfRendezvous(id));
        }
        Ok(())
    }

    fn publish(&self, message: GroupMessage) {
        debug!(process_id = self.id, message = %message, "Sending");
        self.metrics.record_sent();
        self.transport.publish(message);
    }

    /// Merge a taken message into the clock before handing it out.
    fn accept(&self, message: GroupMessage) -> GroupMessage {
        let (previous, timestamp) = self.clock.observe(message.timestamp());
        self.metrics.record_received();
        debug!(
            process_id = self.id,
            previous,
            timestamp,
            message = %message,
            "Received"
        );
        message
    }
}

impl GroupCommunication for Com {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn group_size(&self) -> u32 {
        self.group_size
    }

    fn clock(&self) -> Timestamp {
        self.clock.value()
    }

    fn local_event(&self) -> Timestamp {
        self.clock.tick()
    }

    fn broadcast(&self, payload: &str) -> Timestamp {
        let timestamp = self.clock.tick();
        self.publish(GroupMessage::broadcast(
            timestamp,
            self.id,
            DeliveryMode::Async,
            payload,
        ));
        timestamp
    }

    fn send_to(&self, payload: &str, target: ProcessId) -> Result<Timestamp, ComError> {
        self.check_member(target)?;
        let timestamp = self.clock.tick();
        self.publish(GroupMessage::directed(
            timestamp,
            self.id,
            target,
            DeliveryMode::Async,
            payload,
        ));
        Ok(timestamp)
    }

    fn get_message(&self) -> Option<GroupMessage> {
        self.mailbox
            .try_take_where(GroupMessage::is_application)
            .map(|message| self.accept(message))
    }

    fn wait_for_message(&self, timeout: Duration) -> Option<GroupMessage> {
        self.mailbox
            .take_where(GroupMessage::is_application, Some(timeout))
            .map(|message| self.accept(message))
    }

    fn request_critical_section(&self) -> Result<(), ComError> {
        self.coordinator.request_critical_section()
    }

    fn release_critical_section(&self) -> Result<(), ComError> {
        self.coordinator.release_critical_section()
    }

    fn synchronize(&self) -> BarrierArrival {
        debug!(process_id = self.id, "Entering barrier");
        let arrival = self.barrier.arrive();
        if arrival.is_leader {
            self.metrics.record_barrier_round();
        }
        debug!(process_id = self.id, generation = arrival.generation, "Left barrier");
        arrival
    }

    fn broadcast_sync(&self, payload: &str, origin: ProcessId) -> Result<Payload, ComError> {
        self.check_member(origin)?;
        if origin == self.id {
            let timestamp = self.clock.tick();
            self.publish(GroupMessage::broadcast(
                timestamp,
                self.id,
                DeliveryMode::Synchronous,
                payload,
            ));
        }

        // The origin consumes its own copy too, so nothing is left behind.
        let message = self.mailbox.wait_where(|m| match m {
            GroupMessage::Broadcast(b) => {
                b.sender == origin && b.mode == DeliveryMode::Synchronous && &*b.payload == payload
            }
            _ => false,
        });
        let message = self.accept(message);
        self.synchronize();

        message
            .payload()
            .cloned()
            .ok_or_else(|| ComError::InvariantViolated("broadcast without payload".to_string()))
    }

    fn send_to_sync(&self, payload: &str, target: ProcessId) -> Result<(), ComError> {
        self.check_peer(target)?;
        let timestamp = self.clock.tick();
        self.publish(GroupMessage::directed(
            timestamp,
            self.id,
            target,
            DeliveryMode::Synchronous,
            payload,
        ));

        let ack = self.mailbox.wait_where(|m| match m {
            GroupMessage::Directed(d) => {
                d.sender == target && d.mode == DeliveryMode::Acknowledgement
            }
            _ => false,
        });
        self.accept(ack);
        Ok(())
    }

    fn receive_from_sync(&self, source: ProcessId) -> Result<Payload, ComError> {
        self.check_peer(source)?;
        let message = self.mailbox.wait_where(|m| match m {
            GroupMessage::Directed(d) => d.sender == source && d.mode == DeliveryMode::Synchronous,
            _ => false,
        });
        let message = self.accept(message);

        let timestamp = self.clock.tick();
        self.publish(GroupMessage::acknowledgement(timestamp, self.id, source));

        message
            .payload()
            .cloned()
            .ok_or_else(|| ComError::InvariantViolated("directed message without payload".to_string()))
    }
}

impl Drop for Com {
    fn drop(&mut self) {
        self.router.unregister_mailbox(self.id);
        debug!(process_id = self.id, "Left group");
    }
}

impl std::fmt::Debug for Com {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Com")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("clock", &self.clock.value())
            .field("mailbox", &self.mailbox)
            .field("critical_section", &self.coordinator.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupConfig;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(2);

    fn group(n: u32) -> (ProcessGroup, Vec<Arc<Com>>) {
        let config = GroupConfig::with_process_count(n).token_pass_delay(Duration::from_millis(2));
        let group = ProcessGroup::new(config).unwrap();
        let members = (0..n).map(|_| Arc::new(Com::join(&group).unwrap())).collect();
        (group, members)
    }

    #[test]
    fn test_join_assigns_consecutive_ids() {
        let (group, members) = group(3);
        let ids: Vec<_> = members.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(members[1].name(), "P1");
        assert_eq!(group.router().registered_processes(), vec![0, 1, 2]);
        assert!(matches!(
            Com::join(&group),
            Err(ComError::GroupFull { id: 3, size: 3 })
        ));
    }

    #[test]
    fn test_drop_unregisters() {
        let (group, mut members) = group(2);
        members.pop();
        assert_eq!(group.router().registered_processes(), vec![0]);
    }

    #[test]
    fn test_send_to_and_receive_updates_clock() {
        let (_group, members) = group(2);
        for _ in 0..40 {
            members[0].local_event();
        }
        let sent_at = members[0].send_to("hello", 1).unwrap();
        let before = members[1].clock();

        let received = members[1].wait_for_message(WAIT).expect("message");
        assert_eq!(received.payload().map(|p| &**p), Some("hello"));
        assert_eq!(received.timestamp(), sent_at);
        // The circulating token may advance the clock further.
        assert!(members[1].clock() > before.max(sent_at));
    }

    #[test]
    fn test_send_to_unknown_process() {
        let (_group, members) = group(2);
        assert_eq!(members[0].send_to("x", 2), Err(ComError::UnknownProcess(2)));
    }

    #[test]
    fn test_broadcast_includes_sender() {
        let (_group, members) = group(3);
        members[2].broadcast("hi");
        for member in &members {
            let message = member.wait_for_message(WAIT).expect("broadcast");
            assert_eq!(message.sender(), 2);
        }
    }

    #[test]
    fn test_wait_for_message_times_out() {
        let (_group, members) = group(1);
        assert!(members[0].wait_for_message(Duration::from_millis(20)).is_none());
        assert!(members[0].get_message().is_none());
    }

    #[test]
    fn test_token_never_reaches_business_logic() {
        let (_group, members) = group(2);
        thread::sleep(Duration::from_millis(30));
        assert!(members[0].get_message().is_none());
        assert!(members[1].get_message().is_none());
    }

    #[test]
    fn test_plain_reads_leave_sync_traffic_alone() {
        let (_group, members) = group(3);
        let sender = {
            let com = Arc::clone(&members[1]);
            thread::spawn(move || com.send_to_sync("ping", 2))
        };
        thread::sleep(Duration::from_millis(100));

        // Draining the mailbox must not swallow the rendezvous message.
        assert!(members[2].get_message().is_none());
        assert!(members[2].wait_for_message(Duration::from_millis(20)).is_none());
        assert!(!sender.is_finished());

        let payload = members[2].receive_from_sync(1).unwrap();
        assert_eq!(&*payload, "ping");
        sender.join().unwrap().unwrap();
    }

    #[test]
    fn test_critical_section_round_trip() {
        let (_group, members) = group(3);
        members[1].request_critical_section().unwrap();
        assert_eq!(
            members[1].critical_section_status().state,
            crate::domain::CriticalSectionState::InCriticalSection
        );
        members[1].release_critical_section().unwrap();
        assert!(members[1].release_critical_section().is_err());
    }

    #[test]
    fn test_send_to_sync_pairs_up() {
        let (_group, members) = group(3);
        let receiver = {
            let com = Arc::clone(&members[2]);
            thread::spawn(move || com.receive_from_sync(1))
        };
        members[1].send_to_sync("ping", 2).unwrap();
        let payload = receiver.join().unwrap().unwrap();
        assert_eq!(&*payload, "ping");
        assert!(members[1].get_message().is_none());
    }

    #[test]
    fn test_sync_with_self_rejected() {
        let (_group, members) = group(2);
        assert_eq!(
            members[0].send_to_sync("x", 0),
            Err(ComError::SelfRendezvous(0))
        );
        assert_eq!(
            members[0].receive_from_sync(5),
            Err(ComError::UnknownProcess(5))
        );
    }

    #[test]
    fn test_broadcast_sync_everyone_returns_payload() {
        let (_group, members) = group(3);
        let handles: Vec<_> = members
            .iter()
            .map(|com| {
                let com = Arc::clone(com);
                thread::spawn(move || com.broadcast_sync("report", 0))
            })
            .collect();
        for handle in handles {
            assert_eq!(&*handle.join().unwrap().unwrap(), "report");
        }
        for member in &members {
            assert!(member.get_message().is_none());
        }
    }

    #[test]
    fn test_process_info() {
        let (_group, members) = group(2);
        let info = members[1].process_info();
        assert_eq!(
            info,
            ProcessInfo {
                id: 1,
                name: "P1".to_string(),
                group_size: 2,
            }
        );
        assert!(!members[1].has_messages());
        assert_eq!(members[1].pending_messages(), 0);
    }
}
