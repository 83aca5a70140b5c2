//! # Demo Process
//!
//! Business logic of one simulated process. Each loop iteration records a
//! local event, drains the mailbox, now and then broadcasts a heartbeat and,
//! on its staggered turn, asks for the critical section from a worker thread.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use group_com::{Com, ComError, GroupCommunication};
use group_telemetry::{log_critical_section_event, log_process_event};
use parking_lot::Mutex;
use serde::Serialize;
use shared_types::{ProcessId, Timestamp};
use tracing::error;

/// Stagger period of critical-section requests: process `id` asks on loops
/// where `loop % CS_STAGGER == id % CS_STAGGER`.
pub const CS_STAGGER: u64 = 5;

/// One entry of the shared access log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRecord {
    pub process: ProcessId,
    pub clock: Timestamp,
    pub counter: u64,
}

#[derive(Debug, Default)]
struct SharedState {
    counter: u64,
    access_log: Vec<AccessRecord>,
}

/// Resource the processes update from inside the critical section.
///
/// The mutex only protects the data structure; exclusion between processes
/// comes from the token. Overlapping occupants are counted as violations.
#[derive(Debug, Default)]
pub struct SharedResource {
    state: Mutex<SharedState>,
    occupants: AtomicU32,
    violations: AtomicU32,
}

impl SharedResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `process` as inside, bump the counter and log the access.
    pub fn enter(&self, process: ProcessId, clock: Timestamp) -> u64 {
        if self.occupants.fetch_add(1, Ordering::SeqCst) > 0 {
            self.violations.fetch_add(1, Ordering::SeqCst);
            error!(process, "Critical section already occupied");
        }
        let mut state = self.state.lock();
        state.counter += 1;
        let counter = state.counter;
        state.access_log.push(AccessRecord {
            process,
            clock,
            counter,
        });
        counter
    }

    pub fn leave(&self) {
        self.occupants.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn counter(&self) -> u64 {
        self.state.lock().counter
    }

    pub fn access_log(&self) -> Vec<AccessRecord> {
        self.state.lock().access_log.clone()
    }

    pub fn violations(&self) -> u32 {
        self.violations.load(Ordering::SeqCst)
    }
}

/// Stop signal shared by the launcher and its processes.
#[derive(Debug, Default)]
pub struct RunControl {
    stop: AtomicBool,
    aborted: AtomicBool,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave the loop and meet the rest of the group at the exit barrier.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Leave the loop without the exit barrier. Used when the group never
    /// came up complete, so the barrier could not release.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        self.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Pacing of a process loop.
#[derive(Debug, Clone, Copy)]
pub struct ProcessSettings {
    pub loop_interval: Duration,
    pub critical_section_work: Duration,
    pub heartbeat_every: u64,
}

/// What a process did during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub id: ProcessId,
    pub name: String,
    pub loops: u64,
    pub final_clock: Timestamp,
    pub messages_received: u64,
    pub critical_section_entries: u64,
    /// Barrier round left on exit; `None` when the run was aborted.
    pub exit_generation: Option<u64>,
}

/// A running demo process.
pub struct Process {
    name: String,
    handle: JoinHandle<Result<ProcessReport>>,
}

impl Process {
    /// Start the loop of `com` on its own thread. It runs until `control` is
    /// stopped.
    pub fn spawn(
        com: Arc<Com>,
        shared: Arc<SharedResource>,
        settings: ProcessSettings,
        control: Arc<RunControl>,
    ) -> Result<Self> {
        let name = com.name().to_string();
        let handle = thread::Builder::new()
            .name(format!("process-{name}"))
            .spawn(move || run(&com, &shared, settings, &control))
            .with_context(|| format!("failed to spawn thread for {name}"))?;
        Ok(Self { name, handle })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the loop to finish.
    pub fn join(self) -> Result<ProcessReport> {
        self.handle
            .join()
            .map_err(|_| anyhow!("process {} panicked", self.name))?
    }
}

fn run(
    com: &Arc<Com>,
    shared: &Arc<SharedResource>,
    settings: ProcessSettings,
    control: &RunControl,
) -> Result<ProcessReport> {
    let id = com.id();
    let name = com.name().to_string();
    let mut loops = 0u64;
    let mut messages_received = 0u64;
    let mut critical_section_entries = 0u64;
    let mut worker: Option<JoinHandle<Result<(), ComError>>> = None;

    log_process_event!(info, name, com.clock(), "Process started", id);

    while !control.is_stopped() {
        let clock = com.local_event();
        let status = com.critical_section_status();
        log_process_event!(
            debug,
            name,
            clock,
            "Loop",
            round = loops,
            state = %status.state,
            has_token = status.has_token,
            wants = status.wants
        );

        if loops % settings.heartbeat_every == 0 {
            com.broadcast(&format!("heartbeat {loops} from {name}"));
        }

        if let Some(done) = worker.take_if(|w| w.is_finished()) {
            critical_section_entries += finish_worker(done, &name)?;
        }
        if worker.is_none() && loops % CS_STAGGER == u64::from(id) % CS_STAGGER {
            worker = Some(spawn_worker(com, shared, settings.critical_section_work)?);
        }

        messages_received += drain_for(com, &name, settings.loop_interval);
        loops += 1;
    }

    // A pending request still completes: the token keeps circulating until
    // every process has left.
    if let Some(pending) = worker.take() {
        critical_section_entries += finish_worker(pending, &name)?;
    }

    let exit_generation = if control.is_aborted() {
        None
    } else {
        Some(com.synchronize().generation)
    };
    messages_received += drain_for(com, &name, Duration::ZERO);
    log_process_event!(info, name, com.clock(), "Process stopped", loops);

    Ok(ProcessReport {
        id,
        name,
        loops,
        final_clock: com.clock(),
        messages_received,
        critical_section_entries,
        exit_generation,
    })
}

/// Handle incoming messages until `window` has elapsed. Returns how many.
fn drain_for(com: &Com, name: &str, window: Duration) -> u64 {
    let deadline = Instant::now() + window;
    let mut received = 0;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let next = if remaining.is_zero() {
            com.get_message()
        } else {
            com.wait_for_message(remaining)
        };
        let Some(message) = next else {
            return received;
        };
        received += 1;
        log_process_event!(
            debug,
            name,
            com.clock(),
            "Handled message",
            sender = message.sender(),
            sent_at = message.timestamp(),
            payload = message.payload().map(|p| &**p).unwrap_or_default()
        );
    }
}

fn spawn_worker(
    com: &Arc<Com>,
    shared: &Arc<SharedResource>,
    work: Duration,
) -> Result<JoinHandle<Result<(), ComError>>> {
    let com = Arc::clone(com);
    let shared = Arc::clone(shared);
    let name = com.name().to_string();
    let worker_name = name.clone();

    thread::Builder::new()
        .name(format!("cs-worker-{name}"))
        .spawn(move || {
            com.request_critical_section()?;
            let counter = shared.enter(com.id(), com.clock());
            log_critical_section_event!(info, worker_name, com.clock(), "Working in critical section", counter);
            thread::sleep(work);
            shared.leave();
            com.release_critical_section()
        })
        .with_context(|| format!("failed to spawn critical-section worker for {name}"))
}

/// Join a finished worker. Returns 1 for a completed critical section.
fn finish_worker(worker: JoinHandle<Result<(), ComError>>, name: &str) -> Result<u64> {
    worker
        .join()
        .map_err(|_| anyhow!("critical-section worker of {name} panicked"))?
        .with_context(|| format!("critical-section worker of {name} failed"))?;
    Ok(1)
}
