//! # Launcher
//!
//! Builds the group, joins every member and runs one demo process per member
//! until told to stop.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use group_com::{Com, ProcessGroup};
use tracing::{info, warn};

use crate::config::RuntimeConfig;
use crate::process::{Process, ProcessReport, ProcessSettings, RunControl, SharedResource};
use crate::report::RunReport;

/// A group whose processes are running.
pub struct RunningGroup {
    group: ProcessGroup,
    coms: Vec<Arc<Com>>,
    processes: Vec<Process>,
    shared: Arc<SharedResource>,
    control: Arc<RunControl>,
    started: Instant,
}

/// Create the group and start every process.
pub fn start(config: &RuntimeConfig) -> Result<RunningGroup> {
    config.validate().context("invalid runtime configuration")?;

    let group = ProcessGroup::new(config.group.clone()).context("failed to create process group")?;
    let coms = (0..group.size())
        .map(|_| Com::join(&group).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to join process group")?;

    info!(
        processes = group.size(),
        token_pass_delay_ms = config.group.token_pass_delay.as_millis() as u64,
        "Process group formed"
    );

    let shared = Arc::new(SharedResource::new());
    let control = Arc::new(RunControl::new());
    let settings = ProcessSettings {
        loop_interval: config.loop_interval,
        critical_section_work: config.critical_section_work,
        heartbeat_every: config.heartbeat_every,
    };

    let mut running = RunningGroup {
        group,
        coms: coms.clone(),
        processes: Vec::with_capacity(coms.len()),
        shared: Arc::clone(&shared),
        control: Arc::clone(&control),
        started: Instant::now(),
    };
    for com in coms {
        match Process::spawn(com, Arc::clone(&shared), settings, Arc::clone(&control)) {
            Ok(process) => running.processes.push(process),
            Err(err) => {
                abandon(running.processes, &control);
                return Err(err);
            }
        }
    }

    Ok(running)
}

/// Wind down the processes of a group that never started completely.
///
/// The exit barrier would wait for the missing members, so the processes
/// skip it. Returns the reports of those that stopped cleanly.
fn abandon(processes: Vec<Process>, control: &RunControl) -> Vec<ProcessReport> {
    warn!(started = processes.len(), "Aborting incomplete launch");
    control.abort();
    processes
        .into_iter()
        .filter_map(|process| {
            let name = process.name().to_string();
            process
                .join()
                .map_err(|err| warn!(process = %name, error = %err, "Process failed during abort"))
                .ok()
        })
        .collect()
}

/// Run the group for `config.running_time` and return its report.
pub fn launch(config: &RuntimeConfig) -> Result<RunReport> {
    let running = start(config)?;
    thread::sleep(config.running_time);
    running.stop_and_join()
}

impl RunningGroup {
    pub fn group(&self) -> &ProcessGroup {
        &self.group
    }

    pub fn shared(&self) -> &SharedResource {
        &self.shared
    }

    /// Ask every process to stop, wait for all of them and build the report.
    ///
    /// Blocks while pending critical-section requests complete and the
    /// processes meet at the exit barrier.
    pub fn stop_and_join(self) -> Result<RunReport> {
        info!("Stopping processes");
        self.control.stop();

        let mut processes = Vec::with_capacity(self.processes.len());
        for process in self.processes {
            let name = process.name().to_string();
            let report = process
                .join()
                .with_context(|| format!("process {name} did not stop cleanly"))?;
            processes.push(report);
        }
        // Mailboxes are unregistered once the last handle goes away.
        drop(self.coms);

        let report = RunReport {
            group_size: self.group.size(),
            processes,
            shared_counter: self.shared.counter(),
            access_order: self.shared.access_log(),
            mutual_exclusion_violations: self.shared.violations(),
            metrics: self.group.metrics().snapshot(),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        };

        if report.is_consistent() {
            info!(
                shared_counter = report.shared_counter,
                elapsed_ms = report.elapsed_ms,
                "All processes stopped"
            );
        } else {
            warn!(
                shared_counter = report.shared_counter,
                entries = report.total_entries(),
                violations = report.mutual_exclusion_violations,
                "Run finished with an inconsistent shared counter"
            );
        }
        Ok(report)
    }
}
