//! # Run Report
//!
//! Summary of a finished run, printable as JSON.

use group_com::MetricsSnapshot;
use serde::Serialize;

use crate::process::{AccessRecord, ProcessReport};

/// Outcome of a run of the whole group.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub group_size: u32,
    pub processes: Vec<ProcessReport>,
    /// Final value of the shared counter.
    pub shared_counter: u64,
    /// Critical-section entries in the order they happened.
    pub access_order: Vec<AccessRecord>,
    pub mutual_exclusion_violations: u32,
    pub metrics: MetricsSnapshot,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Sum of the critical-section entries reported by the processes.
    pub fn total_entries(&self) -> u64 {
        self.processes
            .iter()
            .map(|p| p.critical_section_entries)
            .sum()
    }

    /// True when the shared counter agrees with the entries and no two
    /// processes were ever inside together.
    pub fn is_consistent(&self) -> bool {
        self.mutual_exclusion_violations == 0
            && self.shared_counter == self.total_entries()
            && self.shared_counter == self.access_order.len() as u64
    }
}
