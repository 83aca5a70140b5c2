//! # Group Runtime
//!
//! Runs a simulated process group on top of `group-com`.
//!
//! ## Process Loop
//!
//! Every process repeatedly:
//! 1. records a local event and logs its clock
//! 2. broadcasts a heartbeat every `heartbeat_every` loops
//! 3. on its staggered turn, requests the critical section from a worker
//!    thread, increments the shared counter and releases
//! 4. handles incoming messages until the loop interval has elapsed
//!
//! On stop each process waits for its pending critical section, meets the
//! others at the exit barrier and reports.

pub mod config;
pub mod launcher;
pub mod process;
pub mod report;

pub use config::{RuntimeConfig, DEFAULT_TOKEN_PASS_DELAY};
pub use launcher::{launch, start, RunningGroup};
pub use process::{
    AccessRecord, Process, ProcessReport, ProcessSettings, RunControl, SharedResource,
};
pub use report::RunReport;
