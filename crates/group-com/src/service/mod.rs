//! # Service Layer
//!
//! The group container and the per-process facade.

mod com;
mod group;

pub use com::{Com, ProcessInfo};
pub use group::ProcessGroup;
