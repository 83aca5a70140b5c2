//! # Shared Types Crate
//!
//! This crate contains the process identities and the tagged message records
//! that flow through the shared bus.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every record published on the transport is
//!   defined here.
//! - **In-Memory Only**: there is no wire format. Payloads are immutable and
//!   shared by reference, so a broadcast fans out without copying content.
//! - **Lamport Stamped**: every message carries the sender's logical clock at
//!   send time.

pub mod entities;
pub mod messages;

pub use entities::*;
pub use messages::*;
