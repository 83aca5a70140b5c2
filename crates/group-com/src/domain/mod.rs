//! # Domain Module
//!
//! Core building blocks of the middleware: clock, mailbox, barrier, id
//! allocation and the critical-section state machine vocabulary.

pub mod barrier;
pub mod clock;
pub mod errors;
pub mod id_allocator;
pub mod invariants;
pub mod mailbox;
pub mod state;

pub use barrier::*;
pub use clock::*;
pub use errors::*;
pub use id_allocator::*;
pub use invariants::*;
pub use mailbox::*;
pub use state::*;
