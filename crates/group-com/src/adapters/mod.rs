//! # Adapters Layer (Hexagonal Architecture)
//!
//! Connects the domain to the event transport.

mod router;

pub use router::MessageRouter;
