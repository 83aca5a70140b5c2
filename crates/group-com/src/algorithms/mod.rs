//! # Algorithms Module
//!
//! Distributed protocols built on the domain types.

pub mod token_ring;

pub use token_ring::CriticalSectionCoordinator;
