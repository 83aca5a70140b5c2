//! # Process-Group Test Suite
//!
//! Unified test crate for behaviour that only shows up with a whole group
//! running.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Recording transport, group fixtures
//! └── integration/
//!     ├── scenarios.rs  # Token ring, rendezvous and barrier walkthroughs
//!     └── properties.rs # Mutual exclusion, FIFO, at-most-once, generations
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p group-tests
//!
//! # By category
//! cargo test -p group-tests integration::scenarios
//! cargo test -p group-tests integration::properties
//!
//! # Benchmarks
//! cargo bench -p group-tests
//! ```

pub mod integration;
pub mod support;
