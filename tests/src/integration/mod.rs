//! Cross-process integration tests.

pub mod properties;
pub mod scenarios;
