//! Cross-crate integration suites.

pub mod concurrency;
pub mod lifecycle;
pub mod reconciliation;
