//! Test doubles for the collector seams.
//!
//! This module provides `MockFs`, `MockStatsProvider` and pre-built host
//! scenarios for testing collectors without a Linux kernel.

mod filesystem;
mod scenarios;
mod stats;

pub use filesystem::MockFs;
pub use stats::MockStatsProvider;
