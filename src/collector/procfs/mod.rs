//! Readers for the Linux `/proc` filesystem.
//!
//! `parser` holds pure functions over file contents; `stats` wires them to a
//! [`FileSystem`](crate::collector::traits::FileSystem) as the production
//! statistics provider.

pub mod parser;
pub mod stats;

pub use parser::ParseError;
pub use stats::ProcfsStatsProvider;
