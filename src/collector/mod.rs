//! Conntrack metrics collector for Linux.
//!
//! This module reads connection-tracking counters from `/proc` and turns
//! them into measurements, with support for mocking for testing off Linux.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ConntrackCollector                      │
//! │  ┌──────────────────────────┐   ┌─────────────────────────┐  │
//! │  │  FileCounterCollector    │   │     StatsCollector      │  │
//! │  │  - <dir>/ip_conntrack_*  │   │  - one record per unit  │  │
//! │  │  - <dir>/nf_conntrack_*  │   │  - tag cpu=all|cpu<N>   │  │
//! │  └────────────┬─────────────┘   └────────────┬────────────┘  │
//! │        ┌──────▼──────┐               ┌───────▼───────┐       │
//! │        │  FileSystem │ (trait)       │ StatsProvider │ (trait)
//! │        └──────┬──────┘               └───────┬───────┘       │
//! └───────────────┼──────────────────────────────┼───────────────┘
//!          ┌──────┴──────┐              ┌────────┴─────────┐
//!          │ RealFs      │              │ ProcfsStats-     │
//!          │ MockFs      │              │ Provider (Linux) │
//!          └─────────────┘              │ MockStatsProvider│
//!                                       └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use ctprobe::collector::{ConntrackCollector, ProcfsStatsProvider, RealFs};
//! use ctprobe::config::Config;
//! use ctprobe::sink::MemoryAccumulator;
//!
//! let provider = ProcfsStatsProvider::new(RealFs::new(), "/proc");
//! let mut collector = ConntrackCollector::new(RealFs::new(), provider, Config::default());
//! let mut acc = MemoryAccumulator::new();
//! collector.gather(&mut acc)?;
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use ctprobe::collector::{ConntrackCollector, MockFs, ProcfsStatsProvider};
//! use ctprobe::config::Config;
//! use ctprobe::sink::MemoryAccumulator;
//!
//! let provider = ProcfsStatsProvider::new(MockFs::modern_kernel(), "/proc");
//! let mut collector = ConntrackCollector::new(MockFs::modern_kernel(), provider, Config::default());
//! let mut acc = MemoryAccumulator::new();
//! collector.gather(&mut acc).unwrap();
//! assert_eq!(acc.measurements.len(), 2);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod error;
pub mod files;
pub mod mock;
pub mod procfs;
pub mod stats;
pub mod traits;

/// Measurement name shared by every record this collector emits.
pub const MEASUREMENT_NAME: &str = "conntrack";

pub use collector::{CollectorTiming, ConntrackCollector};
pub use error::{CollectError, GatherError, StatsError};
pub use files::FileCounterCollector;
pub use mock::{MockFs, MockStatsProvider};
pub use procfs::ProcfsStatsProvider;
pub use stats::StatsCollector;
pub use traits::{FileSystem, RealFs, StatsProvider};
