//! Seams between the collectors and the host.
//!
//! `FileSystem` lets the file pass run against the real `/proc` tree or an
//! in-memory mock. `StatsProvider` hides how conntrack statistics are
//! obtained so that a test double can stand in for the kernel.

use std::io;
use std::path::Path;

use crate::collector::error::StatsError;
use crate::model::ConntrackStat;

/// Abstraction for filesystem operations.
///
/// Only reads are needed: the probe never writes to the filesystem.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// # Arguments
    /// * `path` - Path to the file to read
    ///
    /// # Returns
    /// The file contents as a string, or an I/O error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Source of conntrack statistics.
pub trait StatsProvider: Send + Sync {
    /// Fetches conntrack statistics.
    ///
    /// With `per_cpu` set, returns one entry per processing unit in unit
    /// order. Otherwise returns at most one aggregate entry.
    fn conntrack_stats(&self, per_cpu: bool) -> Result<Vec<ConntrackStat>, StatsError>;
}
