//! Conntrack statistics read from `/proc/net/stat/nf_conntrack`.

use std::path::PathBuf;

use tracing::trace;

use crate::collector::error::StatsError;
use crate::collector::procfs::parser::parse_nf_conntrack_stat;
use crate::collector::traits::{FileSystem, StatsProvider};
use crate::model::ConntrackStat;

/// Production [`StatsProvider`] backed by the proc filesystem.
pub struct ProcfsStatsProvider<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
}

impl<F: FileSystem> ProcfsStatsProvider<F> {
    /// Creates a new provider.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    fn stat_path(&self) -> PathBuf {
        self.proc_path.join("net/stat/nf_conntrack")
    }
}

impl<F: FileSystem> StatsProvider for ProcfsStatsProvider<F> {
    fn conntrack_stats(&self, per_cpu: bool) -> Result<Vec<ConntrackStat>, StatsError> {
        let path = self.stat_path();
        let content = self.fs.read_to_string(&path)?;
        let rows = parse_nf_conntrack_stat(&content)?;
        trace!(path = %path.display(), rows = rows.len(), "read conntrack stat table");

        if per_cpu {
            return Ok(rows);
        }

        let mut rows = rows.into_iter();
        let Some(mut total) = rows.next() else {
            return Ok(Vec::new());
        };
        for row in rows {
            total.accumulate(&row);
        }
        Ok(vec![total])
    }
}
