//! Collection settings and their built-in defaults.
//!
//! Defaults are plain constants resolved when a cycle runs, so an empty
//! `dirs` or `files` list always means "use the kernel-standard locations".

use std::path::{Path, PathBuf};

/// Directories searched for conntrack counter files.
///
/// Older kernels expose `ip_conntrack_*` under `ipv4/netfilter`, newer ones
/// expose `nf_conntrack_*` under `netfilter`. A host has at most one of them.
pub const DEFAULT_DIRS: &[&str] = &["/proc/sys/net/ipv4/netfilter", "/proc/sys/net/netfilter"];

/// Superset of counter file names looked up in every directory.
pub const DEFAULT_FILES: &[&str] = &[
    "ip_conntrack_count",
    "ip_conntrack_max",
    "nf_conntrack_count",
    "nf_conntrack_max",
];

/// Default mount point of the proc filesystem.
pub const DEFAULT_PROC_PATH: &str = "/proc";

/// Settings for one conntrack collector instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directories to search, in order. Empty means [`DEFAULT_DIRS`].
    pub dirs: Vec<PathBuf>,
    /// Candidate file names, in order. Empty means [`DEFAULT_FILES`].
    pub files: Vec<String>,
    /// Whether to query the statistics provider at all.
    pub collect_stats: bool,
    /// Report statistics per CPU instead of one aggregate.
    pub per_cpu: bool,
    /// Base path of the proc filesystem used by the statistics provider.
    pub proc_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            files: Vec::new(),
            collect_stats: true,
            per_cpu: false,
            proc_path: PathBuf::from(DEFAULT_PROC_PATH),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_collect_stats(mut self, collect_stats: bool) -> Self {
        self.collect_stats = collect_stats;
        self
    }

    pub fn with_per_cpu(mut self, per_cpu: bool) -> Self {
        self.per_cpu = per_cpu;
        self
    }

    pub fn with_proc_path(mut self, proc_path: impl Into<PathBuf>) -> Self {
        self.proc_path = proc_path.into();
        self
    }

    /// Directories to search this cycle, falling back to [`DEFAULT_DIRS`].
    pub fn effective_dirs(&self) -> Vec<&Path> {
        if self.dirs.is_empty() {
            DEFAULT_DIRS.iter().map(Path::new).collect()
        } else {
            self.dirs.iter().map(PathBuf::as_path).collect()
        }
    }

    /// Candidate file names this cycle, falling back to [`DEFAULT_FILES`].
    pub fn effective_files(&self) -> Vec<&str> {
        if self.files.is_empty() {
            DEFAULT_FILES.to_vec()
        } else {
            self.files.iter().map(String::as_str).collect()
        }
    }
}
