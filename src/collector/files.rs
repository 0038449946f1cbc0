//! Counter files under `/proc/sys/net/.../netfilter`.
//!
//! Kernels expose the same counters under two naming schemes
//! (`ip_conntrack_*` on old kernels, `nf_conntrack_*` on current ones) and in
//! two directories. Every candidate is normalized to one key space so the
//! emitted field names do not depend on the kernel version.

use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::collector::error::GatherError;
use crate::collector::procfs::parser::{ParseError, parse_counter_value};
use crate::collector::traits::FileSystem;
use crate::config::Config;
use crate::model::{FieldValue, Fields};
use crate::sink::Accumulator;

/// Prefix shared by every normalized field name.
pub const METRIC_KEY_PREFIX: &str = "ip_";

/// Normalizes a candidate file name into a field name.
///
/// Everything up to and including the first underscore is replaced by
/// [`METRIC_KEY_PREFIX`], so `nf_conntrack_count` and `ip_conntrack_count`
/// both become `ip_conntrack_count`. Names without an underscore yield
/// `None`.
pub fn metric_key(file_name: &str) -> Option<String> {
    let (_, suffix) = file_name.split_once('_')?;
    Some(format!("{}{}", METRIC_KEY_PREFIX, suffix))
}

/// Reads single-value counter files from a set of directories.
pub struct FileCounterCollector<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> FileCounterCollector<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Walks every configured directory and candidate file.
    ///
    /// Directories are the outer loop and files the inner one: when several
    /// pairs produce the same key, the last one read wins. Missing files and
    /// directories are skipped silently; read and parse failures are
    /// reported to `acc` and skipped.
    pub fn collect(&self, config: &Config, acc: &mut impl Accumulator) -> Fields {
        let dirs = config.effective_dirs();
        let files = config.effective_files();
        let mut fields = Fields::new();

        for dir in &dirs {
            for file in &files {
                let Some(key) = metric_key(file) else {
                    debug!(file = %file, "skipping candidate without underscore");
                    continue;
                };
                if let Some(value) = self.read_counter(dir, file, acc) {
                    fields.insert(key, FieldValue::Float(value));
                }
            }
        }

        debug!(
            dirs = dirs.len(),
            candidates = files.len(),
            fields = fields.len(),
            "conntrack counter files collected"
        );
        fields
    }

    fn read_counter(&self, dir: &Path, file: &str, acc: &mut impl Accumulator) -> Option<f64> {
        let path = dir.join(file);
        if !self.fs.exists(&path) {
            return None;
        }

        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            // Not UTF-8: the file was read, its content is not a number.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                let source = ParseError::new(format!("expected number but found {}", e));
                acc.add_error(GatherError::Parse { path, source });
                return None;
            }
            Err(source) => {
                acc.add_error(GatherError::Read { path, source });
                return None;
            }
        };

        match parse_counter_value(&content) {
            Ok(value) => {
                trace!(path = %path.display(), value, "read conntrack counter");
                Some(value)
            }
            Err(source) => {
                acc.add_error(GatherError::Parse { path, source });
                None
            }
        }
    }
}
