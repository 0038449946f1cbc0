//! Scriptable statistics provider.

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::collector::error::StatsError;
use crate::collector::traits::StatsProvider;
use crate::model::ConntrackStat;

/// [`StatsProvider`] returning canned results and recording its calls.
#[derive(Debug, Default)]
pub struct MockStatsProvider {
    stats: Vec<ConntrackStat>,
    failure: Option<String>,
    calls: AtomicUsize,
    last_per_cpu: Mutex<Option<bool>>,
}

impl MockStatsProvider {
    /// Provider that returns `stats` regardless of the per-CPU flag.
    pub fn returning(stats: Vec<ConntrackStat>) -> Self {
        Self {
            stats,
            ..Default::default()
        }
    }

    /// Provider whose every call fails with an I/O error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// Number of times the provider has been queried.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Per-CPU flag passed on the most recent call.
    pub fn last_per_cpu(&self) -> Option<bool> {
        self.last_per_cpu.lock().ok().and_then(|g| *g)
    }
}

impl StatsProvider for MockStatsProvider {
    fn conntrack_stats(&self, per_cpu: bool) -> Result<Vec<ConntrackStat>, StatsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_per_cpu.lock() {
            *last = Some(per_cpu);
        }

        match &self.failure {
            Some(message) => Err(StatsError::Io(io::Error::other(message.clone()))),
            None => Ok(self.stats.clone()),
        }
    }
}
