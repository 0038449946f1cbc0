//! One conntrack collection cycle.
//!
//! The `ConntrackCollector` runs the file pass and then the statistics pass,
//! and decides whether the cycle as a whole succeeded.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::MEASUREMENT_NAME;
use crate::collector::error::CollectError;
use crate::collector::files::FileCounterCollector;
use crate::collector::stats::StatsCollector;
use crate::collector::traits::{FileSystem, StatsProvider};
use crate::config::Config;
use crate::model::Measurement;
use crate::sink::Accumulator;

/// Timing information for each phase of a cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectorTiming {
    /// Total cycle time.
    pub total: Duration,
    /// Time spent reading counter files.
    pub files: Duration,
    /// Time spent in the statistics provider.
    pub stats: Duration,
}

/// Collector for conntrack counters and statistics.
///
/// `gather` takes `&mut self`, so one instance never runs two cycles at once.
pub struct ConntrackCollector<F: FileSystem, P: StatsProvider> {
    config: Config,
    files: FileCounterCollector<F>,
    stats: StatsCollector<P>,
    last_timing: Option<CollectorTiming>,
}

impl<F: FileSystem, P: StatsProvider> ConntrackCollector<F, P> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem used for counter files (real or mock)
    /// * `provider` - Source of conntrack statistics
    /// * `config` - Directories, candidate files and statistics options
    pub fn new(fs: F, provider: P, config: Config) -> Self {
        Self {
            config,
            files: FileCounterCollector::new(fs),
            stats: StatsCollector::new(provider),
            last_timing: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats_provider(&self) -> &P {
        self.stats.provider()
    }

    /// Timing of the most recent `gather` call.
    pub fn last_timing(&self) -> Option<CollectorTiming> {
        self.last_timing
    }

    /// Runs one collection cycle into `acc`.
    ///
    /// Statistics are collected (when enabled) whatever the file pass
    /// found. The cycle fails with [`CollectError::ModuleNotLoaded`] only
    /// if no counter file produced a value; the fields record is not
    /// emitted in that case.
    pub fn gather(&mut self, acc: &mut impl Accumulator) -> Result<(), CollectError> {
        let start = Instant::now();
        let mut timing = CollectorTiming::default();

        let t = Instant::now();
        let fields = self.files.collect(&self.config, acc);
        timing.files = t.elapsed();

        if self.config.collect_stats {
            let t = Instant::now();
            self.stats.collect(self.config.per_cpu, acc);
            timing.stats = t.elapsed();
        }

        timing.total = start.elapsed();
        self.last_timing = Some(timing);
        debug!(
            total_us = timing.total.as_micros() as u64,
            files_us = timing.files.as_micros() as u64,
            stats_us = timing.stats.as_micros() as u64,
            "conntrack cycle finished"
        );

        if fields.is_empty() {
            return Err(CollectError::ModuleNotLoaded);
        }

        acc.add_measurement(Measurement::fields(MEASUREMENT_NAME, fields));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::RealFs;
    use crate::collector::error::GatherError;
    use crate::collector::mock::{MockFs, MockStatsProvider};
    use crate::model::{ConntrackStat, FieldValue, MeasurementKind};
    use crate::sink::MemoryAccumulator;

    fn fields_record(acc: &MemoryAccumulator) -> Option<&Measurement> {
        acc.measurements
            .iter()
            .find(|m| m.kind == MeasurementKind::Untyped)
    }

    #[test]
    fn test_gather_modern_kernel() {
        let provider = MockStatsProvider::returning(vec![ConntrackStat {
            entries: 42,
            ..Default::default()
        }]);
        let mut collector = ConntrackCollector::new(MockFs::modern_kernel(), provider, Config::default());
        let mut acc = MemoryAccumulator::new();

        collector.gather(&mut acc).unwrap();

        assert_eq!(acc.measurements.len(), 2);
        let fields = fields_record(&acc).unwrap();
        assert_eq!(fields.name, "conntrack");
        assert!(fields.tags.is_empty());
        assert_eq!(fields.field("ip_conntrack_count"), Some(FieldValue::Float(42.0)));
        assert_eq!(fields.field("ip_conntrack_max"), Some(FieldValue::Float(262144.0)));

        let counters: Vec<_> = acc
            .measurements
            .iter()
            .filter(|m| m.kind == MeasurementKind::Counter)
            .collect();
        assert_eq!(counters.len(), 1);
        assert_eq!(counters[0].tag("cpu"), Some("all"));
        assert!(collector.last_timing().is_some());
    }

    #[test]
    fn test_no_files_found() {
        let provider = MockStatsProvider::returning(Vec::new());
        let config = Config::new()
            .with_dirs(["./foo/bar"])
            .with_files(["baz.txt"]);
        let mut collector = ConntrackCollector::new(MockFs::new(), provider, config);
        let mut acc = MemoryAccumulator::new();

        let err = collector.gather(&mut acc).unwrap_err();

        assert_eq!(err, CollectError::ModuleNotLoaded);
        assert_eq!(
            err.to_string(),
            "conntrack input failed to collect metrics: is the conntrack kernel module loaded?"
        );
        assert!(fields_record(&acc).is_none());
    }

    #[test]
    fn test_stats_still_emitted_when_files_missing() {
        let provider = MockStatsProvider::returning(vec![ConntrackStat::default()]);
        let mut collector = ConntrackCollector::new(MockFs::no_conntrack(), provider, Config::default());
        let mut acc = MemoryAccumulator::new();

        assert!(collector.gather(&mut acc).is_err());
        assert_eq!(acc.measurements.len(), 1);
        assert_eq!(acc.measurements[0].kind, MeasurementKind::Counter);
    }

    #[test]
    fn test_stats_disabled_skips_provider() {
        let provider = MockStatsProvider::returning(vec![ConntrackStat::default()]);
        let config = Config::new().with_collect_stats(false);
        let mut collector = ConntrackCollector::new(MockFs::legacy_kernel(), provider, config);
        let mut acc = MemoryAccumulator::new();

        collector.gather(&mut acc).unwrap();

        assert_eq!(collector.stats_provider().calls(), 0);
        assert_eq!(acc.measurements.len(), 1);
        assert_eq!(
            acc.measurements[0].field("ip_conntrack_count"),
            Some(FieldValue::Float(17.0))
        );
    }

    #[test]
    fn test_provider_failure_does_not_fail_cycle() {
        let provider = MockStatsProvider::failing("stat table unavailable");
        let mut collector = ConntrackCollector::new(MockFs::modern_kernel(), provider, Config::default());
        let mut acc = MemoryAccumulator::new();

        collector.gather(&mut acc).unwrap();

        assert_eq!(acc.measurements.len(), 1);
        assert_eq!(acc.errors.len(), 1);
        assert!(matches!(acc.errors[0], GatherError::Stats(_)));
    }

    #[test]
    fn test_per_cpu_flag_forwarded() {
        let provider = MockStatsProvider::returning(vec![ConntrackStat::default(); 2]);
        let config = Config::new().with_per_cpu(true);
        let mut collector = ConntrackCollector::new(MockFs::modern_kernel(), provider, config);
        let mut acc = MemoryAccumulator::new();

        collector.gather(&mut acc).unwrap();

        assert_eq!(collector.stats_provider().last_per_cpu(), Some(true));
        let tags: Vec<_> = acc
            .measurements
            .iter()
            .filter_map(|m| m.tag("cpu"))
            .collect();
        assert_eq!(tags, vec!["cpu0", "cpu1"]);
    }

    #[test]
    fn test_consecutive_cycles_are_identical() {
        let provider = MockStatsProvider::returning(vec![ConntrackStat::default(); 3]);
        let config = Config::new().with_per_cpu(true);
        let mut collector = ConntrackCollector::new(MockFs::modern_kernel(), provider, config);

        let mut first = MemoryAccumulator::new();
        collector.gather(&mut first).unwrap();
        let mut second = MemoryAccumulator::new();
        collector.gather(&mut second).unwrap();

        assert_eq!(first.measurements, second.measurements);
        assert_eq!(collector.stats_provider().calls(), 2);
    }

    #[test]
    fn test_defaults_used_on_real_fs() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("ip_conntrack_count"), "1234321").unwrap();
        let config = Config::new()
            .with_dirs([tmp.path()])
            .with_files(["ip_conntrack_count"])
            .with_collect_stats(false);
        let mut collector = ConntrackCollector::new(RealFs::new(), MockStatsProvider::default(), config);
        let mut acc = MemoryAccumulator::new();

        collector.gather(&mut acc).unwrap();

        assert!(acc.errors.is_empty());
        assert_eq!(acc.measurements.len(), 1);
        let record = &acc.measurements[0];
        assert_eq!(record.fields.len(), 1);
        assert_eq!(
            record.field("ip_conntrack_count"),
            Some(FieldValue::Float(1234321.0))
        );
    }

    #[test]
    fn test_configs_used_on_real_fs() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("nf_conntrack_count"), "1234321\n").unwrap();
        std::fs::write(tmp.path().join("nf_conntrack_max"), "9999999\n").unwrap();
        let config = Config::new()
            .with_dirs([tmp.path()])
            .with_files(["nf_conntrack_count", "nf_conntrack_max"])
            .with_collect_stats(false);
        let mut collector = ConntrackCollector::new(RealFs::new(), MockStatsProvider::default(), config);
        let mut acc = MemoryAccumulator::new();

        collector.gather(&mut acc).unwrap();

        let record = &acc.measurements[0];
        assert_eq!(
            record.field("ip_conntrack_count"),
            Some(FieldValue::Float(1234321.0))
        );
        assert_eq!(
            record.field("ip_conntrack_max"),
            Some(FieldValue::Float(9999999.0))
        );
    }
}
