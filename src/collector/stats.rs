//! Conntrack statistics reshaped into tagged counter measurements.

use tracing::debug;

use crate::collector::MEASUREMENT_NAME;
use crate::collector::error::GatherError;
use crate::collector::traits::StatsProvider;
use crate::model::{Measurement, Tags};
use crate::sink::Accumulator;

/// Tag key identifying the processing unit of a record.
pub const CPU_TAG: &str = "cpu";

/// Tag value of an aggregate record.
pub const ALL_CPUS: &str = "all";

/// Queries a [`StatsProvider`] and emits one counter record per entry.
pub struct StatsCollector<P: StatsProvider> {
    provider: P,
}

impl<P: StatsProvider> StatsCollector<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Calls the provider once and emits its entries in provider order.
    ///
    /// Entries are tagged `cpu<i>` by position when `per_cpu` is set and
    /// `all` otherwise. A provider failure is reported to `acc` and nothing
    /// is emitted. Returns the number of records emitted.
    pub fn collect(&self, per_cpu: bool, acc: &mut impl Accumulator) -> usize {
        let stats = match self.provider.conntrack_stats(per_cpu) {
            Ok(stats) => stats,
            Err(e) => {
                acc.add_error(GatherError::Stats(e));
                return 0;
            }
        };

        for (i, stat) in stats.iter().enumerate() {
            let mut tags = Tags::new();
            tags.insert(CPU_TAG.to_string(), cpu_tag(per_cpu, i));
            acc.add_measurement(Measurement::counter(
                MEASUREMENT_NAME,
                stat.to_fields(),
                tags,
            ));
        }

        debug!(records = stats.len(), per_cpu, "conntrack statistics collected");
        stats.len()
    }
}

fn cpu_tag(per_cpu: bool, index: usize) -> String {
    if per_cpu {
        format!("cpu{}", index)
    } else {
        ALL_CPUS.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockStatsProvider;
    use crate::model::{ConntrackStat, FieldValue, MeasurementKind, STAT_FIELD_NAMES};
    use crate::sink::MemoryAccumulator;

    fn fixed_stat() -> ConntrackStat {
        ConntrackStat {
            entries: 1234,
            searched: 10,
            found: 1,
            new: 5,
            invalid: 43,
            ignore: 13,
            delete: 3,
            delete_list: 5,
            insert: 9,
            insert_failed: 20,
            drop: 49,
            early_drop: 7,
            icmp_error: 21,
            expect_new: 12,
            expect_create: 44,
            expect_delete: 53,
            search_restart: 31,
        }
    }

    #[test]
    fn test_aggregate_record() {
        let collector = StatsCollector::new(MockStatsProvider::returning(vec![fixed_stat()]));
        let mut acc = MemoryAccumulator::new();

        assert_eq!(collector.collect(false, &mut acc), 1);
        assert_eq!(collector.provider().last_per_cpu(), Some(false));

        let record = &acc.measurements[0];
        assert_eq!(record.name, "conntrack");
        assert_eq!(record.kind, MeasurementKind::Counter);
        assert_eq!(record.tags.len(), 1);
        assert_eq!(record.tag("cpu"), Some("all"));

        let expected = [
            ("entries", 1234),
            ("searched", 10),
            ("found", 1),
            ("new", 5),
            ("invalid", 43),
            ("ignore", 13),
            ("delete", 3),
            ("delete_list", 5),
            ("insert", 9),
            ("insert_failed", 20),
            ("drop", 49),
            ("early_drop", 7),
            ("icmp_error", 21),
            ("expect_new", 12),
            ("expect_create", 44),
            ("expect_delete", 53),
            ("search_restart", 31),
        ];
        assert_eq!(record.fields.len(), expected.len());
        for (name, value) in expected {
            assert_eq!(record.field(name), Some(FieldValue::Unsigned(value)), "{}", name);
        }
        assert!(acc.errors.is_empty());
    }

    #[test]
    fn test_per_cpu_records_in_provider_order() {
        let stats: Vec<ConntrackStat> = (0..3)
            .map(|i| ConntrackStat {
                searched: i * 100,
                ..Default::default()
            })
            .collect();
        let collector = StatsCollector::new(MockStatsProvider::returning(stats));
        let mut acc = MemoryAccumulator::new();

        assert_eq!(collector.collect(true, &mut acc), 3);
        assert_eq!(collector.provider().last_per_cpu(), Some(true));

        for (i, record) in acc.measurements.iter().enumerate() {
            assert_eq!(record.tag("cpu"), Some(format!("cpu{}", i).as_str()));
            assert_eq!(
                record.field("searched"),
                Some(FieldValue::Unsigned(i as u64 * 100))
            );
            assert_eq!(record.fields.len(), STAT_FIELD_NAMES.len());
        }
    }

    #[test]
    fn test_multiple_entries_without_per_cpu_all_tagged_all() {
        let collector = StatsCollector::new(MockStatsProvider::returning(vec![
            fixed_stat(),
            ConntrackStat::default(),
        ]));
        let mut acc = MemoryAccumulator::new();

        assert_eq!(collector.collect(false, &mut acc), 2);
        assert!(acc.measurements.iter().all(|m| m.tag("cpu") == Some("all")));
    }

    #[test]
    fn test_provider_failure_is_non_fatal() {
        let collector = StatsCollector::new(MockStatsProvider::failing("no such file"));
        let mut acc = MemoryAccumulator::new();

        assert_eq!(collector.collect(false, &mut acc), 0);
        assert!(acc.measurements.is_empty());
        assert_eq!(acc.errors.len(), 1);
        assert!(acc.errors[0].to_string().contains("no such file"));
    }

    #[test]
    fn test_empty_provider_result() {
        let collector = StatsCollector::new(MockStatsProvider::returning(Vec::new()));
        let mut acc = MemoryAccumulator::new();

        assert_eq!(collector.collect(true, &mut acc), 0);
        assert!(acc.measurements.is_empty());
        assert!(acc.errors.is_empty());
    }
}
