//! Raw conntrack statistics.
//!
//! Field names match the column header of `/proc/net/stat/nf_conntrack`.

use serde::Serialize;

use super::measurement::{FieldValue, Fields};

/// Names of the counters reported for every processing unit, in kernel order.
pub const STAT_FIELD_NAMES: [&str; 17] = [
    "entries",
    "searched",
    "found",
    "new",
    "invalid",
    "ignore",
    "delete",
    "delete_list",
    "insert",
    "insert_failed",
    "drop",
    "early_drop",
    "icmp_error",
    "expect_new",
    "expect_create",
    "expect_delete",
    "search_restart",
];

/// Conntrack statistics of one processing unit, or of the whole host.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq, Default)]
pub struct ConntrackStat {
    /// Entries in the conntrack table.
    pub entries: u64,
    /// Table lookups performed.
    pub searched: u64,
    /// Lookups that found an entry.
    pub found: u64,
    /// Entries added that were not expected before.
    pub new: u64,
    /// Packets that could not be tracked.
    pub invalid: u64,
    /// Packets already attached to an entry.
    pub ignore: u64,
    /// Entries removed.
    pub delete: u64,
    /// Entries put on the dying list.
    pub delete_list: u64,
    /// Entries inserted into the table.
    pub insert: u64,
    /// Insertions that failed because the entry already existed.
    pub insert_failed: u64,
    /// Packets dropped due to a conntrack failure.
    pub drop: u64,
    /// Entries dropped to make room when the table was full.
    pub early_drop: u64,
    /// Subset of `invalid`: untrackable because of an ICMP error.
    pub icmp_error: u64,
    /// Entries added after an expectation was already present.
    pub expect_new: u64,
    /// Expectations added.
    pub expect_create: u64,
    /// Expectations deleted.
    pub expect_delete: u64,
    /// Lookups restarted due to hash table resizes.
    pub search_restart: u64,
}

impl ConntrackStat {
    /// Sets a counter by its column name. Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: u64) -> bool {
        match self.counter_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Returns a counter by its column name.
    pub fn get(&self, name: &str) -> Option<u64> {
        let value = match name {
            "entries" => self.entries,
            "searched" => self.searched,
            "found" => self.found,
            "new" => self.new,
            "invalid" => self.invalid,
            "ignore" => self.ignore,
            "delete" => self.delete,
            "delete_list" => self.delete_list,
            "insert" => self.insert,
            "insert_failed" => self.insert_failed,
            "drop" => self.drop,
            "early_drop" => self.early_drop,
            "icmp_error" => self.icmp_error,
            "expect_new" => self.expect_new,
            "expect_create" => self.expect_create,
            "expect_delete" => self.expect_delete,
            "search_restart" => self.search_restart,
            _ => return None,
        };
        Some(value)
    }

    fn counter_mut(&mut self, name: &str) -> Option<&mut u64> {
        let slot = match name {
            "entries" => &mut self.entries,
            "searched" => &mut self.searched,
            "found" => &mut self.found,
            "new" => &mut self.new,
            "invalid" => &mut self.invalid,
            "ignore" => &mut self.ignore,
            "delete" => &mut self.delete,
            "delete_list" => &mut self.delete_list,
            "insert" => &mut self.insert,
            "insert_failed" => &mut self.insert_failed,
            "drop" => &mut self.drop,
            "early_drop" => &mut self.early_drop,
            "icmp_error" => &mut self.icmp_error,
            "expect_new" => &mut self.expect_new,
            "expect_create" => &mut self.expect_create,
            "expect_delete" => &mut self.expect_delete,
            "search_restart" => &mut self.search_restart,
            _ => return None,
        };
        Some(slot)
    }

    /// Adds every counter of `other` into `self`, saturating at `u64::MAX`.
    ///
    /// `entries` is left alone: the kernel repeats the global table size on
    /// every per-CPU row, so summing it would overcount.
    pub fn accumulate(&mut self, other: &ConntrackStat) {
        for name in STAT_FIELD_NAMES.iter().filter(|n| **n != "entries") {
            if let (Some(slot), Some(add)) = (self.counter_mut(name), other.get(name)) {
                *slot = slot.saturating_add(add);
            }
        }
    }

    /// The 17 counters as measurement fields.
    pub fn to_fields(&self) -> Fields {
        STAT_FIELD_NAMES
            .iter()
            .filter_map(|name| {
                self.get(name)
                    .map(|v| ((*name).to_string(), FieldValue::Unsigned(v)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_by_name() {
        let mut stat = ConntrackStat::default();
        assert!(stat.set("insert_failed", 20));
        assert!(stat.set("search_restart", 31));
        assert!(!stat.set("clash_resolve", 5));

        assert_eq!(stat.insert_failed, 20);
        assert_eq!(stat.get("search_restart"), Some(31));
        assert_eq!(stat.get("clash_resolve"), None);
    }

    #[test]
    fn test_to_fields_has_all_counters() {
        let stat = ConntrackStat {
            entries: 1234,
            drop: 49,
            ..Default::default()
        };
        let fields = stat.to_fields();

        assert_eq!(fields.len(), 17);
        for name in STAT_FIELD_NAMES {
            assert!(fields.contains_key(name), "missing field {}", name);
        }
        assert_eq!(fields["entries"], FieldValue::Unsigned(1234));
        assert_eq!(fields["drop"], FieldValue::Unsigned(49));
        assert_eq!(fields["found"], FieldValue::Unsigned(0));
    }

    #[test]
    fn test_accumulate_keeps_entries() {
        let mut total = ConntrackStat {
            entries: 100,
            searched: 10,
            ..Default::default()
        };
        let row = ConntrackStat {
            entries: 100,
            searched: 5,
            drop: u64::MAX,
            ..Default::default()
        };
        total.accumulate(&row);
        total.accumulate(&row);

        assert_eq!(total.entries, 100);
        assert_eq!(total.searched, 20);
        assert_eq!(total.drop, u64::MAX);
    }
}
