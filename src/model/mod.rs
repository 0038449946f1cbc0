//! Data models shared by the collectors, the sink and the output writer.
//!
//! - [`measurement`]: what a collection cycle emits (name, kind, tags, fields)
//! - [`conntrack`]: raw conntrack statistics as returned by a provider

mod conntrack;
mod measurement;

pub use conntrack::{ConntrackStat, STAT_FIELD_NAMES};
pub use measurement::{FieldValue, Fields, Measurement, MeasurementKind, Tags};
