//! Measurement records handed to the metrics pipeline.
//!
//! A measurement carries no timestamp. The output writer stamps every record
//! of a cycle with the same wall-clock time, which keeps collection itself
//! deterministic for a given filesystem and provider state.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Tag set of a measurement, ordered by key.
pub type Tags = BTreeMap<String, String>;

/// Field set of a measurement, ordered by key.
pub type Fields = BTreeMap<String, FieldValue>;

/// How the pipeline should interpret the field values.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Point-in-time values with no declared semantics.
    #[default]
    Untyped,
    /// Monotonic cumulative values (since boot).
    Counter,
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementKind::Untyped => write!(f, "untyped"),
            MeasurementKind::Counter => write!(f, "counter"),
        }
    }
}

/// A single numeric field value.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Unsigned(u64),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Unsigned(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Unsigned(v) => Some(*v),
            FieldValue::Float(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Unsigned(v)
    }
}

/// One record emitted by a collection cycle.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct Measurement {
    pub name: String,
    pub kind: MeasurementKind,
    pub tags: Tags,
    pub fields: Fields,
}

impl Measurement {
    /// Fields-only record without tags.
    pub fn fields(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into(),
            kind: MeasurementKind::Untyped,
            tags: Tags::new(),
            fields,
        }
    }

    /// Tagged counter record.
    pub fn counter(name: impl Into<String>, fields: Fields, tags: Tags) -> Self {
        Self {
            name: name.into(),
            kind: MeasurementKind::Counter,
            tags,
            fields,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.fields.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_accessors() {
        assert_eq!(FieldValue::from(1.5).as_f64(), Some(1.5));
        assert_eq!(FieldValue::from(1.5).as_u64(), None);
        assert_eq!(FieldValue::from(7u64).as_u64(), Some(7));
        assert_eq!(FieldValue::from(7u64).as_f64(), None);
    }

    #[test]
    fn test_measurement_constructors() {
        let mut fields = Fields::new();
        fields.insert("ip_conntrack_count".into(), 12.0.into());
        let m = Measurement::fields("conntrack", fields.clone());
        assert_eq!(m.kind, MeasurementKind::Untyped);
        assert!(m.tags.is_empty());
        assert_eq!(m.field("ip_conntrack_count"), Some(FieldValue::Float(12.0)));

        let mut tags = Tags::new();
        tags.insert("cpu".into(), "all".into());
        let m = Measurement::counter("conntrack", fields, tags);
        assert_eq!(m.kind, MeasurementKind::Counter);
        assert_eq!(m.tag("cpu"), Some("all"));
        assert_eq!(m.tag("host"), None);
    }

    #[test]
    fn test_measurement_json_shape() {
        let mut fields = Fields::new();
        fields.insert("entries".into(), 3u64.into());
        fields.insert("ip_conntrack_max".into(), 65536.0.into());
        let mut tags = Tags::new();
        tags.insert("cpu".into(), "cpu0".into());
        let m = Measurement::counter("conntrack", fields, tags);

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["kind"], "counter");
        assert_eq!(json["tags"]["cpu"], "cpu0");
        assert_eq!(json["fields"]["entries"], 3);
        assert_eq!(json["fields"]["ip_conntrack_max"], 65536.0);
    }
}
