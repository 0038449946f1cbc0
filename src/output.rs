//! Rendering of measurements for the metrics pipeline.
//!
//! Two formats are supported: one JSON object per line, or line protocol
//! (`name[,tag=value...] field=value[,...] timestamp_ns`).

use std::fmt::Write as _;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::model::{FieldValue, Measurement};

/// Output encoding of emitted measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Line protocol.
    Line,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    measurement: &'a Measurement,
    timestamp: String,
}

/// Writes every measurement of one cycle, all stamped with `timestamp`.
pub fn write_measurements<W: Write>(
    out: &mut W,
    measurements: &[Measurement],
    format: OutputFormat,
    timestamp: DateTime<Utc>,
) -> io::Result<()> {
    for measurement in measurements {
        let line = match format {
            OutputFormat::Json => to_json_line(measurement, timestamp)?,
            OutputFormat::Line => to_line_protocol(measurement, timestamp),
        };
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

/// Encodes a measurement as a single JSON object.
pub fn to_json_line(measurement: &Measurement, timestamp: DateTime<Utc>) -> io::Result<String> {
    let record = JsonRecord {
        measurement,
        timestamp: timestamp.to_rfc3339(),
    };
    serde_json::to_string(&record).map_err(io::Error::other)
}

/// Encodes a measurement in line protocol.
///
/// Floats are written as plain decimals and unsigned counters with a `u`
/// suffix. A timestamp outside the nanosecond range is omitted.
pub fn to_line_protocol(measurement: &Measurement, timestamp: DateTime<Utc>) -> String {
    let mut line = escape(&measurement.name, &[',', ' ']);

    for (key, value) in &measurement.tags {
        let _ = write!(
            line,
            ",{}={}",
            escape(key, &[',', '=', ' ']),
            escape(value, &[',', '=', ' '])
        );
    }

    let fields: Vec<String> = measurement
        .fields
        .iter()
        .map(|(key, value)| {
            let value = match value {
                FieldValue::Float(v) => format!("{}", v),
                FieldValue::Unsigned(v) => format!("{}u", v),
            };
            format!("{}={}", escape(key, &[',', '=', ' ']), value)
        })
        .collect();
    line.push(' ');
    line.push_str(&fields.join(","));

    if let Some(ns) = timestamp.timestamp_nanos_opt() {
        let _ = write!(line, " {}", ns);
    }
    line
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
