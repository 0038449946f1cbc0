//! Parsers for conntrack files under `/proc`.
//!
//! These are pure functions over file contents, so they are tested with
//! plain string inputs.

use crate::model::ConntrackStat;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parses a single-value counter file such as `nf_conntrack_count`.
///
/// Surrounding whitespace is ignored. Integer and floating point literals
/// are both accepted and returned as `f64`. `NaN` and infinities are
/// rejected: a counter is always a finite number.
pub fn parse_counter_value(content: &str) -> Result<f64, ParseError> {
    let value = content.trim();
    let parsed = value.parse::<f64>().map_err(|e| {
        ParseError::new(format!("expected number but found '{}': {}", value, e))
    })?;
    if !parsed.is_finite() {
        return Err(ParseError::new(format!(
            "expected finite number but found '{}'",
            value
        )));
    }
    Ok(parsed)
}

/// Parses `/proc/net/stat/nf_conntrack`.
///
/// The first line names the columns; every following line holds one
/// processing unit's counters in hexadecimal. Columns are matched by name so
/// kernels that add or drop columns still parse. Unknown columns are
/// ignored, missing ones stay zero.
///
/// ```text
/// entries  searched found new invalid ignore delete delete_list insert ...
/// 0000002a  00000000 00000000 00000000 00000a3b 00004f3c 00000000 ...
/// ```
pub fn parse_nf_conntrack_stat(content: &str) -> Result<Vec<ConntrackStat>, ParseError> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| ParseError::new("missing header in nf_conntrack stat"))?
        .split_whitespace()
        .collect();

    let mut stats = Vec::new();
    for (row, line) in lines.enumerate() {
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() != header.len() {
            return Err(ParseError::new(format!(
                "row {}: expected {} columns, got {}",
                row,
                header.len(),
                values.len()
            )));
        }

        let mut stat = ConntrackStat::default();
        for (name, raw) in header.iter().zip(values) {
            let value = u64::from_str_radix(raw, 16).map_err(|_| {
                ParseError::new(format!("row {}: invalid {} '{}'", row, name, raw))
            })?;
            stat.set(name, value);
        }
        stats.push(stat);
    }

    Ok(stats)
}
