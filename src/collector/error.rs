//! Error types for a collection cycle.
//!
//! Only [`CollectError`] fails a cycle. Everything else is a [`GatherError`],
//! reported through the accumulator while sibling work continues.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::collector::procfs::parser::ParseError;

/// Fatal error for a whole collection cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    /// No configured counter file produced a value.
    ModuleNotLoaded,
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::ModuleNotLoaded => write!(
                f,
                "conntrack input failed to collect metrics: is the conntrack kernel module loaded?"
            ),
        }
    }
}

impl std::error::Error for CollectError {}

/// Failure of the statistics provider.
#[derive(Debug)]
pub enum StatsError {
    /// The statistics source could not be read.
    Io(io::Error),
    /// The statistics source was read but is malformed.
    Parse(ParseError),
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::Io(e) => write!(f, "I/O error: {}", e),
            StatsError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StatsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatsError::Io(e) => Some(e),
            StatsError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for StatsError {
    fn from(e: io::Error) -> Self {
        StatsError::Io(e)
    }
}

impl From<ParseError> for StatsError {
    fn from(e: ParseError) -> Self {
        StatsError::Parse(e)
    }
}

/// Non-fatal error recorded during a cycle.
#[derive(Debug)]
pub enum GatherError {
    /// A counter file exists but could not be read.
    Read { path: PathBuf, source: io::Error },
    /// A counter file did not contain a number.
    Parse { path: PathBuf, source: ParseError },
    /// The statistics provider failed.
    Stats(StatsError),
}

impl fmt::Display for GatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatherError::Read { path, source } => {
                write!(f, "failed to read file '{}': {}", path.display(), source)
            }
            GatherError::Parse { path, source } => {
                write!(
                    f,
                    "failed to parse metric in '{}': {}",
                    path.display(),
                    source
                )
            }
            GatherError::Stats(e) => {
                write!(f, "failed to retrieve conntrack statistics: {}", e)
            }
        }
    }
}

impl std::error::Error for GatherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatherError::Read { source, .. } => Some(source),
            GatherError::Parse { source, .. } => Some(source),
            GatherError::Stats(e) => Some(e),
        }
    }
}

impl From<StatsError> for GatherError {
    fn from(e: StatsError) -> Self {
        GatherError::Stats(e)
    }
}
