//! ctprobe - conntrack metrics probe.
//!
//! Provides:
//! - `collector` — counter file discovery, statistics provider, collection cycle
//! - `config` — collector settings and built-in defaults
//! - `model` — measurements and raw conntrack statistics
//! - `sink` — measurement accumulator
//! - `output` — rendering measurements for the metrics pipeline

pub mod collector;
pub mod config;
pub mod model;
pub mod output;
pub mod sink;
