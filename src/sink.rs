//! Measurement sink.
//!
//! Collectors push measurements and non-fatal errors into an
//! [`Accumulator`]. A failed cycle is signalled separately through the
//! collector's return value.

use crate::collector::error::GatherError;
use crate::model::Measurement;

/// Receiver for everything a collection cycle produces.
pub trait Accumulator {
    /// Records one measurement.
    fn add_measurement(&mut self, measurement: Measurement);

    /// Records a non-fatal error. Collection continues afterwards.
    fn add_error(&mut self, error: GatherError);
}

impl<A: Accumulator + ?Sized> Accumulator for &mut A {
    fn add_measurement(&mut self, measurement: Measurement) {
        (**self).add_measurement(measurement);
    }

    fn add_error(&mut self, error: GatherError) {
        (**self).add_error(error);
    }
}

/// Accumulator that keeps everything in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryAccumulator {
    pub measurements: Vec<Measurement>,
    pub errors: Vec<GatherError>,
}

impl MemoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the collected measurements and errors.
    pub fn take(&mut self) -> (Vec<Measurement>, Vec<GatherError>) {
        (
            std::mem::take(&mut self.measurements),
            std::mem::take(&mut self.errors),
        )
    }
}

impl Accumulator for MemoryAccumulator {
    fn add_measurement(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    fn add_error(&mut self, error: GatherError) {
        self.errors.push(error);
    }
}
