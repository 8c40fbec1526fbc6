//! One read-validate-integrate-map pass over an angle sensor.

use core::fmt;

use crate::{
    diagnostics::Diagnostics,
    error::Error,
    integrator::Integrator,
    output::OutputLevel,
    sensor::AngleSensor,
};

/// Outcome of a successful knob step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Raw angle sample that was integrated
    pub sample: u16,
    /// Sensor gain reported alongside the sample
    pub gain: u8,
    /// Accumulator after the update
    pub accumulator: u16,
    /// Output derived from the accumulator
    pub level: OutputLevel,
}

/// `[###---]  50.000000%  Magnetic field strength: 128`
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  Magnetic field strength: {}", self.level, self.gain)
    }
}

/// Rotary knob driven by an absolute angle sensor
#[derive(Debug)]
pub struct Knob<S> {
    sensor: S,
    integrator: Integrator,
}

impl<S: AngleSensor> Knob<S> {
    /// Start a knob at position zero
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            integrator: Integrator::new(S::SCALE),
        }
    }

    /// Run one iteration
    ///
    /// Reads diagnostics, rejects unusable samples, reads the angle and only
    /// then folds it into the position. Any failure leaves the position and
    /// the remembered sample untouched, so the caller can simply try again.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor read fails or its diagnostics reject
    /// the sample.
    pub fn step(&mut self) -> Result<Reading, Error<S::BusError>> {
        let diagnostics = self.sensor.read_diagnostics()?;
        let gain = accept(diagnostics)?;
        let sample = self.sensor.read_angle()?;
        Ok(integrate(&mut self.integrator, sample, gain))
    }

    /// Borrow the sensor, e.g. for extra register reads between steps
    pub fn sensor(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Release the sensor, consuming the knob
    pub fn release(self) -> S {
        self.sensor
    }
}

impl<S> Knob<S> {
    /// Integrator state after the last accepted sample
    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// Current position in `[0, bound]`
    pub fn position(&self) -> u16 {
        self.integrator.accumulator()
    }
}

pub(crate) fn accept<E>(diagnostics: Diagnostics) -> Result<u8, Error<E>> {
    diagnostics.validate().map_err(|rejection| {
        #[cfg(feature = "defmt")]
        defmt::warn!("Sample rejected: {}", rejection);
        Error::Rejected(rejection)
    })
}

pub(crate) fn integrate(integrator: &mut Integrator, sample: u16, gain: u8) -> Reading {
    let accumulator = integrator.update(sample);
    Reading {
        sample,
        gain,
        accumulator,
        level: OutputLevel::new(accumulator, integrator.scale().bound()),
    }
}
