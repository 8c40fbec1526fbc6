//! Async flavour of the drivers and the knob, over `embedded-hal-async`.
//!
//! Semantics match the blocking API exactly; only the bus calls await.

mod as5048a;
mod as5600;

pub use as5048a::As5048a;
pub use as5600::As5600;

use crate::{
    diagnostics::Diagnostics,
    error::Error,
    integrator::{Integrator, Scale},
    knob::{Reading, accept, integrate},
};

/// Async counterpart of [`crate::AngleSensor`]
#[allow(async_fn_in_trait)]
pub trait AngleSensor {
    /// Error type of the underlying bus
    type BusError;

    /// Resolution, bound and rotation sense for this sensor family
    const SCALE: Scale;

    /// Read one raw angle sample in `[0, SCALE.resolution())`
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer or the protocol exchange fails.
    async fn read_angle(&mut self) -> Result<u16, Error<Self::BusError>>;

    /// Read the diagnostic flags and gain
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer or the protocol exchange fails.
    async fn read_diagnostics(&mut self) -> Result<Diagnostics, Error<Self::BusError>>;
}

/// Rotary knob driven by an async angle sensor
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

    /// Run one iteration, see [`crate::Knob::step`]
    ///
    /// The position is only touched after the last await, so dropping the
    /// future midway leaves it as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor read fails or its diagnostics reject
    /// the sample.
    pub async fn step(&mut self) -> Result<Reading, Error<S::BusError>> {
        let diagnostics = self.sensor.read_diagnostics().await?;
        let gain = accept(diagnostics)?;
        let sample = self.sensor.read_angle().await?;
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
