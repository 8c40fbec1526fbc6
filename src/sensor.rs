use crate::{diagnostics::Diagnostics, error::Error, integrator::Scale};

/// Capability shared by every absolute angle sensor the knob can run on
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
    fn read_angle(&mut self) -> Result<u16, Error<Self::BusError>>;

    /// Read the diagnostic flags and gain
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer or the protocol exchange fails.
    fn read_diagnostics(&mut self) -> Result<Diagnostics, Error<Self::BusError>>;
}
