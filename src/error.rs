use core::fmt;

use crate::diagnostics::Rejection;

/// Error type for knob and sensor operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error on the bus (timeout, NACK, short transfer, ...)
    Communication(E),
    /// Parity error in received data
    ParityError,
    /// Error flag set by the sensor (framing, invalid command or parity error)
    SensorError,
    /// The sensor answered, but its diagnostics make the sample unusable
    Rejected(Rejection),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Communication(e) => write!(f, "Bus communication failed: {e:?}"),
            Self::ParityError => f.write_str("Parity error in sensor response"),
            Self::SensorError => f.write_str("Sensor reported a transmission error"),
            Self::Rejected(rejection) => rejection.fmt(f),
        }
    }
}

impl<E> From<Rejection> for Error<E> {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}
