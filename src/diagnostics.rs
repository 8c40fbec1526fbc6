//! Sensor diagnostics and the usable-sample decision.

use core::fmt;

const FIELD_TOO_WEAK: u16 = 0x0800;
const FIELD_TOO_STRONG: u16 = 0x0400;
const OVERFLOW: u16 = 0x0200;
const CALIBRATION_FINISHED: u16 = 0x0100;
const GAIN_MASK: u16 = 0x00FF;

/// Diagnostic flags and automatic gain control value
///
/// Stored in the layout of the AS5048A `DIAG_AGC` register (0x3FFD): COMP high
/// (bit 11), COMP low (bit 10), COF (bit 9), OCF (bit 8), AGC (bits 7..0).
/// Sensors without hardware diagnostics build one with [`Diagnostics::from_gain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    raw: u16,
}

impl Diagnostics {
    /// Create diagnostics from a raw `DIAG_AGC` value
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// Clean diagnostics carrying only a gain value
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn from_gain(gain: u8) -> Self {
        Self::new(CALIBRATION_FINISHED | gain as u16)
    }

    /// Get the raw register value
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.raw
    }

    /// Offset compensation has finished after power-up
    ///
    /// Angle data is meaningless until this is set.
    #[must_use]
    pub const fn calibration_finished(&self) -> bool {
        self.raw & CALIBRATION_FINISHED != 0
    }

    /// CORDIC overflow: angle and magnitude data are invalid
    #[must_use]
    pub const fn overflow(&self) -> bool {
        self.raw & OVERFLOW != 0
    }

    /// COMP low: magnetic field above the recommended range
    #[must_use]
    pub const fn field_too_strong(&self) -> bool {
        self.raw & FIELD_TOO_STRONG != 0
    }

    /// COMP high: magnetic field below the recommended range
    #[must_use]
    pub const fn field_too_weak(&self) -> bool {
        self.raw & FIELD_TOO_WEAK != 0
    }

    /// Automatic gain control value
    ///
    /// 0 means a strong field (magnet close), 255 a weak one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn gain(&self) -> u8 {
        (self.raw & GAIN_MASK) as u8
    }

    /// Decide whether a sample taken alongside these diagnostics is usable
    ///
    /// Several flags may be set at once; the first one in order
    /// calibration, overflow, too strong, too weak is reported.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] for the first failing flag.
    pub const fn validate(&self) -> Result<u8, Rejection> {
        if !self.calibration_finished() {
            Err(Rejection::CalibrationPending)
        } else if self.overflow() {
            Err(Rejection::Overflow)
        } else if self.field_too_strong() {
            Err(Rejection::FieldTooStrong { gain: self.gain() })
        } else if self.field_too_weak() {
            Err(Rejection::FieldTooWeak { gain: self.gain() })
        } else {
            Ok(self.gain())
        }
    }
}

/// Why a sample was not used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// Offset compensation still running
    CalibrationPending,
    /// CORDIC overflow
    Overflow,
    /// Magnet too close
    FieldTooStrong { gain: u8 },
    /// Magnet too far
    FieldTooWeak { gain: u8 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CalibrationPending => f.write_str("Calibration not finished"),
            Self::Overflow => f.write_str("CORDIC overflow"),
            Self::FieldTooStrong { gain } => {
                write!(f, "Magnetic field too strong (gain {gain})")
            }
            Self::FieldTooWeak { gain } => write!(f, "Magnetic field too weak (gain {gain})"),
        }
    }
}
