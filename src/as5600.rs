//! Blocking driver for the AS5600 12-bit magnetic rotary position sensor (I2C)

use embedded_hal::i2c::I2c;

use crate::{
    diagnostics::Diagnostics,
    error::Error,
    integrator::{Scale, Sense},
    register::{As5600Register, StatusRegister, TwelveBitRegister},
    sensor::AngleSensor,
};

/// Fixed 7-bit I2C address of the AS5600
pub const AS5600_ADDRESS: u8 = 0x36;

/// 12-bit angle, forward sense, saturating at 4095
pub(crate) const SCALE: Scale = Scale::new(4096, 4095, Sense::Forward);

/// AS5600 driver instance (blocking)
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct As5600<I2C> {
    i2c: I2C,
}

impl<I2C> As5600<I2C> {
    /// Create a new AS5600 driver instance
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Release the I2C bus, consuming the driver
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> As5600<I2C> {
    /// Select `register` and read `N` bytes back
    ///
    /// The register address write holds the bus (repeated start) so that no
    /// other controller can slip in between select and read.
    fn read_register<const N: usize>(
        &mut self,
        register: As5600Register,
    ) -> Result<[u8; N], Error<I2C::Error>> {
        let mut buffer = [0u8; N];
        self.i2c
            .write_read(AS5600_ADDRESS, &[u8::from(register)], &mut buffer)
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "I2C read of register {} failed: {}",
                    register,
                    defmt::Debug2Format(&embedded_hal::i2c::Error::kind(&e))
                );
                Error::Communication(e)
            })?;

        #[cfg(feature = "defmt")]
        defmt::trace!("Register {} read: {:X}", register, buffer);

        Ok(buffer)
    }

    fn read_twelve_bits(&mut self, register: As5600Register) -> Result<u16, Error<I2C::Error>> {
        let bytes = self.read_register::<2>(register)?;
        Ok(TwelveBitRegister(u16::from_be_bytes(bytes)).value())
    }

    /// Get the 12-bit raw angle
    ///
    /// Value ranges from 0 to 4095; the upper four bits of the high byte are
    /// not part of the angle and are masked off.
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn angle(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_twelve_bits(As5600Register::RawAngle)
    }

    /// Get the angular position in degrees (0-359)
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn angle_degrees(&mut self) -> Result<u16, Error<I2C::Error>> {
        let angle = self.angle()?;
        Ok(SCALE.degrees(angle))
    }

    /// Get the automatic gain control value
    ///
    /// Range is 0-255 in 5V mode and 0-128 in 3.3V mode.
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn gain(&mut self) -> Result<u8, Error<I2C::Error>> {
        let [gain] = self.read_register::<1>(As5600Register::Agc)?;
        Ok(gain)
    }

    /// Get the 12-bit CORDIC magnitude
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn magnitude(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_twelve_bits(As5600Register::Magnitude)
    }

    /// Get the magnet status register
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn status(&mut self) -> Result<StatusRegister, Error<I2C::Error>> {
        let [status] = self.read_register::<1>(As5600Register::Status)?;
        Ok(StatusRegister(status))
    }

    /// Diagnostics built from the gain alone
    ///
    /// The AS5600 has no calibration or overflow flags to report, so the
    /// result always validates.
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn diagnostics(&mut self) -> Result<Diagnostics, Error<I2C::Error>> {
        self.gain().map(Diagnostics::from_gain)
    }
}

impl<I2C: I2c> AngleSensor for As5600<I2C> {
    type BusError = I2C::Error;

    const SCALE: Scale = SCALE;

    fn read_angle(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.angle()
    }

    fn read_diagnostics(&mut self) -> Result<Diagnostics, Error<I2C::Error>> {
        self.diagnostics()
    }
}
