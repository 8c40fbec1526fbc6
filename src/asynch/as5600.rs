//! Async driver for the AS5600 (I2C)

use embedded_hal_async::i2c::I2c;

use crate::{
    as5600::{AS5600_ADDRESS, SCALE},
    diagnostics::Diagnostics,
    error::Error,
    integrator::Scale,
    register::{As5600Register, StatusRegister, TwelveBitRegister},
};

/// AS5600 driver instance (asynchronous)
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
    async fn read_register<const N: usize>(
        &mut self,
        register: As5600Register,
    ) -> Result<[u8; N], Error<I2C::Error>> {
        let mut buffer = [0u8; N];
        self.i2c
            .write_read(AS5600_ADDRESS, &[u8::from(register)], &mut buffer)
            .await
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

    async fn read_twelve_bits(
        &mut self,
        register: As5600Register,
    ) -> Result<u16, Error<I2C::Error>> {
        let bytes = self.read_register::<2>(register).await?;
        Ok(TwelveBitRegister(u16::from_be_bytes(bytes)).value())
    }

    /// Get the 12-bit raw angle
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub async fn angle(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_twelve_bits(As5600Register::RawAngle).await
    }

    /// Get the angular position in degrees (0-359)
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub async fn angle_degrees(&mut self) -> Result<u16, Error<I2C::Error>> {
        let angle = self.angle().await?;
        Ok(SCALE.degrees(angle))
    }

    /// Get the automatic gain control value
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub async fn gain(&mut self) -> Result<u8, Error<I2C::Error>> {
        let [gain] = self.read_register::<1>(As5600Register::Agc).await?;
        Ok(gain)
    }

    /// Get the 12-bit CORDIC magnitude
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub async fn magnitude(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_twelve_bits(As5600Register::Magnitude).await
    }

    /// Get the magnet status register
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub async fn status(&mut self) -> Result<StatusRegister, Error<I2C::Error>> {
        let [status] = self.read_register::<1>(As5600Register::Status).await?;
        Ok(StatusRegister(status))
    }

    /// Diagnostics built from the gain alone
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub async fn diagnostics(&mut self) -> Result<Diagnostics, Error<I2C::Error>> {
        self.gain().await.map(Diagnostics::from_gain)
    }
}

impl<I2C: I2c> super::AngleSensor for As5600<I2C> {
    type BusError = I2C::Error;

    const SCALE: Scale = SCALE;

    async fn read_angle(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.angle().await
    }

    async fn read_diagnostics(&mut self) -> Result<Diagnostics, Error<I2C::Error>> {
        self.diagnostics().await
    }
}
