//! Async driver for the AS5048A (SPI)

use embedded_hal_async::{
    delay::DelayNs,
    spi::{Operation, SpiDevice},
};

use crate::{
    as5048a::{CS_HOLD_NS, CS_IDLE_NS, SCALE, log_error_flags},
    diagnostics::Diagnostics,
    error::Error,
    frame::Frame,
    integrator::Scale,
    register::{As5048aRegister, ErrorFlagRegister},
};

/// AS5048A driver instance (asynchronous)
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct As5048a<SPI, D> {
    spi: SPI,
    delay: D,
}

impl<SPI, D> As5048a<SPI, D> {
    /// Create a new AS5048A driver instance
    pub fn new(spi: SPI, delay: D) -> Self {
        Self { spi, delay }
    }

    /// Release the SPI device and delay, consuming the driver
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }
}

impl<SPI, D> As5048a<SPI, D>
where
    SPI: SpiDevice<u8>,
    D: DelayNs,
{
    async fn exchange(&mut self, frame: Frame) -> Result<Frame, Error<SPI::Error>> {
        let tx = frame.to_be_bytes();
        let mut rx = [0u8; 2];
        let result = self
            .spi
            .transaction(&mut [
                Operation::Transfer(&mut rx, &tx),
                Operation::DelayNs(CS_HOLD_NS),
            ])
            .await;
        self.delay.delay_ns(CS_IDLE_NS).await;

        result.map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "SPI transfer failed: {}",
                defmt::Debug2Format(&embedded_hal::spi::Error::kind(&e))
            );
            Error::Communication(e)
        })?;

        Ok(Frame::from_be_bytes(rx))
    }

    async fn transact(&mut self, register: As5048aRegister) -> Result<u16, Error<SPI::Error>> {
        let command = Frame::read_command(register);

        #[cfg(feature = "defmt")]
        defmt::trace!("Reading register {}, command: 0x{:04X}", register, command.0);

        self.exchange(command).await?;
        let response = self.exchange(Frame::nop()).await?;

        #[cfg(feature = "defmt")]
        defmt::trace!("Received response: 0x{:04X}", response.0);

        let data = response.into_payload()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Register {} value: 0x{:04X}", register, data);

        Ok(data)
    }

    async fn command(&mut self, register: As5048aRegister) -> Result<u16, Error<SPI::Error>> {
        let result = self.transact(register).await;
        if result.is_err() {
            self.recover().await;
        }
        result
    }

    /// Best effort: a failing clear is dropped and never retried
    async fn recover(&mut self) {
        if let Ok(flags) = self.transact(As5048aRegister::ClearErrorFlag).await {
            log_error_flags(ErrorFlagRegister(flags));
        }
    }

    /// Get the 14-bit angular position
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub async fn angle(&mut self) -> Result<u16, Error<SPI::Error>> {
        self.command(As5048aRegister::Angle).await
    }

    /// Get the angular position in degrees (0-359)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub async fn angle_degrees(&mut self) -> Result<u16, Error<SPI::Error>> {
        let angle = self.angle().await?;
        Ok(SCALE.degrees(angle))
    }

    /// Get the 14-bit magnitude value from CORDIC
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub async fn magnitude(&mut self) -> Result<u16, Error<SPI::Error>> {
        self.command(As5048aRegister::Magnitude).await
    }

    /// Get the diagnostics and AGC register
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub async fn diagnostics(&mut self) -> Result<Diagnostics, Error<SPI::Error>> {
        self.command(As5048aRegister::DiagAgc)
            .await
            .map(Diagnostics::new)
    }

    /// Read and clear the error flag register
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub async fn clear_error_flag(&mut self) -> Result<ErrorFlagRegister, Error<SPI::Error>> {
        self.transact(As5048aRegister::ClearErrorFlag)
            .await
            .map(ErrorFlagRegister)
    }
}

impl<SPI, D> super::AngleSensor for As5048a<SPI, D>
where
    SPI: SpiDevice<u8>,
    D: DelayNs,
{
    type BusError = SPI::Error;

    const SCALE: Scale = SCALE;

    async fn read_angle(&mut self) -> Result<u16, Error<SPI::Error>> {
        self.angle().await
    }

    async fn read_diagnostics(&mut self) -> Result<Diagnostics, Error<SPI::Error>> {
        self.diagnostics().await
    }
}
