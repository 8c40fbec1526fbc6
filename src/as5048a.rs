//! Blocking driver for the AS5048A 14-bit magnetic rotary position sensor (SPI)

use embedded_hal::{
    delay::DelayNs,
    spi::{Operation, SpiDevice},
};

use crate::{
    diagnostics::Diagnostics,
    error::Error,
    frame::Frame,
    integrator::{Scale, Sense},
    register::{As5048aRegister, ErrorFlagRegister},
    sensor::AngleSensor,
};

/// Time chip select stays asserted after the last clock edge of a frame
pub const CS_HOLD_NS: u32 = 50;

/// Minimum chip select high time between two frames
pub const CS_IDLE_NS: u32 = 350;

/// 14-bit angle, reverse sense, saturating at 16383
pub(crate) const SCALE: Scale = Scale::new(16384, 16383, Sense::Reverse);

/// AS5048A driver instance (blocking)
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct As5048a<SPI, D> {
    spi: SPI,
    delay: D,
}

impl<SPI, D> As5048a<SPI, D> {
    /// Create a new AS5048A driver instance
    ///
    /// `delay` times the chip select idle gap between frames.
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
    /// Shift one frame out and one frame in inside its own chip select bracket
    fn exchange(&mut self, frame: Frame) -> Result<Frame, Error<SPI::Error>> {
        let tx = frame.to_be_bytes();
        let mut rx = [0u8; 2];
        let result = self.spi.transaction(&mut [
            Operation::Transfer(&mut rx, &tx),
            Operation::DelayNs(CS_HOLD_NS),
        ]);
        self.delay.delay_ns(CS_IDLE_NS);

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

    /// Run one command-response exchange without any recovery
    ///
    /// - Frame 1: send read command, ignore response
    /// - Frame 2: send NOP, receive the register contents
    fn transact(&mut self, register: As5048aRegister) -> Result<u16, Error<SPI::Error>> {
        let command = Frame::read_command(register);

        #[cfg(feature = "defmt")]
        defmt::trace!("Reading register {}, command: 0x{:04X}", register, command.0);

        self.exchange(command)?;
        let response = self.exchange(Frame::nop())?;

        #[cfg(feature = "defmt")]
        defmt::trace!("Received response: 0x{:04X}", response.0);

        let data = response.into_payload()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Register {} value: 0x{:04X}", register, data);

        Ok(data)
    }

    /// Run a command; on any failure, clear the sensor's error flag before
    /// handing the original error back
    fn command(&mut self, register: As5048aRegister) -> Result<u16, Error<SPI::Error>> {
        self.transact(register).inspect_err(|_| self.recover())
    }

    /// Best effort: a failing clear is dropped and never retried
    fn recover(&mut self) {
        if let Ok(flags) = self.transact(As5048aRegister::ClearErrorFlag) {
            log_error_flags(ErrorFlagRegister(flags));
        }
    }

    /// Get the 14-bit angular position
    ///
    /// Value ranges from 0 to 16383 (0° to 359.978°)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub fn angle(&mut self) -> Result<u16, Error<SPI::Error>> {
        self.command(As5048aRegister::Angle)
    }

    /// Get the angular position in degrees (0-359)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub fn angle_degrees(&mut self) -> Result<u16, Error<SPI::Error>> {
        let angle = self.angle()?;
        Ok(SCALE.degrees(angle))
    }

    /// Get the 14-bit magnitude value from CORDIC
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub fn magnitude(&mut self) -> Result<u16, Error<SPI::Error>> {
        self.command(As5048aRegister::Magnitude)
    }

    /// Get the diagnostics and AGC register
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub fn diagnostics(&mut self) -> Result<Diagnostics, Error<SPI::Error>> {
        self.command(As5048aRegister::DiagAgc).map(Diagnostics::new)
    }

    /// Read and clear the error flag register
    ///
    /// Failures here do not trigger another clear.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, parity check fails, or the sensor reports an error
    pub fn clear_error_flag(&mut self) -> Result<ErrorFlagRegister, Error<SPI::Error>> {
        self.transact(As5048aRegister::ClearErrorFlag)
            .map(ErrorFlagRegister)
    }
}

impl<SPI, D> AngleSensor for As5048a<SPI, D>
where
    SPI: SpiDevice<u8>,
    D: DelayNs,
{
    type BusError = SPI::Error;

    const SCALE: Scale = SCALE;

    fn read_angle(&mut self) -> Result<u16, Error<SPI::Error>> {
        self.angle()
    }

    fn read_diagnostics(&mut self) -> Result<Diagnostics, Error<SPI::Error>> {
        self.diagnostics()
    }
}

#[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
pub(crate) fn log_error_flags(flags: ErrorFlagRegister) {
    #[cfg(feature = "defmt")]
    defmt::warn!(
        "Cleared sensor error: framing={}, invalid command={}, parity={}",
        flags.framing_error(),
        flags.invalid_command(),
        flags.parity_error()
    );
}
