//! AS5048A 16-bit SPI frames.
//!
//! Commands and responses share one layout: even parity in bit 15, a flag in
//! bit 14 (read request on the way out, error on the way back) and 14 bits of
//! address or data.

use crate::{error::Error, register::As5048aRegister};

const PARITY_BIT: u16 = 0x8000;

bitfield::bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Frame(u16);
    impl Debug;
    u16;
    pub parity, set_parity: 15;
    pub flag, set_flag: 14;
    pub payload, set_payload: 13, 0;
}

impl Frame {
    /// Build a read command for `register`, parity included
    pub fn read_command(register: As5048aRegister) -> Self {
        let mut frame = Frame(0);
        frame.set_flag(true);
        frame.set_payload(u16::from(register));
        frame.seal()
    }

    /// The NOP frame clocked out while receiving a response
    pub fn nop() -> Self {
        Frame(u16::from(As5048aRegister::Nop)).seal()
    }

    /// Set bit 15 so the frame has an even number of ones
    fn seal(mut self) -> Self {
        let odd = !(self.0 & !PARITY_BIT).count_ones().is_multiple_of(2);
        self.set_parity(odd);
        self
    }

    pub fn has_even_parity(self) -> bool {
        self.0.count_ones().is_multiple_of(2)
    }

    pub fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Frame(u16::from_be_bytes(bytes))
    }

    /// Validate a response frame and extract its 14-bit payload
    ///
    /// Parity is checked before the error flag: a corrupted frame says
    /// nothing trustworthy about the flag.
    pub fn into_payload<E>(self) -> Result<u16, Error<E>> {
        if !self.has_even_parity() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Parity error in response: 0x{:04X}", self.0);
            return Err(Error::ParityError);
        }

        if self.flag() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Sensor error flag set in response: 0x{:04X}", self.0);
            return Err(Error::SensorError);
        }

        Ok(self.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_commands_carry_even_parity() {
        assert_eq!(Frame::read_command(As5048aRegister::Angle).0, 0xFFFF);
        assert_eq!(Frame::read_command(As5048aRegister::DiagAgc).0, 0x7FFD);
        assert_eq!(Frame::read_command(As5048aRegister::Magnitude).0, 0x7FFE);
        assert_eq!(Frame::read_command(As5048aRegister::ClearErrorFlag).0, 0x4001);
        assert_eq!(Frame::nop().0, 0x0000);
    }

    #[test]
    fn rejects_odd_parity_before_error_flag() {
        // error flag set, parity wrong
        let frame = Frame(0x4000);
        assert_eq!(frame.into_payload::<()>(), Err(Error::ParityError));
    }

    #[test]
    fn rejects_error_flag() {
        // error flag + parity bit
        let frame = Frame(0xC000);
        assert_eq!(frame.into_payload::<()>(), Err(Error::SensorError));
    }

    #[test]
    fn extracts_payload() {
        let frame = Frame(0x1234).seal();
        assert_eq!(frame.into_payload::<()>(), Ok(0x1234));
    }
}
