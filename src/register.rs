//! Register maps for the supported sensors.

/// Register addresses for AS5048A
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[repr(u16)]
pub enum As5048aRegister {
    /// No operation, used to clock out the previous response
    Nop = 0x0000,
    /// Clear error flag. Reading returns the error bits and clears them
    ClearErrorFlag = 0x0001,
    /// Diagnostics and automatic gain control
    DiagAgc = 0x3FFD,
    /// CORDIC magnitude (14-bit)
    Magnitude = 0x3FFE,
    /// Measured angle (14-bit)
    Angle = 0x3FFF,
}

impl From<As5048aRegister> for u16 {
    fn from(reg: As5048aRegister) -> u16 {
        reg as u16
    }
}

/// Register addresses for AS5600
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[repr(u8)]
pub enum As5600Register {
    /// Magnet status
    Status = 0x0B,
    /// Unscaled, unmodified angle (12-bit, high byte first)
    RawAngle = 0x0C,
    /// Automatic gain control
    Agc = 0x1A,
    /// CORDIC magnitude (12-bit, high byte first)
    Magnitude = 0x1B,
}

impl From<As5600Register> for u8 {
    fn from(reg: As5600Register) -> u8 {
        reg as u8
    }
}

bitfield::bitfield! {
    /// ERRFL
    ///
    /// Reading the ERRFL register automatically clears its contents
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct ErrorFlagRegister(u16);
    impl Debug;
    u8;
    /// Parity error
    pub parity_error, _: 2;
    /// Invalid command error: set by reading or writing an invalid register
    /// address
    pub invalid_command, _: 1;
    /// Framing error: set when a non-compliant SPI frame is detected
    pub framing_error, _: 0;
}

bitfield::bitfield! {
    /// AS5600 STATUS
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct StatusRegister(u8);
    impl Debug;
    u8;
    /// Magnet was detected
    pub magnet_detected, _: 5;
    /// AGC maximum gain overflow, magnet too weak
    pub magnet_too_weak, _: 4;
    /// AGC minimum gain overflow, magnet too strong
    pub magnet_too_strong, _: 3;
}

bitfield::bitfield! {
    /// Two-byte AS5600 reading; only the low 12 bits carry data
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct TwelveBitRegister(u16);
    impl Debug;
    u16;
    pub value, _: 11, 0;
}
