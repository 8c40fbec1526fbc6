//! Integration tests for the AS5048A driver using mocked SPI.

use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use embedded_hal_mock::eh1::{
    delay::NoopDelay,
    spi::{Mock as SpiMock, Transaction as SpiTransaction},
};
use rotary_knob::{As5048a, CS_HOLD_NS, Error, asynch};

/// Helper to set even parity on a 16-bit frame.
fn with_parity(value: u16) -> u16 {
    let bits = value & 0x7FFF;
    if bits.count_ones() % 2 == 1 {
        0x8000 | bits
    } else {
        bits
    }
}

/// Helper to create a read command frame with parity.
fn read_command(address: u16) -> u16 {
    with_parity(0x4000 | address)
}

/// Helper to create a response frame with parity.
fn response_frame(data: u16, error_flag: bool) -> u16 {
    let frame = if error_flag {
        0x4000 | (data & 0x3FFF)
    } else {
        data & 0x3FFF
    };
    with_parity(frame)
}

/// One frame inside its own chip select bracket.
fn frame(sent: u16, received: u16) -> Vec<SpiTransaction<u8>> {
    vec![
        SpiTransaction::transaction_start(),
        SpiTransaction::transfer(sent.to_be_bytes().to_vec(), received.to_be_bytes().to_vec()),
        SpiTransaction::delay(CS_HOLD_NS),
        SpiTransaction::transaction_end(),
    ]
}

/// Read command followed by the NOP that clocks out `response`.
fn register_read(address: u16, response: u16) -> Vec<SpiTransaction<u8>> {
    let mut expectations = frame(read_command(address), 0x0000);
    expectations.extend(frame(0x0000, response));
    expectations
}

/// SPI device that fails the frames listed in `failing` and answers the
/// others from `responses`.
struct FlakySpi {
    frame: usize,
    failing: Vec<usize>,
    responses: Vec<u16>,
    sent: Vec<u16>,
}

impl FlakySpi {
    fn new(failing: &[usize], responses: &[u16]) -> Self {
        Self {
            frame: 0,
            failing: failing.to_vec(),
            responses: responses.to_vec(),
            sent: Vec::new(),
        }
    }
}

impl ErrorType for FlakySpi {
    type Error = ErrorKind;
}

impl SpiDevice<u8> for FlakySpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
        let index = self.frame;
        self.frame += 1;
        for operation in operations {
            if let Operation::Transfer(read, write) = operation {
                self.sent.push(u16::from_be_bytes([write[0], write[1]]));
                if self.failing.contains(&index) {
                    return Err(ErrorKind::Other);
                }
                let response = self.responses.get(index).copied().unwrap_or(0);
                read.copy_from_slice(&response.to_be_bytes());
            }
        }
        Ok(())
    }
}

#[test]
fn reads_angle_register() {
    let expectations = register_read(0x3FFF, response_frame(0x1234, false));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let angle = sensor.angle().unwrap();
    assert_eq!(angle, 0x1234);

    sensor.release().0.done();
}

#[test]
fn reads_magnitude_register() {
    let expectations = register_read(0x3FFE, response_frame(0x0ABC, false));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let magnitude = sensor.magnitude().unwrap();
    assert_eq!(magnitude, 0x0ABC);

    sensor.release().0.done();
}

#[test]
fn reads_diagnostics_register() {
    // Offset compensation finished (bit 8), AGC = 128
    let expectations = register_read(0x3FFD, response_frame(0x0180, false));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let diag = sensor.diagnostics().unwrap();
    assert_eq!(diag.raw(), 0x0180);
    assert!(!diag.overflow());
    assert!(!diag.field_too_strong());
    assert!(!diag.field_too_weak());
    assert!(diag.calibration_finished());
    assert_eq!(diag.gain(), 128);
    assert_eq!(diag.validate(), Ok(128));

    sensor.release().0.done();
}

#[test]
fn converts_angle_to_degrees() {
    let expectations = register_read(0x3FFF, response_frame(0x2000, false));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    assert_eq!(sensor.angle_degrees().unwrap(), 180);

    sensor.release().0.done();
}

#[test]
fn parity_error_clears_sensor_error_flag() {
    // 0xC001 has an odd number of ones
    let mut expectations = register_read(0x3FFF, 0xC001);
    expectations.extend(register_read(0x0001, response_frame(0x0004, false)));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let result = sensor.angle();
    assert!(matches!(result, Err(Error::ParityError)));

    sensor.release().0.done();
}

#[test]
fn sensor_error_flag_is_cleared_and_reported() {
    let mut expectations = register_read(0x3FFF, response_frame(0x1234, true));
    // Framing and invalid command bits set in ERRFL
    expectations.extend(register_read(0x0001, response_frame(0x0003, false)));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let result = sensor.angle();
    assert!(matches!(result, Err(Error::SensorError)));

    sensor.release().0.done();
}

#[test]
fn clear_error_flag_decodes_bits() {
    let expectations = register_read(0x0001, response_frame(0x0006, false));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let flags = sensor.clear_error_flag().unwrap();
    assert!(flags.parity_error());
    assert!(flags.invalid_command());
    assert!(!flags.framing_error());

    sensor.release().0.done();
}

#[test]
fn failing_clear_error_flag_does_not_recurse() {
    // The clear command itself comes back with the error flag
    let expectations = register_read(0x0001, response_frame(0x0000, true));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    assert!(matches!(sensor.clear_error_flag(), Err(Error::SensorError)));

    sensor.release().0.done();
}

#[test]
fn bus_failure_triggers_error_clear() {
    // Frame 0 (angle command) fails; frames 1 and 2 are the clear exchange
    let spi = FlakySpi::new(&[0], &[0x0000, 0x0000, response_frame(0x0001, false)]);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let result = sensor.angle();
    assert_eq!(result, Err(Error::Communication(ErrorKind::Other)));

    let (spi, _) = sensor.release();
    assert_eq!(spi.sent, vec![0xFFFF, 0x4001, 0x0000]);
}

#[test]
fn failure_during_recovery_is_ignored() {
    // Every frame fails: one attempt at the command, one at the clear, nothing more
    let spi = FlakySpi::new(&[0, 1, 2, 3], &[]);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let result = sensor.angle();
    assert_eq!(result, Err(Error::Communication(ErrorKind::Other)));

    let (spi, _) = sensor.release();
    assert_eq!(spi.sent, vec![0xFFFF, 0x4001]);
}

#[test]
fn response_failure_after_command_triggers_error_clear() {
    // Command goes out, the NOP frame fails
    let spi = FlakySpi::new(&[1], &[0x0000, 0x0000, 0x0000, 0x0000]);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let result = sensor.diagnostics();
    assert_eq!(result, Err(Error::Communication(ErrorKind::Other)));

    let (spi, _) = sensor.release();
    assert_eq!(spi.sent, vec![0x7FFD, 0x0000, 0x4001, 0x0000]);
}

#[test]
fn reads_multiple_angles_sequentially() {
    let angles = [0x0000, 0x1000, 0x2000, 0x3000];
    let mut expectations = Vec::new();

    for &angle_value in &angles {
        expectations.extend(register_read(0x3FFF, response_frame(angle_value, false)));
    }

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    for &expected_angle in &angles {
        let angle = sensor.angle().unwrap();
        assert_eq!(angle, expected_angle);
    }

    sensor.release().0.done();
}

#[test]
fn masks_data_to_14_bits() {
    let expectations = register_read(0x3FFF, response_frame(0x3FFF, false));

    let spi = SpiMock::new(&expectations);
    let mut sensor = As5048a::new(spi, NoopDelay::new());

    let angle = sensor.angle().unwrap();
    assert_eq!(angle, 0x3FFF);

    sensor.release().0.done();
}

#[tokio::test]
async fn async_reads_angle_register() {
    let expectations = register_read(0x3FFF, response_frame(0x0ABC, false));

    let spi = SpiMock::new(&expectations);
    let mut sensor = asynch::As5048a::new(spi, NoopDelay::new());

    let angle = sensor.angle().await.unwrap();
    assert_eq!(angle, 0x0ABC);

    sensor.release().0.done();
}

#[tokio::test]
async fn async_sensor_error_flag_is_cleared() {
    let mut expectations = register_read(0x3FFD, response_frame(0x0000, true));
    expectations.extend(register_read(0x0001, response_frame(0x0002, false)));

    let spi = SpiMock::new(&expectations);
    let mut sensor = asynch::As5048a::new(spi, NoopDelay::new());

    assert!(matches!(
        sensor.diagnostics().await,
        Err(Error::SensorError)
    ));

    sensor.release().0.done();
}
