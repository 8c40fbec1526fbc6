#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod asynch;

mod as5048a;
mod as5600;
mod diagnostics;
mod error;
mod frame;
mod integrator;
mod knob;
mod output;
mod register;
mod sensor;

pub use as5048a::{As5048a, CS_HOLD_NS, CS_IDLE_NS};
pub use as5600::{AS5600_ADDRESS, As5600};
pub use diagnostics::{Diagnostics, Rejection};
pub use error::Error;
pub use integrator::{Integrator, Scale, Sense};
pub use knob::{Knob, Reading};
pub use output::{DUTY_STEPS, OutputLevel};
pub use register::{As5048aRegister, As5600Register, ErrorFlagRegister, StatusRegister};
pub use sensor::AngleSensor;
