//! Mapping the knob position onto a PWM level and a text gauge.

use core::fmt;

use embedded_hal::pwm::SetDutyCycle;

/// Number of PWM duty levels; the gauge is `DUTY_STEPS - 1` cells wide
pub const DUTY_STEPS: u8 = 64;

/// Output derived from the accumulator for one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputLevel {
    duty: u8,
    fraction: f32,
}

impl OutputLevel {
    /// Quantize `accumulator` out of `bound` into a duty level in `[0, 64)`
    #[must_use]
    pub fn new(accumulator: u16, bound: u16) -> Self {
        let accumulator = accumulator.min(bound);
        let duty = (u32::from(accumulator) * u32::from(DUTY_STEPS) / (u32::from(bound) + 1))
            .min(u32::from(DUTY_STEPS - 1));
        let fraction = if bound == 0 {
            0.0
        } else {
            f32::from(accumulator) / f32::from(bound)
        };

        #[allow(clippy::cast_possible_truncation)]
        let duty = duty as u8;
        Self { duty, fraction }
    }

    /// Duty level in `[0, DUTY_STEPS)`
    #[must_use]
    pub const fn duty(&self) -> u8 {
        self.duty
    }

    /// Position as a fraction of the bound, in `[0.0, 1.0]`
    #[must_use]
    pub const fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Fraction of full scale as a percentage in `[0, 100]`
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.fraction * 100.0
    }

    /// Push the duty level to a PWM channel whose wrap is [`DUTY_STEPS`]
    ///
    /// Channels with another maximum duty get the same proportion.
    ///
    /// # Errors
    ///
    /// Returns the PWM channel's error unchanged.
    pub fn drive<P: SetDutyCycle>(&self, pwm: &mut P) -> Result<(), P::Error> {
        pwm.set_duty_cycle_fraction(u16::from(self.duty), u16::from(DUTY_STEPS))
    }
}

/// `[###---] 50.000000%`
impl fmt::Display for OutputLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for _ in 0..self.duty {
            f.write_str("#")?;
        }
        for _ in self.duty..DUTY_STEPS - 1 {
            f.write_str("-")?;
        }
        write!(f, "] {:10.6}%", self.percent())
    }
}
