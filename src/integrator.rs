//! Circular delta integrator.
//!
//! Turns successive absolute angle samples into a bounded position that
//! follows the shaft across the sensor's zero point.

/// Which difference counts as positive rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sense {
    /// `current - previous`
    Forward,
    /// `previous - current`
    Reverse,
}

/// Resolution, upper bound and rotation sense of a sensor family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scale {
    resolution: u16,
    bound: u16,
    sense: Sense,
}

impl Scale {
    /// # Panics
    ///
    /// When `resolution` is not a power of two or `bound` is outside
    /// `1..=resolution`. Use in const context to turn this into a build error.
    #[must_use]
    pub const fn new(resolution: u16, bound: u16, sense: Sense) -> Self {
        assert!(resolution.is_power_of_two(), "resolution must be a power of two");
        assert!(bound > 0 && bound <= resolution, "bound must be in 1..=resolution");
        Self {
            resolution,
            bound,
            sense,
        }
    }

    /// Number of distinct steps per revolution
    #[must_use]
    pub const fn resolution(&self) -> u16 {
        self.resolution
    }

    /// Largest accumulator value
    #[must_use]
    pub const fn bound(&self) -> u16 {
        self.bound
    }

    /// Which direction of rotation increases the accumulator
    #[must_use]
    pub const fn sense(&self) -> Sense {
        self.sense
    }

    /// Convert a raw sample to whole degrees (0-359), rounded down
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
    pub const fn degrees(&self, sample: u16) -> u16 {
        let sample = (sample & (self.resolution - 1)) as u32;
        (sample * 360 / self.resolution as u32) as u16
    }
}

/// Accumulated, clamped knob position
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Integrator {
    scale: Scale,
    accumulator: u16,
    previous: u16,
}

impl Integrator {
    /// Start at zero with a previous sample of zero
    #[must_use]
    pub const fn new(scale: Scale) -> Self {
        Self {
            scale,
            accumulator: 0,
            previous: 0,
        }
    }

    /// Scale this integrator was built for
    #[must_use]
    pub const fn scale(&self) -> Scale {
        self.scale
    }

    /// Current position in `[0, bound]`
    #[must_use]
    pub const fn accumulator(&self) -> u16 {
        self.accumulator
    }

    /// Last sample fed to [`Integrator::update`]
    #[must_use]
    pub const fn previous(&self) -> u16 {
        self.previous
    }

    /// Shortest-path rotation from `previous` to `current`, in `[-M/2, M/2)`
    #[must_use]
    pub fn signed_delta(&self, previous: u16, current: u16) -> i32 {
        let m = i32::from(self.scale.resolution);
        let half = m / 2;
        let raw = match self.scale.sense {
            Sense::Forward => i32::from(current) - i32::from(previous),
            Sense::Reverse => i32::from(previous) - i32::from(current),
        };
        let forward = raw.rem_euclid(m);
        (forward + half).rem_euclid(m) - half
    }

    /// Fold a validated sample into the position and return the new value
    ///
    /// The result saturates at `0` and at the scale's bound.
    pub fn update(&mut self, current: u16) -> u16 {
        let current = current & (self.scale.resolution - 1);
        let tentative = i32::from(self.accumulator) + self.signed_delta(self.previous, current);
        let clamped = tentative.clamp(0, i32::from(self.scale.bound));

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "sample {} -> {}, accumulator {} -> {}",
            self.previous,
            current,
            self.accumulator,
            clamped
        );

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let clamped = clamped as u16;
        self.accumulator = clamped;
        self.previous = current;
        self.accumulator
    }
}
