//! Sampling configuration

use crate::error::ConfigError;

/// Largest difference between two consecutive 10 bit samples that still
/// counts as a steady touch.
pub const DEFAULT_NOISE_TOLERANCE: u16 = 4;

/// Resistance of the x-plate in ohms, used by the pressure estimate of
/// [`get_point`](crate::ResistiveTouchScreen::get_point).
pub const DEFAULT_X_PLATE_OHMS: u16 = 300;

/// How each position sample is taken from the ADC.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// A single conversion
    #[default]
    Raw,
    /// `n` conversions, the smallest and the largest are dropped and the
    /// rest averaged. `n` must be at least 3.
    Averaged(u8),
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub sampling: SamplingMode,
    /// Inclusive: samples differing by exactly this much are accepted
    pub noise_tolerance: u16,
    /// Right shift applied to the widened 16 bit word of a position sample
    pub sample_shift: u8,
    /// Resolution of the words the ADC returns, `8..=16`
    pub adc_bits: u8,
    pub x_plate_ohms: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            sampling: SamplingMode::Raw,
            noise_tolerance: DEFAULT_NOISE_TOLERANCE,
            sample_shift: 6,
            adc_bits: 16,
            x_plate_ohms: DEFAULT_X_PLATE_OHMS,
        }
    }

    pub const fn sampling(mut self, sampling: SamplingMode) -> Self {
        self.sampling = sampling;
        self
    }

    pub const fn noise_tolerance(mut self, tolerance: u16) -> Self {
        self.noise_tolerance = tolerance;
        self
    }

    pub const fn sample_shift(mut self, shift: u8) -> Self {
        self.sample_shift = shift;
        self
    }

    pub const fn adc_bits(mut self, bits: u8) -> Self {
        self.adc_bits = bits;
        self
    }

    pub const fn x_plate_ohms(mut self, ohms: u16) -> Self {
        self.x_plate_ohms = ohms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let SamplingMode::Averaged(n) = self.sampling {
            if n < 3 {
                return Err(ConfigError::TooFewSamples(n));
            }
        }
        if !(8..=16).contains(&self.adc_bits) {
            return Err(ConfigError::AdcBits(self.adc_bits));
        }
        if self.sample_shift > 15 {
            return Err(ConfigError::SampleShift(self.sample_shift));
        }
        Ok(())
    }
}
