//! Error definitions for the crate

#[cfg(feature = "defmt")]
use defmt::{write, Format, Formatter};

/// Hardware fault raised by one of the pin or ADC primitives.
///
/// Noisy or absent touches are not errors: they are reported through the
/// `0` / `z == 0` sentinels of the measurement methods.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<PinError, AdcError> {
    /// Reconfiguring or driving a pin failed
    Pin(PinError),
    /// An analog conversion failed
    Adc(AdcError),
}

#[cfg(feature = "defmt")]
impl<P, A> Format for Error<P, A> {
    fn format(&self, fmt: Formatter) {
        match self {
            Error::Pin(_) => write!(fmt, "pin error"),
            Error::Adc(_) => write!(fmt, "ADC error"),
        }
    }
}

/// Rejected [`Config`](crate::Config) values
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Outlier-trim averaging needs at least three samples
    TooFewSamples(u8),
    /// ADC word width outside `8..=16` bits
    AdcBits(u8),
    /// Sample shift would discard the whole 16-bit word
    SampleShift(u8),
}
