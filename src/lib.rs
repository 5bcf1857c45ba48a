//! Polled driver for 4-wire resistive touch screens.
//!
//! The four panel terminals (Y-, X-, Y+, X+) are shared between the GPIO
//! and the ADC. Each measurement energises one plate, samples the voltage
//! divider it forms with the other plate, and hands every pin back before
//! returning:
//!
//! - [`read_touch_x`](ResistiveTouchScreen::read_touch_x) and
//!   [`read_touch_y`](ResistiveTouchScreen::read_touch_y) return the 10 bit
//!   position along one axis, or `0` when the two samples disagree;
//! - [`pressure`](ResistiveTouchScreen::pressure) returns a coarse 16 bit
//!   pressure reading, compare it with
//!   [`pressure_threshold`](ResistiveTouchScreen::pressure_threshold);
//! - [`get_point`](ResistiveTouchScreen::get_point) combines both axes with a
//!   touch resistance estimate into a [`TouchPoint`], `z == 0` meaning no
//!   touch.
//!
//! Only X- and Y+ are ever sampled, so those two must be ADC capable. Pins
//! are driven through the [`TouchPin`] trait and sampled with the
//! `embedded_hal::adc::OneShot` implementation of the target HAL.

#![no_std]

#[cfg(test)]
extern crate std;

mod config;
mod error;
mod sample;
mod touchio;

#[cfg(test)]
mod mock;

pub use config::{Config, SamplingMode, DEFAULT_NOISE_TOLERANCE, DEFAULT_X_PLATE_OHMS};
pub use error::{ConfigError, Error};
pub use sample::MAX_PRESSURE;
pub use touchio::{Analog, Claim, Input, Output, Role, TouchIO, TouchPin};

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::v2::PinState;

use sample::{average, raw_pressure, touch_pressure, widen, within_tolerance, TrimmedMean};

/// Default for [`ResistiveTouchScreen::pressure_threshold`]
pub const DEFAULT_PRESSURE_THRESHOLD: u16 = 1000;

/// Result of [`ResistiveTouchScreen::get_point`].
///
/// `x` and `y` are sums of two 10 bit samples. They only mean something when
/// `z` is non-zero.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TouchPoint {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn is_touched(&self) -> bool {
        self.z != 0
    }
}

#[derive(Debug)]
pub struct ResistiveTouchScreen<PinYM, PinXM, PinYP, PinXP> {
    y_m: TouchIO<PinYM>,
    x_m: TouchIO<PinXM>,
    y_p: TouchIO<PinYP>,
    x_p: TouchIO<PinXP>,
    config: Config,
    /// Advisory: pressure readings above this value count as a touch. The
    /// driver itself never consults it.
    pub pressure_threshold: u16,
}

impl<PinYM, PinXM, PinYP, PinXP> ResistiveTouchScreen<PinYM, PinXM, PinYP, PinXP> {
    /// Wrap the four panel terminals. No pin is touched until the first
    /// measurement.
    pub fn new(
        y_m: impl Into<PinYM>,
        x_m: impl Into<PinXM>,
        y_p: impl Into<PinYP>,
        x_p: impl Into<PinXP>,
    ) -> Self {
        ResistiveTouchScreen {
            y_m: TouchIO::new(y_m.into()),
            x_m: TouchIO::new(x_m.into()),
            y_p: TouchIO::new(y_p.into()),
            x_p: TouchIO::new(x_p.into()),
            config: Config::new(),
            pressure_threshold: DEFAULT_PRESSURE_THRESHOLD,
        }
    }

    pub fn with_config(
        y_m: impl Into<PinYM>,
        x_m: impl Into<PinXM>,
        y_p: impl Into<PinYP>,
        x_p: impl Into<PinXP>,
        config: Config,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut screen = Self::new(y_m, x_m, y_p, x_p);
        screen.config = config;
        Ok(screen)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a [`pressure`](Self::pressure) reading is above
    /// [`pressure_threshold`](Self::pressure_threshold).
    #[inline]
    pub fn is_pressed(&self, pressure: u16) -> bool {
        pressure > self.pressure_threshold
    }

    /// Give the pins back as `(y_m, x_m, y_p, x_p)`.
    pub fn release(self) -> (PinYM, PinXM, PinYP, PinXP) {
        (
            self.y_m.into_inner(),
            self.x_m.into_inner(),
            self.y_p.into_inner(),
            self.x_p.into_inner(),
        )
    }
}

impl<PinYM, PinXM, PinYP, PinXP, E> ResistiveTouchScreen<PinYM, PinXM, PinYP, PinXP>
where
    PinYM: TouchPin<Error = E>,
    PinXM: TouchPin<Error = E>,
    PinYP: TouchPin<Error = E>,
    PinXP: TouchPin<Error = E>,
{
    /// Position along the x-plate, sampled on Y+. `0` if the two samples
    /// are further apart than the noise tolerance.
    pub fn read_touch_x<ADC, A, AE>(&mut self, adc: &mut A) -> Result<u16, Error<E, AE>>
    where
        PinYP: Channel<ADC>,
        A: OneShot<ADC, u16, PinYP, Error = AE>,
    {
        let (s0, s1) = self.sample_x(adc)?;
        Ok(settle(s0, s1, self.config.noise_tolerance))
    }

    /// Position along the y-plate, sampled on X-. `0` if the two samples
    /// are further apart than the noise tolerance.
    pub fn read_touch_y<ADC, A, AE>(&mut self, adc: &mut A) -> Result<u16, Error<E, AE>>
    where
        PinXM: Channel<ADC>,
        A: OneShot<ADC, u16, PinXM, Error = AE>,
    {
        // x-plate floats, x- is sampled
        let _x_p = self.x_p.input().map_err(Error::Pin)?;
        let mut x_m = self.x_m.analog().map_err(Error::Pin)?;

        // apply potential across the y-plate
        let _y_p = self.y_p.output(PinState::High).map_err(Error::Pin)?;
        let _y_m = self.y_m.output(PinState::Low).map_err(Error::Pin)?;

        let (s0, s1) = sample_pair(&mut x_m, adc, &self.config).map_err(Error::Adc)?;
        Ok(settle(s0, s1, self.config.noise_tolerance))
    }

    /// Coarse pressure reading from a single z1/z2 pair, no noise rejection.
    /// Larger means firmer.
    pub fn pressure<ADC, A, AE>(&mut self, adc: &mut A) -> Result<u16, Error<E, AE>>
    where
        PinXM: Channel<ADC>,
        PinYP: Channel<ADC>,
        A: OneShot<ADC, u16, PinXM, Error = AE> + OneShot<ADC, u16, PinYP, Error = AE>,
    {
        // x+ to ground, y- to Vcc
        let _x_p = self.x_p.output(PinState::Low).map_err(Error::Pin)?;
        let _y_m = self.y_m.output(PinState::High).map_err(Error::Pin)?;

        let mut x_m = self.x_m.analog().map_err(Error::Pin)?;
        let mut y_p = self.y_p.analog().map_err(Error::Pin)?;

        let bits = self.config.adc_bits;
        let z1 = read_raw(&mut x_m, adc, bits).map_err(Error::Adc)?;
        let z2 = read_raw(&mut y_p, adc, bits).map_err(Error::Adc)?;

        Ok(raw_pressure(z1, z2))
    }

    /// Read both axes and, if both are steady, estimate the touch
    /// resistance.
    ///
    /// Unlike the single axis reads, `x` and `y` are the sums of their two
    /// samples. A noisy sample pair on either axis yields `z == 0`, as does
    /// an estimate above `0xFFFF`. When z2 is below z1 the estimate is
    /// negative, which still counts as a touch.
    pub fn get_point<ADC, A, AE>(&mut self, adc: &mut A) -> Result<TouchPoint, Error<E, AE>>
    where
        PinXM: Channel<ADC>,
        PinYP: Channel<ADC>,
        A: OneShot<ADC, u16, PinXM, Error = AE> + OneShot<ADC, u16, PinYP, Error = AE>,
    {
        let tolerance = self.config.noise_tolerance;

        let (x0, x1) = self.sample_x(adc)?;
        let mut valid = within_tolerance(x0, x1, tolerance);
        let x = i32::from(x0) + i32::from(x1);

        // x- and y- stay claimed for the pressure read below
        let mut x_m = self.x_m.analog().map_err(Error::Pin)?;
        let mut y_m = self.y_m.output(PinState::Low).map_err(Error::Pin)?;
        let (y0, y1) = {
            let _x_p = self.x_p.input().map_err(Error::Pin)?;
            let _y_p = self.y_p.output(PinState::High).map_err(Error::Pin)?;
            sample_pair(&mut x_m, adc, &self.config).map_err(Error::Adc)?
        };
        valid &= within_tolerance(y0, y1, tolerance);
        let y = i32::from(y0) + i32::from(y1);

        if !valid {
            #[cfg(feature = "defmt")]
            defmt::trace!("noisy point: x {} {} y {} {}", x0, x1, y0, y1);
            return Ok(TouchPoint::new(x, y, 0));
        }

        let _x_p = self.x_p.output(PinState::Low).map_err(Error::Pin)?;
        y_m.set_state(PinState::High).map_err(Error::Pin)?;
        let mut y_p = self.y_p.analog().map_err(Error::Pin)?;

        let bits = self.config.adc_bits;
        let shift = self.config.sample_shift;
        let z1 = read_raw(&mut x_m, adc, bits).map_err(Error::Adc)? >> shift;
        let z2 = read_raw(&mut y_p, adc, bits).map_err(Error::Adc)? >> shift;

        let z = touch_pressure(z1, z2, x, self.config.x_plate_ohms);
        Ok(TouchPoint::new(x, y, z))
    }

    /// Two position samples on Y+ with the x-plate energised.
    fn sample_x<ADC, A, AE>(&mut self, adc: &mut A) -> Result<(u16, u16), Error<E, AE>>
    where
        PinYP: Channel<ADC>,
        A: OneShot<ADC, u16, PinYP, Error = AE>,
    {
        // y-plate floats, y+ is sampled
        let _y_m = self.y_m.input().map_err(Error::Pin)?;
        let mut y_p = self.y_p.analog().map_err(Error::Pin)?;

        // apply potential across the x-plate
        let _x_p = self.x_p.output(PinState::High).map_err(Error::Pin)?;
        let _x_m = self.x_m.output(PinState::Low).map_err(Error::Pin)?;

        sample_pair(&mut y_p, adc, &self.config).map_err(Error::Adc)
    }
}

/// Average of a steady sample pair, `0` for a noisy one.
fn settle(s0: u16, s1: u16, tolerance: u16) -> u16 {
    if within_tolerance(s0, s1, tolerance) {
        average(s0, s1)
    } else {
        #[cfg(feature = "defmt")]
        defmt::trace!("noisy samples: {} {}", s0, s1);
        0
    }
}

fn sample_pair<P, ADC, A>(
    pin: &mut Claim<'_, P, Analog>,
    adc: &mut A,
    config: &Config,
) -> Result<(u16, u16), A::Error>
where
    P: TouchPin + Channel<ADC>,
    A: OneShot<ADC, u16, P>,
{
    let s0 = read_position(pin, adc, config)?;
    let s1 = read_position(pin, adc, config)?;
    Ok((s0, s1))
}

/// One position sample, reduced by `sample_shift`.
fn read_position<P, ADC, A>(
    pin: &mut Claim<'_, P, Analog>,
    adc: &mut A,
    config: &Config,
) -> Result<u16, A::Error>
where
    P: TouchPin + Channel<ADC>,
    A: OneShot<ADC, u16, P>,
{
    let value = match config.sampling {
        SamplingMode::Raw => read_raw(pin, adc, config.adc_bits)?,
        SamplingMode::Averaged(count) => {
            let mut mean = TrimmedMean::new();
            for _ in 0..count {
                mean.push(read_raw(pin, adc, config.adc_bits)?);
            }
            mean.mean()
        }
    };
    Ok(value >> config.sample_shift)
}

fn read_raw<P, ADC, A>(pin: &mut Claim<'_, P, Analog>, adc: &mut A, bits: u8) -> Result<u16, A::Error>
where
    P: TouchPin + Channel<ADC>,
    A: OneShot<ADC, u16, P>,
{
    Ok(widen(pin.read(adc)?, bits))
}
