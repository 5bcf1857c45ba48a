//! Role multiplexing for the four shared touch panel terminals.
//!
//! Each terminal spends most of its life disabled. A measurement claims it
//! as a driven output, a floating input or an analog input, and the
//! returned [`Claim`] hands the pin back to the disabled state when it goes
//! out of scope. Because a claim holds `&mut TouchIO`, a pin can never carry
//! two roles at once.

use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::v2::{OutputPin, PinState};

/// Role switching primitives of a single touch panel terminal.
///
/// Levels are driven through the [`OutputPin`] supertrait while the pin is
/// in output mode. HALs with type-state pins typically implement this on a
/// small wrapper that swaps the pin between its mode types.
pub trait TouchPin: OutputPin {
    /// Configure as a push-pull output already driving `state`
    fn make_output(&mut self, state: PinState) -> Result<(), Self::Error>;

    /// Configure as a high impedance digital input
    fn make_input(&mut self) -> Result<(), Self::Error>;

    /// Connect the pin to the ADC
    fn make_adc(&mut self) -> Result<(), Self::Error>;

    /// Disconnect the pin from both the GPIO and the ADC
    fn make_disabled(&mut self) -> Result<(), Self::Error>;
}

/// Role currently held by a [`TouchIO`]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Disabled,
    Output,
    Input,
    Adc,
}

/// Claim marker: driven output
#[derive(Debug)]
pub struct Output;
/// Claim marker: floating input
#[derive(Debug)]
pub struct Input;
/// Claim marker: analog input
#[derive(Debug)]
pub struct Analog;

/// One touch panel terminal together with the role it currently holds.
#[derive(Debug)]
pub struct TouchIO<P> {
    pin: P,
    role: Role,
}

impl<P> TouchIO<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            role: Role::Disabled,
        }
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: TouchPin> TouchIO<P> {
    /// Claim the pin as an output and drive it to `state` straight away.
    #[inline]
    pub fn output(&mut self, state: PinState) -> Result<Claim<'_, P, Output>, P::Error> {
        self.claim(Role::Output, |pin| pin.make_output(state))
    }

    /// Claim the pin as a floating input.
    #[inline]
    pub fn input(&mut self) -> Result<Claim<'_, P, Input>, P::Error> {
        self.claim(Role::Input, |pin| pin.make_input())
    }

    /// Claim the pin for analog sampling.
    #[inline]
    pub fn analog(&mut self) -> Result<Claim<'_, P, Analog>, P::Error> {
        self.claim(Role::Adc, |pin| pin.make_adc())
    }

    fn claim<MODE>(
        &mut self,
        role: Role,
        configure: impl FnOnce(&mut P) -> Result<(), P::Error>,
    ) -> Result<Claim<'_, P, MODE>, P::Error> {
        self.role = role;
        if let Err(e) = configure(&mut self.pin) {
            // the pin may be half configured, put it back
            self.release().ok();
            return Err(e);
        }
        Ok(Claim {
            io: self,
            _mode: PhantomData,
        })
    }

    /// Return the pin to the disabled state. Outputs are pulled low first so
    /// the panel is not left under voltage. Does nothing on a disabled pin.
    /// The pin is disabled even when pulling it low fails; the first error
    /// is returned.
    fn release(&mut self) -> Result<(), P::Error> {
        let pulled_low = match self.role {
            Role::Disabled => return Ok(()),
            Role::Output => self.pin.set_low(),
            Role::Input | Role::Adc => Ok(()),
        };
        let disabled = self.pin.make_disabled();
        self.role = Role::Disabled;
        pulled_low.and(disabled)
    }
}

/// Scoped ownership of one pin role. Dropping the claim releases the pin;
/// use [`Claim::release`] to observe a failing release instead.
pub struct Claim<'a, P: TouchPin, MODE> {
    io: &'a mut TouchIO<P>,
    _mode: PhantomData<MODE>,
}

impl<P: TouchPin, MODE> Claim<'_, P, MODE> {
    pub fn release(self) -> Result<(), P::Error> {
        self.io.release()
    }
}

impl<P: TouchPin> Claim<'_, P, Output> {
    #[inline]
    pub fn set_state(&mut self, state: PinState) -> Result<(), P::Error> {
        self.io.pin.set_state(state)
    }
}

impl<P: TouchPin> Claim<'_, P, Analog> {
    /// Block until the ADC delivers one raw conversion of this pin.
    #[inline]
    pub fn read<ADC, A>(&mut self, adc: &mut A) -> Result<u16, A::Error>
    where
        P: Channel<ADC>,
        A: OneShot<ADC, u16, P>,
    {
        nb::block!(adc.read(&mut self.io.pin))
    }
}

impl<P: TouchPin, MODE> Drop for Claim<'_, P, MODE> {
    fn drop(&mut self) {
        self.io.release().ok();
    }
}
