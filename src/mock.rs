//! Host-side stand-ins for the pin and ADC primitives.
//!
//! All four pins and the ADC share one bench that records every role
//! change and serves scripted conversions per pin. The bench panics on
//! wiring mistakes: claiming a pin that is not disabled, sampling a pin
//! that is not analog, or disabling an output that is still driven high.

use core::cell::{RefCell, RefMut};
use std::{collections::VecDeque, rc::Rc, vec::Vec};

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::v2::{OutputPin, PinState};

use crate::touchio::TouchPin;

pub const YM: u8 = 0;
pub const XM: u8 = 1;
pub const YP: u8 = 2;
pub const XP: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Disabled,
    Output(bool),
    Input,
    Adc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Output(u8, bool),
    Input(u8),
    Adc(u8),
    Drive(u8, bool),
    Disabled(u8),
    Read(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault;

#[derive(Debug, Default)]
struct Bench {
    events: Vec<Event>,
    modes: [Mode; 4],
    samples: [VecDeque<u16>; 4],
    failing_pin: Option<u8>,
    failing_adc: bool,
    busy: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Panel(Rc<RefCell<Bench>>);

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    fn bench(&self) -> RefMut<'_, Bench> {
        self.0.borrow_mut()
    }

    pub fn pins(&self) -> (MockPin<YM>, MockPin<XM>, MockPin<YP>, MockPin<XP>) {
        (
            MockPin(self.clone()),
            MockPin(self.clone()),
            MockPin(self.clone()),
            MockPin(self.clone()),
        )
    }

    pub fn adc(&self) -> MockAdc {
        MockAdc(self.clone())
    }

    pub fn queue(&self, pin: u8, samples: &[u16]) {
        self.bench().samples[pin as usize].extend(samples.iter().copied());
    }

    pub fn pending(&self, pin: u8) -> usize {
        self.bench().samples[pin as usize].len()
    }

    pub fn fail_pin(&self, pin: u8) {
        self.bench().failing_pin = Some(pin);
    }

    pub fn fail_adc(&self) {
        self.bench().failing_adc = true;
    }

    pub fn events(&self) -> Vec<Event> {
        self.bench().events.clone()
    }

    pub fn all_released(&self) -> bool {
        self.bench().modes.iter().all(|m| *m == Mode::Disabled)
    }
}

/// Scales a 10 bit reading up to the 16 bit word the ADC would return.
pub fn tenbit(value: u16) -> u16 {
    value << 6
}

#[derive(Debug)]
pub struct MockPin<const ID: u8>(Panel);

impl<const ID: u8> MockPin<ID> {
    fn enter(&mut self, mode: Mode, event: Event) -> Result<(), Fault> {
        let mut bench = self.0.bench();
        if bench.failing_pin == Some(ID) {
            return Err(Fault);
        }
        assert_eq!(
            bench.modes[ID as usize],
            Mode::Disabled,
            "pin {} claimed while active",
            ID
        );
        bench.modes[ID as usize] = mode;
        bench.events.push(event);
        Ok(())
    }

    fn drive(&mut self, high: bool) -> Result<(), Fault> {
        let mut bench = self.0.bench();
        if bench.failing_pin == Some(ID) {
            return Err(Fault);
        }
        assert!(
            matches!(bench.modes[ID as usize], Mode::Output(_)),
            "pin {} driven outside output mode",
            ID
        );
        bench.modes[ID as usize] = Mode::Output(high);
        bench.events.push(Event::Drive(ID, high));
        Ok(())
    }
}

impl<const ID: u8> OutputPin for MockPin<ID> {
    type Error = Fault;

    fn set_low(&mut self) -> Result<(), Fault> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Fault> {
        self.drive(true)
    }
}

impl<const ID: u8> TouchPin for MockPin<ID> {
    fn make_output(&mut self, state: PinState) -> Result<(), Fault> {
        let high = state == PinState::High;
        self.enter(Mode::Output(high), Event::Output(ID, high))
    }

    fn make_input(&mut self) -> Result<(), Fault> {
        self.enter(Mode::Input, Event::Input(ID))
    }

    fn make_adc(&mut self) -> Result<(), Fault> {
        self.enter(Mode::Adc, Event::Adc(ID))
    }

    fn make_disabled(&mut self) -> Result<(), Fault> {
        let mut bench = self.0.bench();
        if bench.failing_pin == Some(ID) {
            return Err(Fault);
        }
        assert_ne!(
            bench.modes[ID as usize],
            Mode::Output(true),
            "pin {} released while driven high",
            ID
        );
        bench.modes[ID as usize] = Mode::Disabled;
        bench.events.push(Event::Disabled(ID));
        Ok(())
    }
}

impl<const ID: u8> Channel<MockAdc> for MockPin<ID> {
    type ID = u8;

    fn channel() -> u8 {
        ID
    }
}

#[derive(Debug)]
pub struct MockAdc(Panel);

impl<const ID: u8> OneShot<MockAdc, u16, MockPin<ID>> for MockAdc {
    type Error = Fault;

    fn read(&mut self, _pin: &mut MockPin<ID>) -> nb::Result<u16, Fault> {
        let mut bench = self.0.bench();
        if bench.failing_adc {
            return Err(nb::Error::Other(Fault));
        }
        assert_eq!(
            bench.modes[ID as usize],
            Mode::Adc,
            "pin {} sampled outside analog mode",
            ID
        );
        // every conversion reports busy once before completing
        bench.busy = !bench.busy;
        if bench.busy {
            return Err(nb::Error::WouldBlock);
        }
        bench.events.push(Event::Read(ID));
        Ok(bench.samples[ID as usize]
            .pop_front()
            .expect("no conversion queued"))
    }
}
