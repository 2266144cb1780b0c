// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Sensor trigger output, generic over any GPIO pin.
//!
//! The HC-SR04 is a 5 V part; boards that feed TRIG through an inverting level shifter use
//! [`TriggerLine::inverted`] so the ranging code can keep thinking in sensor levels.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use stm32f7xx_hal::gpio::{self, Output, PushPull};

/// Whether the sensor sees the pin level as-is or through an inverter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// Push-pull trigger output that starts in the sensor's idle (low) state.
pub struct TriggerLine<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Output<PushPull>>,
    active: ActiveLevel,
}

impl<const P: char, const N: u8> TriggerLine<P, N> {
    pub fn new<MODE>(pin: gpio::Pin<P, N, MODE>, active: ActiveLevel) -> Self {
        let mut line = Self {
            pin: pin.into_push_pull_output(),
            active,
        };
        line.drive(false);
        line
    }

    #[inline]
    pub fn direct<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    #[inline]
    pub fn inverted<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the sensor's TRIG input high (`true`) or low.
    fn drive(&mut self, high: bool) {
        match (self.active, high) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high(),
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low(),
        }
    }

    pub fn free(self) -> gpio::Pin<P, N, Output<PushPull>> {
        self.pin
    }
}

impl<const P: char, const N: u8> ErrorType for TriggerLine<P, N> {
    type Error = Infallible;
}

impl<const P: char, const N: u8> OutputPin for TriggerLine<P, N> {
    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }
}
