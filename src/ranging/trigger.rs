// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Trigger pulse that starts one sensor echo cycle.

use core::sync::atomic::{compiler_fence, Ordering};

use embedded_hal::{delay::DelayNs, digital::OutputPin};

/// Settling time with the line low before the pulse, so the sensor sees a clean rising edge.
const SETTLE_US: u32 = 2;

/// Drives the sensor's trigger input.
pub struct PulseTrigger<PIN: OutputPin> {
    pin: PIN,
    width_us: u32,
}

impl<PIN: OutputPin> PulseTrigger<PIN> {
    /// Wrap `pin` and park it low. `width_us` is the high time of every pulse.
    pub fn new(mut pin: PIN, width_us: u32) -> Self {
        pin.set_low().ok();
        Self { pin, width_us }
    }

    #[inline]
    pub fn width_us(&self) -> u32 {
        self.width_us
    }

    /// Emit one pulse: low, high for at least `width_us`, low again.
    ///
    /// `delay` must be a calibrated delay (timer or cycle counter based); the pulse is never shorter
    /// than what it reports.
    pub fn fire<D: DelayNs>(&mut self, delay: &mut D) {
        self.pin.set_low().ok();
        delay.delay_us(SETTLE_US);

        self.pin.set_high().ok();
        // Keep the pin writes on either side of the hold time.
        compiler_fence(Ordering::SeqCst);
        delay.delay_us(self.width_us);
        compiler_fence(Ordering::SeqCst);
        self.pin.set_low().ok();
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        High,
        Low,
        Wait(u32),
    }

    /// Pin and delay writing into one timeline.
    #[derive(Default)]
    struct Timeline(Vec<Step>);

    struct Pin<'a>(&'a core::cell::RefCell<Timeline>);
    struct Delay<'a>(&'a core::cell::RefCell<Timeline>);

    impl embedded_hal::digital::ErrorType for Pin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Pin<'_> {
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().0.push(Step::High);
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().0.push(Step::Low);
            Ok(())
        }
    }

    impl DelayNs for Delay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().0.push(Step::Wait(ns));
        }

        fn delay_us(&mut self, us: u32) {
            self.0.borrow_mut().0.push(Step::Wait(us * 1_000));
        }
    }

    #[test]
    fn new_parks_the_line_low() {
        let line = core::cell::RefCell::new(Timeline::default());
        let trigger = PulseTrigger::new(Pin(&line), 10);

        assert_eq!(trigger.width_us(), 10);
        assert_eq!(line.borrow().0, [Step::Low]);
    }

    #[test]
    fn pulse_is_high_for_the_full_width() {
        let line = core::cell::RefCell::new(Timeline::default());
        let mut trigger = PulseTrigger::new(Pin(&line), 10);
        line.borrow_mut().0.clear();

        trigger.fire(&mut Delay(&line));

        assert_eq!(
            line.borrow().0,
            [
                Step::Low,
                Step::Wait(2_000),
                Step::High,
                Step::Wait(10_000),
                Step::Low,
            ]
        );
    }

    #[test]
    fn longer_pulses_are_honored() {
        let line = core::cell::RefCell::new(Timeline::default());
        let mut trigger = PulseTrigger::new(Pin(&line), 1_000);
        trigger.fire(&mut Delay(&line));

        let high_time: u32 = line
            .borrow()
            .0
            .iter()
            .skip_while(|s| **s != Step::High)
            .take_while(|s| **s != Step::Low)
            .map(|s| match s {
                Step::Wait(ns) => *ns,
                _ => 0,
            })
            .sum();
        assert_eq!(high_time, 1_000_000);
    }
}
