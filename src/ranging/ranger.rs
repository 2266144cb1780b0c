// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Blocking measurement entry point.
//!
//! One call to [`Ranger::read_distance`] runs a whole cycle:
//!
//! 1. arm the [`EchoTimer`] (rising edge selected, counter cleared),
//! 2. fire the trigger pulse,
//! 3. poll for a completed edge pair, at most `echo_timeout_us`,
//! 4. convert the echo width to centimeters and return the machine to `Idle`.
//!
//! Every read takes `&mut self`, so two reads on one sensor can never overlap.

use core::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::config::{ConfigError, TimingConfig};
use crate::ranging::{
    capture::EdgeSelect,
    distance::{self, OutOfRange},
    echo_timer::{EchoTimer, EdgePair},
    trigger::PulseTrigger,
};

/// Why a read produced no distance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// Echo measured, but outside the configured envelope.
    OutOfRange,
    /// No complete echo within the configured bound.
    Timeout,
    /// The wait was abandoned through a [`CancelToken`].
    Cancelled,
}

impl From<OutOfRange> for ReadError {
    fn from(_: OutOfRange) -> Self {
        ReadError::OutOfRange
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::OutOfRange => f.write_str("distance out of range"),
            ReadError::Timeout => f.write_str("timed out waiting for echo"),
            ReadError::Cancelled => f.write_str("measurement cancelled"),
        }
    }
}

/// One completed cycle with the raw capture data kept alongside the result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub start_tick: u32,
    pub end_tick: u32,
    pub elapsed_ticks: u32,
    pub distance: Result<u16, OutOfRange>,
}

impl Measurement {
    fn from_pair(pair: EdgePair, config: &TimingConfig) -> Self {
        Self {
            start_tick: pair.start_tick,
            end_tick: pair.end_tick,
            elapsed_ticks: pair.elapsed_ticks,
            distance: distance::compute(pair.elapsed_ticks, config),
        }
    }

    #[inline]
    pub fn distance_cm(&self) -> Option<u16> {
        self.distance.ok()
    }
}

/// Request to abandon an in-flight wait. Safe to set from an interrupt handler.
///
/// A request made while no read is waiting is kept and ends the next wait.
pub struct CancelToken {
    requested: AtomicBool,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Consume a pending request.
    #[inline]
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Measurement orchestrator for one sensor.
pub struct Ranger<'a, P, S, D>
where
    P: OutputPin,
    S: EdgeSelect,
    D: DelayNs,
{
    trigger: PulseTrigger<P>,
    capture: S,
    delay: D,
    timer: &'a EchoTimer,
    config: TimingConfig,
    cancel: Option<&'a CancelToken>,
}

impl<'a, P, S, D> Ranger<'a, P, S, D>
where
    P: OutputPin,
    S: EdgeSelect,
    D: DelayNs,
{
    /// Bind a trigger pin, the orchestrator side of the capture driver, a calibrated delay and the
    /// state machine the capture interrupt feeds.
    ///
    /// Fails if `config` does not validate; the hardware is dropped in that case.
    pub fn new(
        trigger_pin: P,
        capture: S,
        delay: D,
        timer: &'a EchoTimer,
        config: TimingConfig,
    ) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            error!("rejecting ranging configuration: {}", e);
            return Err(e);
        }

        timer.reset();
        Ok(Self {
            trigger: PulseTrigger::new(trigger_pin, config.trigger_width_us()),
            capture,
            delay,
            timer,
            config,
            cancel: None,
        })
    }

    /// Let `token` abort waits from now on.
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[inline]
    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Run one cycle and return the distance in centimeters.
    pub fn read_distance(&mut self) -> Result<u16, ReadError> {
        Ok(self.read_measurement()?.distance?)
    }

    /// Run one cycle and return the edge pair along with the converted distance.
    ///
    /// An out-of-range echo is still a completed measurement here; only a timeout or a cancel is an
    /// error.
    pub fn read_measurement(&mut self) -> Result<Measurement, ReadError> {
        self.timer.arm(&mut self.capture);
        trace!("firing trigger");
        self.trigger.fire(&mut self.delay);

        let pair = self.wait_for_echo()?;
        self.timer.reset();

        let measurement = Measurement::from_pair(pair, &self.config);
        if measurement.distance.is_err() {
            debug!("echo of {} ticks is out of range", pair.elapsed_ticks);
        }
        Ok(measurement)
    }

    /// Give back the trigger pin, capture handle and delay.
    pub fn release(self) -> (P, S, D) {
        self.timer.reset();
        (self.trigger.free(), self.capture, self.delay)
    }

    fn wait_for_echo(&mut self) -> Result<EdgePair, ReadError> {
        let step = self.config.poll_interval_us();
        let mut remaining = self.config.echo_timeout_us();

        loop {
            // Checked before the budget so an echo landing in the last step still counts.
            if let Some(pair) = self.timer.take() {
                return Ok(pair);
            }

            if self.cancel.is_some_and(|token| token.take()) {
                self.timer.reset();
                info!("measurement cancelled");
                return Err(ReadError::Cancelled);
            }

            if remaining == 0 {
                warn!(
                    "no echo within {} us ({})",
                    self.config.echo_timeout_us(),
                    self.timer.state()
                );
                self.timer.reset();
                return Err(ReadError::Timeout);
            }

            let wait = step.min(remaining);
            self.delay.delay_us(wait);
            remaining -= wait;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TickSource;
    use crate::ranging::capture::{CaptureDriver, CaptureEvent, Edge};
    use crate::ranging::echo_timer::MeasurementState;
    use core::convert::Infallible;

    #[derive(Default)]
    struct Pin {
        pulses: u32,
        high: bool,
    }

    impl embedded_hal::digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_high(&mut self) -> Result<(), Infallible> {
            if !self.high {
                self.pulses += 1;
            }
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
    }

    /// Orchestrator side of the capture unit.
    #[derive(Default)]
    struct Regs {
        edge: Option<Edge>,
        counter_resets: u32,
    }

    impl EdgeSelect for Regs {
        fn set_edge(&mut self, edge: Edge) {
            self.edge = Some(edge);
        }

        fn reset_counter(&mut self) {
            self.counter_resets += 1;
        }
    }

    /// Interrupt side of the capture unit.
    struct Isr {
        edge: Edge,
        latched: u32,
    }

    impl EdgeSelect for Isr {
        fn set_edge(&mut self, edge: Edge) {
            self.edge = edge;
        }

        fn reset_counter(&mut self) {}
    }

    impl CaptureDriver for Isr {
        fn edge(&self) -> Edge {
            self.edge
        }

        fn read_capture(&self) -> u32 {
            self.latched
        }

        fn max_tick(&self) -> u32 {
            0xFFFF
        }
    }

    /// Delay that plays the capture interrupt: edges scheduled at an absolute time (us) are delivered
    /// once the clock passes them.
    struct Clock<'a> {
        timer: &'a EchoTimer,
        isr: Isr,
        now_us: u32,
        waits: Vec<u32>,
        edges: Vec<(u32, CaptureEvent)>,
        cancel_at: Option<(u32, &'a CancelToken)>,
    }

    impl<'a> Clock<'a> {
        fn new(timer: &'a EchoTimer) -> Self {
            Self {
                timer,
                isr: Isr {
                    edge: Edge::Rising,
                    latched: 0,
                },
                now_us: 0,
                waits: Vec::new(),
                edges: Vec::new(),
                cancel_at: None,
            }
        }

        fn echo(mut self, at_us: u32, event: CaptureEvent) -> Self {
            self.edges.push((at_us, event));
            self
        }

        fn advance(&mut self, us: u32) {
            self.now_us += us;
            self.waits.push(us);

            while let Some(&(at, event)) = self.edges.first() {
                if at > self.now_us {
                    break;
                }
                self.edges.remove(0);
                self.isr.latched = event.tick;
                self.timer.on_capture(event, &mut self.isr);
            }

            if let Some((at, token)) = self.cancel_at {
                if at <= self.now_us {
                    token.cancel();
                    self.cancel_at = None;
                }
            }
        }
    }

    impl DelayNs for Clock<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.advance(ns.div_ceil(1_000));
        }

        fn delay_us(&mut self, us: u32) {
            self.advance(us);
        }
    }

    fn one_mhz() -> TimingConfig {
        TimingConfig::new(TickSource::new(16_000_000, 16))
    }

    #[test]
    fn reads_ten_centimeters() {
        let timer = EchoTimer::new();
        let clock = Clock::new(&timer)
            .echo(100, CaptureEvent::rising(88))
            .echo(700, CaptureEvent::falling(688));

        let mut ranger =
            Ranger::new(Pin::default(), Regs::default(), clock, &timer, one_mhz()).unwrap();
        assert_eq!(ranger.read_distance(), Ok(10));
        assert_eq!(timer.state(), MeasurementState::Idle);

        let (pin, regs, _) = ranger.release();
        assert_eq!(pin.pulses, 1);
        assert!(!pin.high);
        assert_eq!(regs.edge, Some(Edge::Rising));
        assert_eq!(regs.counter_resets, 1);
    }

    #[test]
    fn measurement_keeps_the_edge_pair() {
        let timer = EchoTimer::new();
        let clock = Clock::new(&timer)
            .echo(100, CaptureEvent::rising(0xFFFF - 10))
            .echo(200, CaptureEvent::falling(1_166));

        let mut ranger =
            Ranger::new(Pin::default(), Regs::default(), clock, &timer, one_mhz()).unwrap();
        let m = ranger.read_measurement().unwrap();

        assert_eq!(m.start_tick, 0xFFFF - 10);
        assert_eq!(m.end_tick, 1_166);
        assert_eq!(m.elapsed_ticks, 1_177);
        // 1177 us * 340 m/s / 2 = 20.0 cm
        assert_eq!(m.distance_cm(), Some(20));
    }

    #[test]
    fn missing_echo_times_out_after_the_budget() {
        let timer = EchoTimer::new();
        let clock = Clock::new(&timer);

        let mut ranger =
            Ranger::new(Pin::default(), Regs::default(), clock, &timer, one_mhz()).unwrap();
        assert_eq!(ranger.read_distance(), Err(ReadError::Timeout));
        assert_eq!(timer.state(), MeasurementState::Idle);

        let (_, _, clock) = ranger.release();
        // Trigger settle + pulse, then exactly the echo timeout.
        assert_eq!(clock.now_us, 2 + 10 + 60_000);
    }

    #[test]
    fn echo_that_never_falls_times_out() {
        let timer = EchoTimer::new();
        let clock = Clock::new(&timer).echo(100, CaptureEvent::rising(88));

        let mut ranger =
            Ranger::new(Pin::default(), Regs::default(), clock, &timer, one_mhz()).unwrap();
        assert_eq!(ranger.read_distance(), Err(ReadError::Timeout));
        assert_eq!(timer.state(), MeasurementState::Idle);
    }

    #[test]
    fn poll_steps_never_overshoot_the_timeout() {
        let timer = EchoTimer::new();
        let clock = Clock::new(&timer);
        let config = one_mhz()
            .with_echo_timeout_us(120)
            .with_poll_interval_us(50);

        let mut ranger = Ranger::new(Pin::default(), Regs::default(), clock, &timer, config).unwrap();
        assert_eq!(ranger.read_distance(), Err(ReadError::Timeout));

        let (_, _, clock) = ranger.release();
        assert_eq!(clock.waits, [2, 10, 50, 50, 20]);
    }

    #[test]
    fn echo_on_the_last_step_is_not_a_timeout() {
        let timer = EchoTimer::new();
        let clock = Clock::new(&timer)
            .echo(20, CaptureEvent::rising(0))
            .echo(132, CaptureEvent::falling(118));
        let config = one_mhz()
            .with_echo_timeout_us(120)
            .with_poll_interval_us(50);

        let mut ranger = Ranger::new(Pin::default(), Regs::default(), clock, &timer, config).unwrap();
        assert_eq!(ranger.read_distance(), Ok(2));
    }

    #[test]
    fn short_echo_is_out_of_range() {
        let timer = EchoTimer::new();
        let clock = Clock::new(&timer)
            .echo(20, CaptureEvent::rising(0))
            .echo(60, CaptureEvent::falling(30))
            .echo(1_000, CaptureEvent::rising(0))
            .echo(1_040, CaptureEvent::falling(30));

        let mut ranger =
            Ranger::new(Pin::default(), Regs::default(), clock, &timer, one_mhz()).unwrap();

        let m = ranger.read_measurement().unwrap();
        assert_eq!(m.distance, Err(OutOfRange));
        assert_eq!(m.distance_cm(), None);

        assert_eq!(ranger.read_distance(), Err(ReadError::OutOfRange));
        assert_eq!(timer.state(), MeasurementState::Idle);
    }

    #[test]
    fn consecutive_reads_start_from_a_clean_cycle() {
        let timer = EchoTimer::new();
        let clock = Clock::new(&timer)
            .echo(100, CaptureEvent::rising(88))
            .echo(700, CaptureEvent::falling(688))
            // Stray falling edge between cycles.
            .echo(750, CaptureEvent::falling(5))
            .echo(5_000, CaptureEvent::rising(100))
            .echo(5_300, CaptureEvent::falling(400));

        let mut ranger =
            Ranger::new(Pin::default(), Regs::default(), clock, &timer, one_mhz()).unwrap();
        assert_eq!(ranger.read_distance(), Ok(10));
        assert_eq!(ranger.read_distance(), Ok(5));

        let (pin, regs, _) = ranger.release();
        assert_eq!(pin.pulses, 2);
        assert_eq!(regs.counter_resets, 2);
    }

    #[test]
    fn cancel_ends_the_wait_and_resets() {
        let timer = EchoTimer::new();
        let token = CancelToken::new();
        let mut clock = Clock::new(&timer).echo(100, CaptureEvent::rising(88));
        clock.cancel_at = Some((1_000, &token));

        let mut ranger = Ranger::new(Pin::default(), Regs::default(), clock, &timer, one_mhz())
            .unwrap()
            .with_cancel(&token);
        assert_eq!(ranger.read_distance(), Err(ReadError::Cancelled));
        assert_eq!(timer.state(), MeasurementState::Idle);
        assert!(!token.is_cancelled());

        let (_, _, clock) = ranger.release();
        assert!(clock.now_us < 2_000);
    }

    #[test]
    fn pending_cancel_applies_to_the_next_read() {
        let timer = EchoTimer::new();
        let token = CancelToken::new();
        token.cancel();

        let clock = Clock::new(&timer);
        let mut ranger = Ranger::new(Pin::default(), Regs::default(), clock, &timer, one_mhz())
            .unwrap()
            .with_cancel(&token);
        assert_eq!(ranger.read_distance(), Err(ReadError::Cancelled));
    }

    #[test]
    fn invalid_configuration_is_refused() {
        let timer = EchoTimer::new();
        let config = one_mhz().with_speed_of_sound(0.0);

        let err = Ranger::new(Pin::default(), Regs::default(), Clock::new(&timer), &timer, config)
            .err();
        assert_eq!(err, Some(ConfigError::NonPositiveSpeedOfSound));
    }

    #[test]
    fn out_of_range_converts_into_read_error() {
        assert_eq!(ReadError::from(OutOfRange), ReadError::OutOfRange);
    }
}
