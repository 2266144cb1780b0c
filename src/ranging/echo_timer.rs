// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Edge-capture state machine for one echo pulse.
//!
//! ```text
//!            arm()              Rising              Falling
//!   Idle ───────────▶ ArmedForRisingEdge ───▶ ArmedForFallingEdge ───▶ Complete
//!    ▲                                                                   │
//!    └─────────────────────────────── reset() ───────────────────────────┘
//! ```
//!
//! The capture interrupt is the only writer of the tick fields. It stores them first and then
//! publishes the new state with a single atomic store (release), so once the orchestrator observes
//! `Complete` (acquire) the tick fields are final: no edge is accepted again until the orchestrator
//! resets. The orchestrator never needs to mask the capture interrupt to read a result.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::ranging::capture::{CaptureDriver, CaptureEvent, Edge, EdgeHandler, EdgeSelect};

/// Where the current measurement is in its edge sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MeasurementState {
    Idle = 0,
    ArmedForRisingEdge = 1,
    ArmedForFallingEdge = 2,
    Complete = 3,
}

impl MeasurementState {
    #[inline]
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => MeasurementState::ArmedForRisingEdge,
            2 => MeasurementState::ArmedForFallingEdge,
            3 => MeasurementState::Complete,
            _ => MeasurementState::Idle,
        }
    }
}

/// Result of feeding one capture event into the state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Event did not match the armed edge, or the machine was idle or already complete.
    Ignored,
    /// Rising edge recorded; now waiting for the falling edge.
    EchoStarted,
    /// Falling edge recorded; the edge pair is published.
    EchoEnded,
}

/// Timestamps of one completed rising/falling pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgePair {
    pub start_tick: u32,
    pub end_tick: u32,
    /// `end_tick - start_tick` modulo the counter span.
    pub elapsed_ticks: u32,
}

/// Ticks from `start` to `end` on a counter that wraps after `max_tick`.
///
/// Correct as long as the counter wrapped at most once between the two edges.
#[inline]
pub fn elapsed_ticks(start: u32, end: u32, max_tick: u32) -> u32 {
    let span = max_tick as u64 + 1;
    let start = start as u64 % span;
    let end = end as u64 % span;
    ((end + span - start) % span) as u32
}

/// State machine shared between the capture interrupt and the orchestrator.
///
/// Lives in a `static` in firmware; `new` is `const` for that reason.
pub struct EchoTimer {
    state: AtomicU8,
    start_tick: AtomicU32,
    end_tick: AtomicU32,
    elapsed_ticks: AtomicU32,
}

impl EchoTimer {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(MeasurementState::Idle as u8),
            start_tick: AtomicU32::new(0),
            end_tick: AtomicU32::new(0),
            elapsed_ticks: AtomicU32::new(0),
        }
    }

    /// Current state, as last published.
    #[inline]
    pub fn state(&self) -> MeasurementState {
        MeasurementState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// True once a full edge pair is waiting to be consumed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state() == MeasurementState::Complete
    }

    /// Drop whatever is in flight, including an unconsumed result, and go `Idle`.
    #[inline]
    pub fn reset(&self) {
        self.state
            .store(MeasurementState::Idle as u8, Ordering::Release);
    }

    /// Start a new cycle: select the rising edge, clear the counter, and wait for the echo.
    ///
    /// The machine passes through `Idle` first so that an edge landing mid-reconfiguration is
    /// dropped instead of being recorded against the new cycle.
    pub fn arm<C: EdgeSelect + ?Sized>(&self, capture: &mut C) {
        self.reset();

        capture.set_edge(Edge::Rising);
        capture.reset_counter();

        self.start_tick.store(0, Ordering::Relaxed);
        self.end_tick.store(0, Ordering::Relaxed);
        self.elapsed_ticks.store(0, Ordering::Relaxed);

        self.state
            .store(MeasurementState::ArmedForRisingEdge as u8, Ordering::Release);
        trace!("echo timer armed for rising edge");
    }

    /// Feed one latched edge. Called from the capture interrupt only.
    pub fn on_capture(&self, event: CaptureEvent, capture: &mut dyn CaptureDriver) -> Transition {
        match (self.state(), event.edge) {
            (MeasurementState::ArmedForRisingEdge, Edge::Rising) => {
                self.start_tick.store(event.tick, Ordering::Relaxed);

                if self.publish(
                    MeasurementState::ArmedForRisingEdge,
                    MeasurementState::ArmedForFallingEdge,
                ) {
                    capture.set_edge(Edge::Falling);
                    Transition::EchoStarted
                } else {
                    Transition::Ignored
                }
            }

            (MeasurementState::ArmedForFallingEdge, Edge::Falling) => {
                let start = self.start_tick.load(Ordering::Relaxed);
                let elapsed = elapsed_ticks(start, event.tick, capture.max_tick());

                self.end_tick.store(event.tick, Ordering::Relaxed);
                self.elapsed_ticks.store(elapsed, Ordering::Relaxed);

                if self.publish(
                    MeasurementState::ArmedForFallingEdge,
                    MeasurementState::Complete,
                ) {
                    debug!("echo pulse: {} -> {} ({} ticks)", start, event.tick, elapsed);
                    Transition::EchoEnded
                } else {
                    Transition::Ignored
                }
            }

            (state, edge) => {
                trace!("ignoring {} edge while {}", edge, state);
                Transition::Ignored
            }
        }
    }

    /// The completed edge pair, if any. Does not consume it; call [`reset`](Self::reset) when done.
    pub fn take(&self) -> Option<EdgePair> {
        if !self.is_complete() {
            return None;
        }
        Some(EdgePair {
            start_tick: self.start_tick.load(Ordering::Relaxed),
            end_tick: self.end_tick.load(Ordering::Relaxed),
            elapsed_ticks: self.elapsed_ticks.load(Ordering::Relaxed),
        })
    }

    /// Move `from -> to` in one step. Fails if the orchestrator reset the machine meanwhile.
    #[inline]
    fn publish(&self, from: MeasurementState, to: MeasurementState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for EchoTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeHandler for EchoTimer {
    #[inline]
    fn on_edge(&self, event: CaptureEvent, capture: &mut dyn CaptureDriver) {
        self.on_capture(event, capture);
    }
}
