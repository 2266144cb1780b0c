// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Capture driver capabilities consumed by the ranging core.
//!
//! A capture driver wraps a free-running counter plus a capture register that latches the counter
//! on a selected pin transition. The core only needs three things from it:
//!
//! - [`EdgeSelect`]: pick the edge to latch next and clear the counter (orchestrator side).
//! - [`CaptureDriver`]: read back what was latched (interrupt side).
//! - [`EdgeHandler`]: the single context object the driver calls once per latched edge.

/// Pin transition that latches the counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
}

/// One latched edge, produced by the capture driver and consumed once by the handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureEvent {
    pub edge: Edge,
    /// Counter value at the moment of the edge.
    pub tick: u32,
}

impl CaptureEvent {
    #[inline]
    pub const fn rising(tick: u32) -> Self {
        Self {
            edge: Edge::Rising,
            tick,
        }
    }

    #[inline]
    pub const fn falling(tick: u32) -> Self {
        Self {
            edge: Edge::Falling,
            tick,
        }
    }
}

/// Edge polarity and counter control.
pub trait EdgeSelect {
    /// Latch the counter on `edge` from now on.
    fn set_edge(&mut self, edge: Edge);

    /// Restart the free-running counter from zero.
    fn reset_counter(&mut self);
}

/// Full capture driver as seen from inside the capture interrupt.
pub trait CaptureDriver: EdgeSelect {
    /// Edge currently selected.
    fn edge(&self) -> Edge;

    /// Counter value latched by the most recent edge.
    fn read_capture(&self) -> u32;

    /// Largest value the counter holds before wrapping to zero (e.g. `0xFFFF` for 16 bits).
    fn max_tick(&self) -> u32;

    /// Build the event for the edge that just latched.
    #[inline]
    fn latched_event(&self) -> CaptureEvent {
        CaptureEvent {
            edge: self.edge(),
            tick: self.read_capture(),
        }
    }
}

/// Receiver of latched edges. The capture driver invokes `on_edge` exactly once per edge, from
/// interrupt context, and never re-entrantly.
pub trait EdgeHandler: Sync {
    fn on_edge(&self, event: CaptureEvent, capture: &mut dyn CaptureDriver);
}

impl<T: EdgeSelect + ?Sized> EdgeSelect for &mut T {
    #[inline]
    fn set_edge(&mut self, edge: Edge) {
        (**self).set_edge(edge)
    }

    #[inline]
    fn reset_counter(&mut self) {
        (**self).reset_counter()
    }
}
