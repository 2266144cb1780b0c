// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Capture driver shared between thread mode and the capture interrupt.
//!
//! The interrupt handler borrows the driver from a `static` [`CaptureCell`] inside a critical
//! section; the orchestrator gets a [`SharedCapture`] that does the same for every call, so the two
//! never touch the timer registers at the same time.
//!
//! ```ignore
//! static CAPTURE: CaptureCell<InputCapture<pac::TIM3>> = CaptureCell::new(RefCell::new(None));
//!
//! let shared = SharedCapture::install(&CAPTURE, capture);
//!
//! #[interrupt]
//! fn TIM3() {
//!     critical_section::with(|cs| {
//!         if let Some(capture) = CAPTURE.borrow_ref_mut(cs).as_mut() {
//!             capture.on_interrupt();
//!         }
//!     });
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::ranging::capture::{Edge, EdgeSelect};

/// Storage for a capture driver reachable from an interrupt handler.
pub type CaptureCell<C> = Mutex<RefCell<Option<C>>>;

/// Thread-mode handle to a driver parked in a [`CaptureCell`].
pub struct SharedCapture<C: 'static> {
    cell: &'static CaptureCell<C>,
}

impl<C: 'static> SharedCapture<C> {
    /// Move `capture` into `cell`, replacing anything already there.
    pub fn install(cell: &'static CaptureCell<C>, capture: C) -> Self {
        critical_section::with(|cs| {
            cell.borrow_ref_mut(cs).replace(capture);
        });
        Self { cell }
    }

    /// Run `f` on the driver with interrupts masked. `None` once the driver was released.
    pub fn with<R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        critical_section::with(|cs| self.cell.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Take the driver back out. The interrupt handler sees an empty cell afterwards.
    pub fn release(self) -> Option<C> {
        critical_section::with(|cs| self.cell.borrow_ref_mut(cs).take())
    }
}

impl<C: EdgeSelect + 'static> EdgeSelect for SharedCapture<C> {
    fn set_edge(&mut self, edge: Edge) {
        self.with(|capture| capture.set_edge(edge));
    }

    fn reset_counter(&mut self) {
        self.with(|capture| capture.reset_counter());
    }
}
