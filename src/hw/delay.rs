// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SysTick busy-wait delay.
//!
//! Counts core clock cycles on SysTick, so it is calibrated to `sysclk` regardless of optimization
//! level. Used for the trigger pulse width and the echo poll interval.

use cortex_m::{delay::Delay, peripheral::SYST};
use embedded_hal::delay::DelayNs;

pub struct SysDelay {
    delay: Delay,
}

impl SysDelay {
    /// `sysclk_hz` must be the core clock SysTick runs from.
    pub fn new(syst: SYST, sysclk_hz: u32) -> Self {
        Self {
            delay: Delay::new(syst, sysclk_hz),
        }
    }

    pub fn free(self) -> SYST {
        self.delay.free()
    }
}

impl DelayNs for SysDelay {
    /// Rounded up to whole microseconds; never shorter than asked.
    #[inline]
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_us(ns.div_ceil(1_000));
    }

    #[inline]
    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
