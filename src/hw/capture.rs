// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Echo input capture on TIM3 channel 1 (PA6, AF2).
//!
//! TIM3 free-runs over its full 16-bit range at the configured tick rate. Each selected edge on the
//! echo pin latches CNT into CCR1 and raises the CC1 interrupt; [`InputCapture::on_interrupt`] turns
//! that into one [`CaptureEvent`](crate::ranging::CaptureEvent) for the registered handler.
//!
//! Example:
//! ```ignore
//! static ECHO: EchoTimer = EchoTimer::new();
//!
//! let mut capture = EchoCapture::tim3(dp.TIM3, pins.sensor.echo, TickSource::new(16_000_000, 16))?;
//! capture.set_handler(&ECHO);
//! ```

use stm32f7xx_hal::{
    gpio::{gpioa, Alternate},
    pac,
};

use crate::config::{ConfigError, TickSource};
use crate::ranging::capture::{CaptureDriver, Edge, EdgeHandler, EdgeSelect};

/// TI1 input filter: f_SAMPLING = f_CK_INT, N = 8. Rejects sub-microsecond glitches on the echo line.
const IC1F_CK_INT_N8: u8 = 0b0011;

pub struct InputCapture<TIM, PIN> {
    tim: TIM,
    pin: PIN,
    edge: Edge,
    handler: Option<&'static dyn EdgeHandler>,
}

/// TIM3 CH1 capture on the Nucleo echo pin.
pub type EchoCapture = InputCapture<pac::TIM3, gpioa::PA6<Alternate<2>>>;

impl<TIM, PIN> InputCapture<TIM, PIN> {
    /// Register the context object that receives every latched edge. Replaces any previous one.
    #[inline]
    pub fn set_handler(&mut self, handler: &'static dyn EdgeHandler) {
        self.handler = Some(handler);
    }
}

impl EchoCapture {
    /// Configure TIM3 CH1 for input capture on rising edges, counting at `tick.tick_hz()`.
    ///
    /// `tick.clock_hz` must be the TIM3 kernel clock (APB1 timer clock) for the tick period to match.
    /// Fails without touching the timer if `tick.prescaler` does not fit the 16-bit PSC register.
    pub fn tim3(
        tim3: pac::TIM3,
        echo: gpioa::PA6<Alternate<2>>,
        tick: TickSource,
    ) -> Result<Self, ConfigError> {
        let psc = tick.prescaler_register(16)?;

        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());
        rcc.apb1rstr.modify(|_, w| w.tim3rst().set_bit());
        rcc.apb1rstr.modify(|_, w| w.tim3rst().clear_bit());

        let tim = tim3;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // Tick rate: CK_CNT = CK_PSC / (PSC + 1)
        tim.psc.write(|w| unsafe { w.bits(psc) });

        // Auto-reload: max 16-bit
        tim.arr.write(|w| unsafe { w.bits(0xFFFF) });

        // Load PSC now instead of at the first overflow
        tim.egr.write(|w| w.ug().set_bit());

        // CH1 as input from TI1, filtered
        tim.ccmr1_input()
            .modify(|_, w| unsafe { w.cc1s().ti1().ic1f().bits(IC1F_CK_INT_N8) });

        // Rising edge, capture enabled
        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc1np()
                .clear_bit()
                .cc1e()
                .set_bit()
        });

        // Drop anything latched during setup
        tim.sr.modify(|_, w| w.cc1if().clear_bit().cc1of().clear_bit().uif().clear_bit());

        // Interrupt on capture
        tim.dier.modify(|_, w| w.cc1ie().set_bit());

        // Reset counter
        tim.cnt.write(|w| unsafe { w.bits(0) });

        // Enable counter
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Ok(Self {
            tim,
            pin: echo,
            edge: Edge::Rising,
            handler: None,
        })
    }

    /// Service the CC1 interrupt. Call from the `TIM3` handler.
    ///
    /// Invokes the registered handler once per latched edge; spurious entries are ignored.
    pub fn on_interrupt(&mut self) {
        if self.tim.sr.read().cc1if().bit_is_clear() {
            return;
        }

        let event = self.latched_event();
        self.tim
            .sr
            .modify(|_, w| w.cc1if().clear_bit().cc1of().clear_bit());

        if let Some(handler) = self.handler {
            handler.on_edge(event, self);
        }
    }

    /// Stop the timer, disable the capture interrupt and return the peripheral and pin.
    pub fn free(self) -> (pac::TIM3, gpioa::PA6<Alternate<2>>) {
        let tim = self.tim;

        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.dier.modify(|_, w| w.cc1ie().clear_bit());
        tim.ccer.modify(|_, w| w.cc1e().clear_bit());
        tim.sr.write(|w| unsafe { w.bits(0) });
        tim.cnt.write(|w| unsafe { w.bits(0) });
        tim.psc.write(|w| unsafe { w.bits(0) });

        (tim, self.pin)
    }
}

impl EdgeSelect for EchoCapture {
    fn set_edge(&mut self, edge: Edge) {
        match edge {
            Edge::Rising => self
                .tim
                .ccer
                .modify(|_, w| w.cc1p().clear_bit().cc1np().clear_bit()),
            Edge::Falling => self
                .tim
                .ccer
                .modify(|_, w| w.cc1p().set_bit().cc1np().clear_bit()),
        }
        self.edge = edge;
    }

    #[inline]
    fn reset_counter(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
    }
}

impl CaptureDriver for EchoCapture {
    #[inline]
    fn edge(&self) -> Edge {
        self.edge
    }

    #[inline]
    fn read_capture(&self) -> u32 {
        self.tim.ccr1.read().bits() & 0xFFFF
    }

    #[inline]
    fn max_tick(&self) -> u32 {
        0xFFFF
    }
}
