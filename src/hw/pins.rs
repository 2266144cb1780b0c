// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F767ZI Nucleo-144 with one HC-SR04.
//!
//! | Signal | Pin | Nucleo header |
//! | ------ | --- | ------------- |
//! | TRIG | PB1 | CN10-7 |
//! | ECHO | PA6 (TIM3_CH1, AF2) | CN12-13 |
//! | USART3 TX/RX | PD8/PD9 (AF7) | ST-LINK VCP |
//!
//! ECHO is a 5 V signal; PA6 is 5 V tolerant only as a digital input, which is all it is used as.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, Alternate, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub sensor: SensorPins,
    pub usart3: Usart3Pins,
}

/// HC-SR04 connections
pub struct SensorPins {
    pub trig: gpiob::PB1<Output<PushPull>>,
    pub echo: gpioa::PA6<Alternate<2>>,
}

/// USART3, routed to the ST-LINK virtual COM port
pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();

        Self {
            sensor: SensorPins {
                trig: gpiob.pb1.into_push_pull_output(),
                echo: gpioa.pa6.into_alternate::<2>(),
            },

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },
        }
    }
}
