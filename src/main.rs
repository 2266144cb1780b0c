// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::{cell::RefCell, fmt::Write};

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use critical_section::Mutex;
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Instance, Serial},
};
use stm32f7xx_hal as hal;

use echorange::{
    config::{ConfigError, TickSource, TimingConfig},
    display::Readout,
    hw::{BoardPins, EchoCapture, SysDelay, Terminal, TriggerLine},
    ranging::{CaptureCell, EchoTimer, Ranger, SharedCapture},
};

/// Capture counter rate: one tick per microsecond.
const TICK_HZ: u32 = 1_000_000;

const BAUD_RATE: u32 = 115_200;

/// Quiet time between trigger pulses so late echoes die out before the next cycle.
const CYCLE_DELAY_MS: u32 = 60;

static ECHO: EchoTimer = EchoTimer::new();
static CAPTURE: CaptureCell<EchoCapture> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let sysclk_hz = clocks.sysclk().raw();
    let timclk_hz = clocks.timclk1().raw();

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);

    // USART3 (ST-LINK VCP)
    let usart_cfg = Config {
        baud_rate: BAUD_RATE.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART3,
        (pins.usart3.tx, pins.usart3.rx),
        &clocks,
        usart_cfg,
    );
    let mut terminal = Terminal::new(serial);

    // TIM3 CH1 echo capture
    let tick = TickSource::new(timclk_hz, timclk_hz / TICK_HZ);
    let mut capture = match EchoCapture::tim3(dp.TIM3, pins.sensor.echo, tick) {
        Ok(capture) => capture,
        Err(e) => fatal(&mut terminal, e),
    };
    capture.set_handler(&ECHO);
    let capture = SharedCapture::install(&CAPTURE, capture);

    let trigger = TriggerLine::direct(pins.sensor.trig);
    let delay = SysDelay::new(cp.SYST, sysclk_hz);

    let config = TimingConfig::new(tick);
    let mut ranger = match Ranger::new(trigger, capture, delay, &ECHO, config) {
        Ok(ranger) => ranger,
        Err(e) => fatal(&mut terminal, e),
    };

    #[cfg(feature = "defmt")]
    defmt::info!(
        "sysclk {} Hz, capture tick {} Hz",
        sysclk_hz,
        tick.tick_hz()
    );

    unsafe { NVIC::unmask(pac::Interrupt::TIM3) };

    let mut readout = Readout::new(terminal);
    let cycle_delay_cycles = sysclk_hz / 1_000 * CYCLE_DELAY_MS;

    loop {
        let reading = ranger.read_distance();
        readout.show(reading);
        cortex_m::asm::delay(cycle_delay_cycles);
    }
}

/// Report a configuration the hardware cannot run and refuse to start.
fn fatal<U: Instance>(terminal: &mut Terminal<U>, e: ConfigError) -> ! {
    let _ = writeln!(terminal, "{}\r", e);
    terminal.flush();
    panic!("{}", e);
}

#[interrupt]
fn TIM3() {
    critical_section::with(|cs| {
        if let Some(capture) = CAPTURE.borrow_ref_mut(cs).as_mut() {
            capture.on_interrupt();
        }
    });
}
