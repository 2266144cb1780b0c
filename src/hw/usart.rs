// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART terminal used as the distance display.
//!
//! Implements [`TextDisplay`] with ANSI cursor addressing, so any VT100-compatible serial terminal
//! shows the same two-line layout a character LCD would.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! To access the terminal on the host machine, connect to the ST-LINK USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

use crate::display::TextDisplay;

pub struct Terminal<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Terminal<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    pub fn print_u32(&mut self, mut n: u32) {
        let mut buf = [0u8; 10];
        let mut i = buf.len();
        if n == 0 {
            self.write_byte(b'0');
            return;
        }
        while n > 0 {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
        }
        for &b in &buf[i..] {
            self.write_byte(b);
        }
    }
}

impl<U: Instance> TextDisplay for Terminal<U> {
    #[inline]
    fn display_string(&mut self, s: &str) {
        self.write_str(s);
    }

    /// `ESC [ row ; col H`, one-based on the wire.
    fn move_cursor(&mut self, row: u8, col: u8) {
        self.write_str("\x1b[");
        self.print_u32(u32::from(row) + 1);
        self.write_byte(b';');
        self.print_u32(u32::from(col) + 1);
        self.write_byte(b'H');
    }

    #[inline]
    fn display_integer(&mut self, value: u32) {
        self.print_u32(value);
    }

    fn clear(&mut self) {
        // Erase screen, home cursor, hide cursor.
        self.write_str("\x1b[2J\x1b[H\x1b[?25l");
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Terminal`.
impl<U: Instance> fmt::Write for Terminal<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Terminal::write_str(self, s);
        Ok(())
    }
}
