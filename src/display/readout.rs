// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-line distance readout.
//!
//! ```text
//!   col 0         11  14
//!   Distance = 123 cm
//!   out of range
//! ```
//!
//! Only the value field and the status line are redrawn per reading. The value is padded to its full
//! width so a shorter number never leaves stale digits behind, and a value too wide for the field is
//! shown as dashes with a status instead of overwriting the unit.

use crate::display::TextDisplay;
use crate::ranging::ReadError;

const LABEL: &str = "Distance = ";
const VALUE_COL: u8 = 11;
const VALUE_WIDTH: usize = 3;
/// Largest value that fits the field without running into the unit.
const VALUE_MAX: u16 = 999;
const UNIT_COL: u8 = 14;
const STATUS_ROW: u8 = 1;
const STATUS_WIDTH: usize = 16;

const BLANK: &str = "                ";

pub struct Readout<D: TextDisplay> {
    display: D,
}

impl<D: TextDisplay> Readout<D> {
    /// Take over `display`, clear it and draw the fixed label and unit.
    pub fn new(display: D) -> Self {
        let mut readout = Self { display };
        readout.redraw();
        readout
    }

    /// Clear and draw the static parts again, e.g. after the display was power cycled.
    pub fn redraw(&mut self) {
        self.display.clear();
        self.display.display_string_at(0, 0, LABEL);
        self.display.display_string_at(0, UNIT_COL, "cm");
    }

    /// Show the outcome of one read.
    pub fn show(&mut self, reading: Result<u16, ReadError>) {
        self.display.move_cursor(0, VALUE_COL);
        match reading {
            Ok(cm) if cm <= VALUE_MAX => {
                self.display.display_integer(u32::from(cm));
                let digits = decimal_digits(u32::from(cm));
                if digits < VALUE_WIDTH {
                    self.display.display_string(&BLANK[..VALUE_WIDTH - digits]);
                }
            }
            _ => self.display.display_string("---"),
        }
        self.display.display_string_at(0, UNIT_COL, "cm");

        let status = match reading {
            Ok(cm) if cm > VALUE_MAX => "over 999 cm",
            Ok(_) => "",
            Err(ReadError::OutOfRange) => "out of range",
            Err(ReadError::Timeout) => "no echo",
            Err(ReadError::Cancelled) => "cancelled",
        };
        self.display.display_string_at(STATUS_ROW, 0, status);
        self.display
            .display_string(&BLANK[..STATUS_WIDTH.saturating_sub(status.len())]);
    }

    pub fn free(self) -> D {
        self.display
    }
}

fn decimal_digits(mut n: u32) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x16 character LCD.
    struct Lcd {
        cells: [[u8; 16]; 2],
        row: usize,
        col: usize,
        clears: u32,
    }

    impl Lcd {
        fn new() -> Self {
            Self {
                cells: [[b'#'; 16]; 2],
                row: 0,
                col: 0,
                clears: 0,
            }
        }

        fn line(&self, row: usize) -> &str {
            core::str::from_utf8(&self.cells[row]).unwrap()
        }
    }

    impl TextDisplay for Lcd {
        fn display_string(&mut self, s: &str) {
            for &b in s.as_bytes() {
                if self.col < 16 {
                    self.cells[self.row][self.col] = b;
                }
                self.col += 1;
            }
        }

        fn move_cursor(&mut self, row: u8, col: u8) {
            self.row = row as usize;
            self.col = col as usize;
        }

        fn display_integer(&mut self, value: u32) {
            let s = value.to_string();
            self.display_string(&s);
        }

        fn clear(&mut self) {
            self.cells = [[b' '; 16]; 2];
            self.row = 0;
            self.col = 0;
            self.clears += 1;
        }
    }

    #[test]
    fn new_draws_the_frame() {
        let readout = Readout::new(Lcd::new());
        let lcd = readout.free();

        assert_eq!(lcd.clears, 1);
        assert_eq!(lcd.line(0), "Distance =    cm");
        assert_eq!(lcd.line(1), "                ");
    }

    #[test]
    fn shows_each_width_in_place() {
        let mut readout = Readout::new(Lcd::new());

        readout.show(Ok(123));
        assert_eq!(readout.display.line(0), "Distance = 123cm");

        readout.show(Ok(45));
        assert_eq!(readout.display.line(0), "Distance = 45 cm");

        readout.show(Ok(7));
        assert_eq!(readout.display.line(0), "Distance = 7  cm");
    }

    #[test]
    fn errors_show_dashes_and_a_status() {
        let mut readout = Readout::new(Lcd::new());

        readout.show(Err(ReadError::OutOfRange));
        assert_eq!(readout.display.line(0), "Distance = ---cm");
        assert_eq!(readout.display.line(1), "out of range    ");

        readout.show(Err(ReadError::Timeout));
        assert_eq!(readout.display.line(1), "no echo         ");

        readout.show(Err(ReadError::Cancelled));
        assert_eq!(readout.display.line(1), "cancelled       ");
    }

    #[test]
    fn valid_reading_clears_the_status() {
        let mut readout = Readout::new(Lcd::new());
        readout.show(Err(ReadError::Timeout));
        readout.show(Ok(250));

        assert_eq!(readout.display.line(0), "Distance = 250cm");
        assert_eq!(readout.display.line(1), "                ");
    }

    #[test]
    fn values_wider_than_the_field_keep_the_unit() {
        let mut readout = Readout::new(Lcd::new());

        readout.show(Ok(999));
        assert_eq!(readout.display.line(0), "Distance = 999cm");
        assert_eq!(readout.display.line(1), "                ");

        for cm in [1_000, 4_000, u16::MAX] {
            readout.show(Ok(cm));
            assert_eq!(readout.display.line(0), "Distance = ---cm");
            assert_eq!(readout.display.line(1), "over 999 cm     ");
        }

        readout.show(Ok(12));
        assert_eq!(readout.display.line(0), "Distance = 12 cm");
        assert_eq!(readout.display.line(1), "                ");
    }

    #[test]
    fn digit_count() {
        assert_eq!(decimal_digits(0), 1);
        assert_eq!(decimal_digits(9), 1);
        assert_eq!(decimal_digits(10), 2);
        assert_eq!(decimal_digits(400), 3);
        assert_eq!(decimal_digits(u32::MAX), 10);
    }
}
