// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Character display service and the distance readout drawn on it.

pub mod readout;

pub use readout::Readout;

/// Row/column addressed text output, such as a character LCD or a terminal.
pub trait TextDisplay {
    /// Write `s` at the cursor and advance it.
    fn display_string(&mut self, s: &str);

    /// Put the cursor at `row`, `col` (both zero-based).
    fn move_cursor(&mut self, row: u8, col: u8);

    /// Write `value` in decimal at the cursor.
    fn display_integer(&mut self, value: u32);

    /// Blank the whole display and home the cursor.
    fn clear(&mut self);

    #[inline]
    fn display_string_at(&mut self, row: u8, col: u8, s: &str) {
        self.move_cursor(row, col);
        self.display_string(s);
    }
}

impl<T: TextDisplay + ?Sized> TextDisplay for &mut T {
    #[inline]
    fn display_string(&mut self, s: &str) {
        (**self).display_string(s)
    }

    #[inline]
    fn move_cursor(&mut self, row: u8, col: u8) {
        (**self).move_cursor(row, col)
    }

    #[inline]
    fn display_integer(&mut self, value: u32) {
        (**self).display_integer(value)
    }

    #[inline]
    fn clear(&mut self) {
        (**self).clear()
    }
}
