// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Echo width to distance conversion.
//!
//! The echo stays high for the round trip (sensor to target and back), so
//!
//! ```text
//! distance_cm = round(ticks * tick_period_s * speed_of_sound_m_per_s * 100 / 2)
//! ```
//!
//! and the result must land inside the configured envelope. Readings outside it mean no usable echo
//! (or a saturated sensor) and are reported as [`OutOfRange`], never clamped.
//!
//! The product is formed in `f64` before the single division by the clock, so an echo that is exactly
//! N.5 cm wide (integer speed of sound) lands on N.5 and rounds up.

use core::fmt;

use crate::config::TimingConfig;

/// Echo width maps to a distance outside `[min_distance_cm, max_distance_cm]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("distance out of range")
    }
}

/// Unrounded one-way distance in centimeters for an echo `elapsed_ticks` wide.
#[inline]
pub fn raw_distance_cm(elapsed_ticks: u32, config: &TimingConfig) -> f64 {
    let source = config.tick_source();
    // ticks * prescaler / clock_hz * speed * 100 / 2, with one division last.
    let scaled = elapsed_ticks as f64
        * source.prescaler as f64
        * config.speed_of_sound_m_per_s() as f64
        * 50.0;
    scaled / source.clock_hz as f64
}

/// Convert an echo width in counter ticks to whole centimeters (round half up).
pub fn compute(elapsed_ticks: u32, config: &TimingConfig) -> Result<u16, OutOfRange> {
    // `as` truncates toward zero and saturates, so this is floor(x + 0.5) for x >= 0 and huge tick
    // counts cannot wrap into the envelope.
    let cm = (raw_distance_cm(elapsed_ticks, config) + 0.5) as u64;

    if cm < u64::from(config.min_distance_cm()) || cm > u64::from(config.max_distance_cm()) {
        return Err(OutOfRange);
    }
    Ok(cm as u16)
}
