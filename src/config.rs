// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Timing and range configuration for a ranging cycle.
//!
//! A [`TimingConfig`] is built once at startup and copied into the
//! [`Ranger`](crate::ranging::Ranger); nothing mutates it afterwards.
//!
//! ```
//! use echorange::config::{TickSource, TimingConfig};
//!
//! // 16 MHz timer clock / 16 = 1 MHz, one tick per microsecond.
//! let config = TimingConfig::new(TickSource::new(16_000_000, 16))
//!     .with_range_cm(2, 400)
//!     .with_echo_timeout_us(60_000);
//! assert!(config.validate().is_ok());
//! ```

use core::fmt;

/// Speed of sound in dry air near 20 °C, in m/s.
pub const SPEED_OF_SOUND_M_PER_S: f32 = 340.0;

/// Closest target the HC-SR04 resolves reliably.
pub const MIN_DISTANCE_CM: u16 = 2;

/// Furthest target the HC-SR04 resolves reliably.
pub const MAX_DISTANCE_CM: u16 = 400;

/// Upper bound on one ranging cycle. The datasheet asks for at least 60 ms between triggers, and a
/// 400 cm echo is ~23.5 ms wide, so anything still pending after this is a lost echo.
pub const ECHO_TIMEOUT_US: u32 = 60_000;

/// How often the orchestrator checks for a completed edge pair while waiting.
pub const POLL_INTERVAL_US: u32 = 50;

/// Minimum trigger pulse width from the datasheet.
pub const TRIGGER_WIDTH_US: u32 = 10;

/// Clock feeding the capture counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickSource {
    /// Counter input clock in Hz (before the prescaler).
    pub clock_hz: u32,
    /// Clock divider, 1 = undivided.
    pub prescaler: u32,
}

impl TickSource {
    pub const fn new(clock_hz: u32, prescaler: u32) -> Self {
        Self {
            clock_hz,
            prescaler,
        }
    }

    /// Effective counter rate in Hz. Zero if the clock is zero or the prescaler is invalid.
    #[inline]
    pub fn tick_hz(&self) -> u32 {
        if self.prescaler == 0 {
            0
        } else {
            self.clock_hz / self.prescaler
        }
    }

    /// Duration of one counter increment in seconds.
    #[inline]
    pub fn tick_period_s(&self) -> f32 {
        self.prescaler as f32 / self.clock_hz as f32
    }

    /// Value for a prescaler register `bits` wide that divides by `PSC + 1`.
    ///
    /// Fails if the divider is zero or does not fit, instead of programming a different rate than
    /// the one distances are computed with.
    pub fn prescaler_register(&self, bits: u32) -> Result<u32, ConfigError> {
        let max_psc = if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 };
        match self.prescaler.checked_sub(1) {
            Some(psc) if psc <= max_psc => Ok(psc),
            _ => Err(ConfigError::PrescalerOutOfRange),
        }
    }
}

/// Reasons a configuration is refused at initialization.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Clock or prescaler is zero, so a tick has no finite positive duration.
    NonPositiveTickPeriod,
    /// Speed of sound is zero, negative, or not a number.
    NonPositiveSpeedOfSound,
    /// `min_distance_cm > max_distance_cm`, or the maximum is zero.
    EmptyRange,
    ZeroEchoTimeout,
    ZeroPollInterval,
    ZeroTriggerWidth,
    /// Prescaler does not fit the capture timer's divider register.
    PrescalerOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::NonPositiveTickPeriod => "tick period must be positive",
            ConfigError::NonPositiveSpeedOfSound => "speed of sound must be positive",
            ConfigError::EmptyRange => "distance range is empty",
            ConfigError::ZeroEchoTimeout => "echo timeout must be nonzero",
            ConfigError::ZeroPollInterval => "poll interval must be nonzero",
            ConfigError::ZeroTriggerWidth => "trigger pulse width must be nonzero",
            ConfigError::PrescalerOutOfRange => "timer prescaler out of range",
        };
        write!(f, "invalid configuration: {}", msg)
    }
}

/// Process-wide timing constants for one sensor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimingConfig {
    tick_source: TickSource,
    speed_of_sound_m_per_s: f32,
    min_distance_cm: u16,
    max_distance_cm: u16,
    echo_timeout_us: u32,
    poll_interval_us: u32,
    trigger_width_us: u32,
}

impl TimingConfig {
    /// Create a configuration for the given counter clock with datasheet defaults for everything
    /// else.
    pub const fn new(tick_source: TickSource) -> Self {
        Self {
            tick_source,
            speed_of_sound_m_per_s: SPEED_OF_SOUND_M_PER_S,
            min_distance_cm: MIN_DISTANCE_CM,
            max_distance_cm: MAX_DISTANCE_CM,
            echo_timeout_us: ECHO_TIMEOUT_US,
            poll_interval_us: POLL_INTERVAL_US,
            trigger_width_us: TRIGGER_WIDTH_US,
        }
    }

    /// Set the speed of sound (m/s), e.g. to compensate for temperature.
    pub fn with_speed_of_sound(mut self, m_per_s: f32) -> Self {
        self.speed_of_sound_m_per_s = m_per_s;
        self
    }

    /// Set the valid distance envelope (inclusive, cm).
    pub fn with_range_cm(mut self, min: u16, max: u16) -> Self {
        self.min_distance_cm = min;
        self.max_distance_cm = max;
        self
    }

    /// Set how long a read may wait for the falling edge before giving up.
    pub fn with_echo_timeout_us(mut self, us: u32) -> Self {
        self.echo_timeout_us = us;
        self
    }

    /// Set the spacing between completion checks while waiting.
    pub fn with_poll_interval_us(mut self, us: u32) -> Self {
        self.poll_interval_us = us;
        self
    }

    /// Set the trigger pulse width. Never go below the sensor's datasheet minimum.
    pub fn with_trigger_width_us(mut self, us: u32) -> Self {
        self.trigger_width_us = us;
        self
    }

    /// Check that every constant is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_source.clock_hz == 0 || self.tick_source.prescaler == 0 {
            return Err(ConfigError::NonPositiveTickPeriod);
        }
        // Written so that NaN fails too.
        if !(self.speed_of_sound_m_per_s > 0.0) || !self.speed_of_sound_m_per_s.is_finite() {
            return Err(ConfigError::NonPositiveSpeedOfSound);
        }
        if self.max_distance_cm == 0 || self.min_distance_cm > self.max_distance_cm {
            return Err(ConfigError::EmptyRange);
        }
        if self.echo_timeout_us == 0 {
            return Err(ConfigError::ZeroEchoTimeout);
        }
        if self.poll_interval_us == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.trigger_width_us == 0 {
            return Err(ConfigError::ZeroTriggerWidth);
        }
        Ok(())
    }

    #[inline]
    pub fn tick_source(&self) -> TickSource {
        self.tick_source
    }

    /// Duration of one counter tick in seconds.
    #[inline]
    pub fn tick_period_s(&self) -> f32 {
        self.tick_source.tick_period_s()
    }

    #[inline]
    pub fn speed_of_sound_m_per_s(&self) -> f32 {
        self.speed_of_sound_m_per_s
    }

    #[inline]
    pub fn min_distance_cm(&self) -> u16 {
        self.min_distance_cm
    }

    #[inline]
    pub fn max_distance_cm(&self) -> u16 {
        self.max_distance_cm
    }

    #[inline]
    pub fn echo_timeout_us(&self) -> u32 {
        self.echo_timeout_us
    }

    #[inline]
    pub fn poll_interval_us(&self) -> u32 {
        self.poll_interval_us
    }

    #[inline]
    pub fn trigger_width_us(&self) -> u32 {
        self.trigger_width_us
    }
}
