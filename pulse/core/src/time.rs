//! Time units: counter ticks, millisecond durations and tick rates

use core::fmt;

/// Absolute position of a free-running counter
///
/// The low-power counter is 64 bits wide; arithmetic wraps so that a deadline
/// computed from a previous deadline never panics near the end of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(u64);

impl Ticks {
    /// Zero tick
    pub const ZERO: Self = Self(0);

    /// Create a new tick position
    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Get the raw tick value
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Position `ticks` after this one
    #[must_use]
    pub const fn offset(self, ticks: u64) -> Self {
        Self(self.0.wrapping_add(ticks))
    }

    /// Calculate elapsed ticks since a previous position
    pub const fn elapsed_since(self, previous: Ticks) -> u64 {
        self.0.wrapping_sub(previous.0)
    }

    /// Check if this position is at or after another one (handles wraparound)
    pub const fn is_at_or_after(self, other: Ticks) -> bool {
        self.0.wrapping_sub(other.0) < u64::MAX / 2
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick:{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Ticks {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "tick:{}", self.0);
    }
}

/// Duration in milliseconds
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(u32);

impl Millis {
    /// Zero duration
    pub const ZERO: Self = Self(0);

    /// Create duration from milliseconds
    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    /// Create duration from seconds, saturating at the maximum
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Convert to milliseconds
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Check if duration is zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Duration multiplied by `n`, saturating at the maximum
    #[must_use]
    pub const fn saturating_mul(self, n: u32) -> Self {
        Self(self.0.saturating_mul(n))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Millis {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}ms", self.0);
    }
}

/// Counting frequency of a timer or compare counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRate {
    hz: u32,
}

impl TickRate {
    /// 1 MHz system counter of the low-power domain
    pub const MHZ_1: Self = Self { hz: 1_000_000 };

    /// 32.768 kHz low-frequency clock
    pub const LFCLK: Self = Self { hz: 32_768 };

    /// Create a tick rate; a zero frequency is clamped to 1 Hz
    pub const fn from_hz(hz: u32) -> Self {
        Self {
            hz: if hz == 0 { 1 } else { hz },
        }
    }

    /// Get the frequency in hertz
    pub const fn hz(self) -> u32 {
        self.hz
    }

    /// Number of ticks spanning `duration`
    pub const fn ticks_for(self, duration: Millis) -> u64 {
        duration.as_millis() as u64 * self.hz as u64 / 1000
    }

    /// Milliseconds represented by `ticks`, rounded down and saturating
    pub const fn millis_for(self, ticks: u64) -> u64 {
        ticks.saturating_mul(1000) / self.hz as u64
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::MHZ_1
    }
}

impl fmt::Display for TickRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.hz)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TickRate {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}Hz", self.hz);
    }
}

/// Macro to create compile-time durations
#[macro_export]
macro_rules! millis {
    ($value:literal ms) => {
        $crate::Millis::from_millis($value)
    };
    ($value:literal s) => {
        $crate::Millis::from_secs($value)
    };
}
