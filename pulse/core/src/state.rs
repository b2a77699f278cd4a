//! Sequencer lifecycle state

use core::fmt;

/// Lifecycle of the one sequence a sequencer can run
///
/// `Arming` and `Draining` are transient: they are only observable from
/// inside the sequencer while it configures or tears down hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceState {
    /// No sequence; every binding and compare channel is released
    #[default]
    Idle,
    /// Hardware is being configured for a new sequence
    Arming,
    /// Toggles are being produced by hardware or interrupts
    Active,
    /// Hardware is being torn down and the line forced low
    Draining,
}

impl SequenceState {
    pub const fn is_idle(self) -> bool {
        matches!(self, SequenceState::Idle)
    }

    pub const fn is_active(self) -> bool {
        matches!(self, SequenceState::Active)
    }

    /// Whether a sequence currently holds the hardware.
    pub const fn is_running(self) -> bool {
        !self.is_idle()
    }

    pub const fn name(self) -> &'static str {
        match self {
            SequenceState::Idle => "idle",
            SequenceState::Arming => "arming",
            SequenceState::Active => "active",
            SequenceState::Draining => "draining",
        }
    }
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SequenceState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name());
    }
}
