//! Pulse-train configuration
//!
//! A [`PulseTrainConfig`] names the output line and the three timing
//! parameters of a train. The sequencer owns one and only reads it while
//! arming, so changes made mid-run take effect on the next trigger.

use core::fmt;

use crate::time::Millis;
use crate::{PulseError, PulseResult};

/// Toggles per train used by the reference firmware
pub const DEFAULT_TOGGLE_COUNT: u32 = 6;
/// Spacing between toggles used by the reference firmware
pub const DEFAULT_TOGGLE_INTERVAL: Millis = Millis::from_millis(300);
/// Repeat period used by the reference firmware
pub const DEFAULT_CYCLE_INTERVAL: Millis = Millis::from_millis(3000);
/// Output line used by the reference firmware (P0.01, low-power domain)
pub const DEFAULT_OUTPUT_LINE: OutputLineId = OutputLineId::new(0, 1);

/// Identity of a digital output line as `(port, pin)`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputLineId {
    pub port: u8,
    pub pin: u8,
}

impl OutputLineId {
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Flat pin number, 32 pins per port
    pub const fn pin_number(self) -> u32 {
        self.port as u32 * 32 + self.pin as u32
    }
}

impl fmt::Display for OutputLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}.{:02}", self.port, self.pin)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OutputLineId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "P{}.{=u8}", self.port, self.pin);
    }
}

/// Reference point the next cycle's deadline is measured from
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleAnchor {
    /// Next cycle starts `cycle_interval` after the last toggle deadline
    #[default]
    TrainEnd,
    /// Next cycle starts `cycle_interval` after the current cycle started
    CycleStart,
}

#[cfg(feature = "defmt")]
impl defmt::Format for CycleAnchor {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            CycleAnchor::TrainEnd => defmt::write!(fmt, "TrainEnd"),
            CycleAnchor::CycleStart => defmt::write!(fmt, "CycleStart"),
        }
    }
}

/// Parameters of one pulse train
///
/// `cycle_interval == 0` selects a single-shot train; any other value repeats
/// the train every cycle until the sequence is stopped or re-triggered. The
/// repeat is only honoured by the compare-channel engine.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTrainConfig {
    output_line: OutputLineId,
    toggle_count: u32,
    toggle_interval: Millis,
    cycle_interval: Millis,
    cycle_anchor: CycleAnchor,
}

impl Default for PulseTrainConfig {
    fn default() -> Self {
        Self {
            output_line: DEFAULT_OUTPUT_LINE,
            toggle_count: DEFAULT_TOGGLE_COUNT,
            toggle_interval: DEFAULT_TOGGLE_INTERVAL,
            cycle_interval: Millis::ZERO,
            cycle_anchor: CycleAnchor::TrainEnd,
        }
    }
}

impl PulseTrainConfig {
    /// Creates a configuration builder for `output_line`.
    pub fn builder(output_line: OutputLineId) -> PulseTrainConfigBuilder {
        PulseTrainConfigBuilder::new(output_line)
    }

    pub fn output_line(&self) -> OutputLineId {
        self.output_line
    }

    pub fn toggle_count(&self) -> u32 {
        self.toggle_count
    }

    pub fn toggle_interval(&self) -> Millis {
        self.toggle_interval
    }

    pub fn cycle_interval(&self) -> Millis {
        self.cycle_interval
    }

    pub fn cycle_anchor(&self) -> CycleAnchor {
        self.cycle_anchor
    }

    /// Whether a finished train re-arms the next cycle.
    pub fn is_cyclic(&self) -> bool {
        !self.cycle_interval.is_zero()
    }

    /// Time from the trigger to the last toggle of a train.
    pub fn train_length(&self) -> Millis {
        self.toggle_interval.saturating_mul(self.toggle_count)
    }

    /// Checks the invariants the sequencer relies on while arming.
    pub fn validate(&self) -> PulseResult<()> {
        if self.toggle_count == 0 {
            return Err(PulseError::InvalidToggleCount);
        }
        if self.toggle_interval.is_zero() {
            return Err(PulseError::InvalidToggleInterval);
        }
        if self.is_cyclic()
            && self.cycle_anchor == CycleAnchor::CycleStart
            && self.cycle_interval <= self.train_length()
        {
            return Err(PulseError::InvalidCycleInterval);
        }
        Ok(())
    }
}

/// Builder for ergonomic configuration construction.
#[derive(Debug, Clone)]
pub struct PulseTrainConfigBuilder {
    config: PulseTrainConfig,
}

impl PulseTrainConfigBuilder {
    fn new(output_line: OutputLineId) -> Self {
        Self {
            config: PulseTrainConfig {
                output_line,
                ..PulseTrainConfig::default()
            },
        }
    }

    /// Sets the number of toggles per train.
    pub fn toggle_count(mut self, count: u32) -> Self {
        self.config.toggle_count = count;
        self
    }

    /// Sets the spacing between toggles.
    pub fn toggle_interval(mut self, interval: Millis) -> Self {
        self.config.toggle_interval = interval;
        self
    }

    /// Sets the repeat period; zero makes the train single-shot.
    pub fn cycle_interval(mut self, interval: Millis) -> Self {
        self.config.cycle_interval = interval;
        self
    }

    /// Sets what the repeat period is measured from.
    pub fn cycle_anchor(mut self, anchor: CycleAnchor) -> Self {
        self.config.cycle_anchor = anchor;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> PulseResult<PulseTrainConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
