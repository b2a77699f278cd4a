//! Seam between the sequencer lifecycle and the hardware realizations

use pulse_core::{OutputLineId, PulseResult, PulseTrainConfig};
use pulse_hal::Level;

/// Outcome of servicing an engine interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// The sequence keeps running
    Running,
    /// The last toggle of a single-shot train was produced
    Complete,
    /// Nothing was pending for the running sequence
    Spurious,
}

#[cfg(feature = "defmt")]
impl defmt::Format for EngineStatus {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            EngineStatus::Running => defmt::write!(fmt, "Running"),
            EngineStatus::Complete => defmt::write!(fmt, "Complete"),
            EngineStatus::Spurious => defmt::write!(fmt, "Spurious"),
        }
    }
}

/// Hardware realization of a pulse train
///
/// The sequencer guarantees `arm` is only called after `drain` (or on a
/// freshly built engine) and with a validated configuration.
pub trait PulseEngine {
    /// Line this engine drives
    fn line_id(&self) -> OutputLineId;

    /// Configure hardware for `config` and start producing toggles
    fn arm(&mut self, config: &PulseTrainConfig) -> PulseResult<()>;

    /// Service the engine's interrupt
    fn on_interrupt(&mut self) -> PulseResult<EngineStatus>;

    /// Stop and release every channel, then force the line low
    ///
    /// Must be idempotent.
    fn drain(&mut self) -> PulseResult<()>;

    /// Level the output line is currently driven to
    fn line_level(&mut self) -> PulseResult<Level>;
}
