//! Output toggle actuator

use pulse_core::{OutputLineId, PulseResult};
use pulse_hal::{Level, OutputLine};

/// Sole owner of the pulse output line
///
/// The line is driven low as soon as the actuator is built, so a sequencer
/// always starts from the defined idle level.
pub struct Actuator<O: OutputLine> {
    line: O,
    toggles: u32,
}

impl<O: OutputLine> Actuator<O> {
    pub fn new(mut line: O) -> PulseResult<Self> {
        line.write(Level::Low)?;
        Ok(Self { line, toggles: 0 })
    }

    pub fn line_id(&self) -> OutputLineId {
        self.line.line_id()
    }

    /// Flip the line from the CPU.
    pub fn toggle(&mut self) -> PulseResult<()> {
        self.line.toggle()?;
        self.toggles = self.toggles.wrapping_add(1);
        Ok(())
    }

    /// Drive the line low regardless of how many toggles preceded.
    pub fn force_low(&mut self) -> PulseResult<()> {
        self.line.write(Level::Low)?;
        Ok(())
    }

    pub fn level(&mut self) -> PulseResult<Level> {
        Ok(self.line.level()?)
    }

    /// CPU toggles issued since construction
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    pub fn release(self) -> O {
        self.line
    }
}
