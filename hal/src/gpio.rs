//! Output line abstraction

use embedded_hal::digital::{PinState, StatefulOutputPin};
use pulse_core::OutputLineId;

use crate::error::{HalError, HalResult};

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    /// Low level (0V), the defined idle level of a pulse line
    #[default]
    Low,
    /// High level (VCC)
    High,
}

impl Level {
    /// The opposite level
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<PinState> for Level {
    fn from(value: PinState) -> Self {
        match value {
            PinState::Low => Level::Low,
            PinState::High => Level::High,
        }
    }
}

impl From<Level> for PinState {
    fn from(value: Level) -> Self {
        match value {
            Level::Low => PinState::Low,
            Level::High => PinState::High,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Level {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Level::Low => defmt::write!(fmt, "Low"),
            Level::High => defmt::write!(fmt, "High"),
        }
    }
}

/// A push-pull output line driven by the CPU
pub trait OutputLine {
    /// Identity of the pin behind this line
    fn line_id(&self) -> OutputLineId;

    /// Drive the line to `level`
    fn write(&mut self, level: Level) -> HalResult<()>;

    /// Level the line is currently driven to
    fn level(&mut self) -> HalResult<Level>;

    /// Flip the driven level
    fn toggle(&mut self) -> HalResult<()> {
        let next = self.level()?.flipped();
        self.write(next)
    }
}

/// [`OutputLine`] over any `embedded-hal` stateful output pin
pub struct StatefulPin<P> {
    pin: P,
    id: OutputLineId,
}

impl<P: StatefulOutputPin> StatefulPin<P> {
    /// Wrap `pin`, which must already be configured as an output.
    pub fn new(pin: P, id: OutputLineId) -> Self {
        Self { pin, id }
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: StatefulOutputPin> OutputLine for StatefulPin<P> {
    fn line_id(&self) -> OutputLineId {
        self.id
    }

    fn write(&mut self, level: Level) -> HalResult<()> {
        self.pin
            .set_state(level.into())
            .map_err(|_| HalError::HardwareError)
    }

    fn level(&mut self) -> HalResult<Level> {
        let high = self.pin.is_set_high().map_err(|_| HalError::HardwareError)?;
        Ok(if high { Level::High } else { Level::Low })
    }

    fn toggle(&mut self) -> HalResult<()> {
        self.pin.toggle().map_err(|_| HalError::HardwareError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, OutputPin};

    #[derive(Default)]
    struct FakePin {
        high: bool,
        writes: usize,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    impl StatefulOutputPin for FakePin {
        fn is_set_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.high)
        }

        fn is_set_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.high)
        }
    }

    #[test]
    fn stateful_pin_toggles_and_clears() {
        let mut line = StatefulPin::new(FakePin::default(), OutputLineId::new(0, 1));
        assert_eq!(line.level().unwrap(), Level::Low);

        line.toggle().unwrap();
        assert_eq!(line.level().unwrap(), Level::High);

        line.write(Level::Low).unwrap();
        assert_eq!(line.level().unwrap(), Level::Low);
        assert_eq!(line.release().writes, 2);
    }

    #[test]
    fn level_flips() {
        assert_eq!(Level::Low.flipped(), Level::High);
        assert_eq!(Level::from(PinState::High), Level::High);
    }
}
