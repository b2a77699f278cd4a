//! Compare-rescheduled engine
//!
//! Used when the periodic source sits on a domain with no fabric path to the
//! output line. The compare interrupt toggles the line itself and reprograms
//! the same compare channel for the next match, following a
//! [`CompareSchedule`].

use pulse_core::{OutputLineId, PulseResult, PulseTrainConfig};
use pulse_hal::{CompareChannel, Level, OutputLine};

use crate::actuator::Actuator;
use crate::engine::{EngineStatus, PulseEngine};
use crate::schedule::{CompareSchedule, Fired, Timing};

/// Pulse engine built from one compare channel and a CPU-driven line
pub struct RescheduledEngine<C: CompareChannel, O: OutputLine> {
    channel: C,
    actuator: Actuator<O>,
    run: Option<(Timing, CompareSchedule)>,
}

impl<C: CompareChannel, O: OutputLine> RescheduledEngine<C, O> {
    /// Take ownership of an allocated compare channel and the output line.
    pub fn new(mut channel: C, line: O) -> PulseResult<Self> {
        channel.cancel();
        let actuator = Actuator::new(line)?;
        Ok(Self {
            channel,
            actuator,
            run: None,
        })
    }

    /// Schedule of the running sequence
    pub fn schedule(&self) -> Option<&CompareSchedule> {
        self.run.as_ref().map(|(_, schedule)| schedule)
    }

    /// Toggles issued by the interrupt handler since construction
    pub fn toggles(&self) -> u32 {
        self.actuator.toggles()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }
}

impl<C: CompareChannel, O: OutputLine> PulseEngine for RescheduledEngine<C, O> {
    fn line_id(&self) -> OutputLineId {
        self.actuator.line_id()
    }

    fn arm(&mut self, config: &PulseTrainConfig) -> PulseResult<()> {
        self.channel.cancel();
        self.actuator.force_low()?;

        let timing = Timing::from_config(config, self.channel.tick_rate());
        let start = self.channel.now();
        let schedule = CompareSchedule::start_train(start, &timing);
        self.channel.set(schedule.deadline())?;
        log::trace!(
            "rescheduled: train from {} first match {}",
            start,
            schedule.deadline()
        );
        self.run = Some((timing, schedule));
        Ok(())
    }

    fn on_interrupt(&mut self) -> PulseResult<EngineStatus> {
        let Some((timing, schedule)) = self.run.as_mut() else {
            return Ok(EngineStatus::Spurious);
        };
        // the match disarms the channel; anything earlier is not ours
        let due = self.channel.armed().is_none()
            && self.channel.now().is_at_or_after(schedule.deadline());
        if !due {
            log::warn!("rescheduled: interrupt before {}", schedule.deadline());
            return Ok(EngineStatus::Spurious);
        }

        match schedule.fire(timing) {
            Fired::CycleStart => {
                self.channel.set(schedule.deadline())?;
                log::trace!("rescheduled: cycle start, next {}", schedule.deadline());
                Ok(EngineStatus::Running)
            }
            Fired::Toggle => {
                self.actuator.toggle()?;
                self.channel.set(schedule.deadline())?;
                Ok(EngineStatus::Running)
            }
            Fired::TrainEnd { next_cycle } => {
                self.actuator.toggle()?;
                self.actuator.force_low()?;
                match next_cycle {
                    Some(deadline) => {
                        self.channel.set(deadline)?;
                        log::trace!("rescheduled: train done, next cycle {}", deadline);
                        Ok(EngineStatus::Running)
                    }
                    None => Ok(EngineStatus::Complete),
                }
            }
            Fired::Exhausted => Ok(EngineStatus::Spurious),
        }
    }

    fn drain(&mut self) -> PulseResult<()> {
        self.channel.cancel();
        self.run = None;
        self.actuator.force_low()
    }

    fn line_level(&mut self) -> PulseResult<Level> {
        self.actuator.level()
    }
}
