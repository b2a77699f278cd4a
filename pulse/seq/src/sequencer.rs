//! Sequencer lifecycle
//!
//! The one state machine that owns the output line and the engine's
//! channels. Triggers and engine interrupts both arrive here as
//! [`SequencerEvent`]s and run to completion; a trigger during a running
//! sequence drains it synchronously before arming again.

use pulse_core::{
    PulseError, PulseResult, PulseTrainConfig, SequenceState, SequencerEvent, TriggerSource,
};
use pulse_hal::Level;

use crate::engine::{EngineStatus, PulseEngine};

/// Pulse-train lifecycle over one engine
pub struct Sequencer<E: PulseEngine> {
    engine: E,
    config: PulseTrainConfig,
    state: SequenceState,
    armed: u32,
    completed: u32,
}

impl<E: PulseEngine> Sequencer<E> {
    /// Create an idle sequencer. The engine has already parked the line low.
    pub fn new(engine: E, config: PulseTrainConfig) -> Self {
        log::debug!("sequencer on {} idle", engine.line_id());
        Self {
            engine,
            config,
            state: SequenceState::Idle,
            armed: 0,
            completed: 0,
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn config(&self) -> &PulseTrainConfig {
        &self.config
    }

    /// Replace the configuration used by the next arming.
    ///
    /// A running sequence keeps the parameters it was armed with.
    pub fn set_config(&mut self, config: PulseTrainConfig) -> PulseResult<()> {
        config.validate()?;
        if self.state.is_running() {
            log::debug!("new configuration applies from the next trigger");
        }
        self.config = config;
        Ok(())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Sequences armed since construction
    pub fn sequences_armed(&self) -> u32 {
        self.armed
    }

    /// Single-shot sequences that ran to their last toggle
    pub fn sequences_completed(&self) -> u32 {
        self.completed
    }

    pub fn line_level(&mut self) -> PulseResult<Level> {
        self.engine.line_level()
    }

    /// Arm a sequence, aborting the running one first.
    pub fn trigger(&mut self) -> PulseResult<()> {
        self.dispatch(SequencerEvent::Trigger(TriggerSource::Software))
    }

    /// Entry point for the engine's interrupt handler.
    pub fn on_interrupt(&mut self) -> PulseResult<()> {
        self.dispatch(SequencerEvent::Interrupt)
    }

    /// Drain the running sequence; a no-op when idle.
    pub fn stop(&mut self) -> PulseResult<()> {
        self.dispatch(SequencerEvent::Stop)
    }

    /// Run one event to completion.
    pub fn dispatch(&mut self, event: SequencerEvent) -> PulseResult<()> {
        log::trace!("{} in {}", event, self.state);
        match (self.state, event) {
            (state, SequencerEvent::Trigger(source)) => {
                if state.is_running() {
                    log::debug!("{} trigger aborts running sequence", source);
                    self.drain()?;
                }
                self.arm(source)
            }
            (SequenceState::Active, SequencerEvent::Interrupt) => {
                match self.engine.on_interrupt() {
                    Ok(EngineStatus::Complete) => {
                        self.completed = self.completed.wrapping_add(1);
                        log::debug!("train complete");
                        self.drain()
                    }
                    Ok(EngineStatus::Running) => Ok(()),
                    Ok(EngineStatus::Spurious) => {
                        log::warn!("spurious engine interrupt");
                        Ok(())
                    }
                    Err(err) => {
                        log::warn!("engine interrupt failed: {}", err);
                        // best effort, the interrupt error is the one reported
                        let _ = self.drain();
                        Err(err)
                    }
                }
            }
            (state, SequencerEvent::Interrupt) => {
                log::warn!("stale interrupt in {}", state);
                Ok(())
            }
            (SequenceState::Idle, SequencerEvent::Stop) => Ok(()),
            (_, SequencerEvent::Stop) => self.drain(),
        }
    }

    fn arm(&mut self, source: TriggerSource) -> PulseResult<()> {
        self.state = SequenceState::Arming;

        let checked = self.config.validate().and_then(|()| {
            if self.config.output_line() == self.engine.line_id() {
                Ok(())
            } else {
                Err(PulseError::UnknownOutputLine)
            }
        });
        if let Err(err) = checked {
            log::warn!("arming rejected: {}", err);
            self.state = SequenceState::Idle;
            return Err(err);
        }

        if let Err(err) = self.engine.arm(&self.config) {
            log::warn!("arming failed: {}", err);
            // best effort, the arming error is the one reported
            let _ = self.engine.drain();
            self.state = SequenceState::Idle;
            return Err(err);
        }

        self.armed = self.armed.wrapping_add(1);
        self.state = SequenceState::Active;
        log::debug!(
            "armed by {}: {} toggles every {} on {}",
            source,
            self.config.toggle_count(),
            self.config.toggle_interval(),
            self.config.output_line()
        );
        Ok(())
    }

    fn drain(&mut self) -> PulseResult<()> {
        self.state = SequenceState::Draining;
        let result = self.engine.drain();
        self.state = SequenceState::Idle;
        log::debug!("drained");
        result
    }
}
