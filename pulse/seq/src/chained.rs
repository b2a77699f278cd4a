//! Hardware-chained engine
//!
//! ```text
//!  periodic source ──SourceTick──► [tick channel] ──► ToggleOutput
//!                                                 └─► CountTick
//!  terminator ──TerminatorReached──► [stop channel] ──► StopSource
//!                                                   ├─► StopTerminator
//!                                                   └─► ClearOutput
//!  terminator ──TerminatorReached──► CPU interrupt ──► Sequencer drains
//! ```
//!
//! Toggle and count are sinks of the same event, so they can never diverge:
//! the Nth tick is the one that stops the source, and exactly N toggles
//! reach the line whatever the CPU is doing.

use pulse_core::{OutputLineId, PulseResult, PulseTrainConfig};
use pulse_hal::{
    CountingTerminator, EventFabric, EventSource, Level, OutputLine, PeriodicSource, TaskSink,
};

use crate::actuator::Actuator;
use crate::binding::ChannelBinding;
use crate::engine::{EngineStatus, PulseEngine};

const TICK_SINKS: [TaskSink; 2] = [TaskSink::ToggleOutput, TaskSink::CountTick];
const STOP_SINKS: [TaskSink; 3] = [
    TaskSink::StopSource,
    TaskSink::StopTerminator,
    TaskSink::ClearOutput,
];

/// Pulse engine built from a periodic source, a counting terminator and two
/// fabric channels
pub struct ChainedEngine<F, S, T, O>
where
    F: EventFabric,
    S: PeriodicSource,
    T: CountingTerminator,
    O: OutputLine,
{
    fabric: F,
    source: S,
    terminator: T,
    actuator: Actuator<O>,
    tick: ChannelBinding,
    stop: ChannelBinding,
    target: u32,
}

impl<F, S, T, O> ChainedEngine<F, S, T, O>
where
    F: EventFabric,
    S: PeriodicSource,
    T: CountingTerminator,
    O: OutputLine,
{
    /// Claim two fabric channels and park every peripheral.
    ///
    /// Fails with `ResourceExhausted` when the fabric cannot supply both
    /// channels; a channel already claimed is handed back.
    pub fn new(mut fabric: F, mut source: S, mut terminator: T, line: O) -> PulseResult<Self> {
        let tick = ChannelBinding::allocate(&mut fabric)?;
        let stop = match ChannelBinding::allocate(&mut fabric) {
            Ok(binding) => binding,
            Err(err) => {
                tick.release(&mut fabric);
                return Err(err);
            }
        };

        source.stop();
        terminator.stop();
        terminator.disable_interrupt();
        let actuator = Actuator::new(line)?;

        Ok(Self {
            fabric,
            source,
            terminator,
            actuator,
            tick,
            stop,
            target: 0,
        })
    }

    /// Binding carrying source ticks to the line and the terminator
    pub fn tick_binding(&self) -> &ChannelBinding {
        &self.tick
    }

    /// Binding carrying the terminator's stop fan-out
    pub fn stop_binding(&self) -> &ChannelBinding {
        &self.stop
    }

    /// Ticks the terminator has counted in the current sequence
    pub fn counted(&self) -> u32 {
        self.terminator.count()
    }

    pub fn fabric(&self) -> &F {
        &self.fabric
    }

    fn teardown(&mut self) -> PulseResult<()> {
        self.tick.disable(&mut self.fabric);
        self.stop.disable(&mut self.fabric);

        self.source.stop();
        self.terminator.stop();
        self.terminator.disable_interrupt();

        self.tick.clear(&mut self.fabric);
        self.stop.clear(&mut self.fabric);

        self.source.clear();
        self.terminator.clear();
        self.actuator.force_low()
    }
}

impl<F, S, T, O> PulseEngine for ChainedEngine<F, S, T, O>
where
    F: EventFabric,
    S: PeriodicSource,
    T: CountingTerminator,
    O: OutputLine,
{
    fn line_id(&self) -> OutputLineId {
        self.actuator.line_id()
    }

    fn arm(&mut self, config: &PulseTrainConfig) -> PulseResult<()> {
        self.teardown()?;

        self.source.configure(config.toggle_interval())?;
        self.terminator.preload(config.toggle_count())?;
        self.target = config.toggle_count();
        self.terminator.clear_interrupt();
        self.terminator.enable_interrupt();

        self.tick
            .create(&mut self.fabric, EventSource::SourceTick, &TICK_SINKS)?;
        self.stop
            .create(&mut self.fabric, EventSource::TerminatorReached, &STOP_SINKS)?;
        // stop path first so the last tick can never outrun it
        self.stop.enable(&mut self.fabric);
        self.tick.enable(&mut self.fabric);

        self.terminator.start();
        self.source.start();
        log::trace!(
            "chained: {} toggles every {} on {}",
            self.target,
            config.toggle_interval(),
            self.actuator.line_id()
        );
        Ok(())
    }

    fn on_interrupt(&mut self) -> PulseResult<EngineStatus> {
        self.terminator.clear_interrupt();
        let counted = self.terminator.count();
        if self.target > 0 && counted >= self.target {
            log::trace!("chained: terminator reached {}", counted);
            if self.source.is_running() {
                log::warn!("chained: source still running at completion");
            }
            Ok(EngineStatus::Complete)
        } else {
            log::warn!("chained: terminator interrupt at {}/{}", counted, self.target);
            Ok(EngineStatus::Spurious)
        }
    }

    fn drain(&mut self) -> PulseResult<()> {
        self.target = 0;
        self.teardown()
    }

    fn line_level(&mut self) -> PulseResult<Level> {
        self.actuator.level()
    }
}
