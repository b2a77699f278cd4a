//! Lifecycle tests against a scripted engine

mod shared;

use heapless::{Deque, Vec};
use pulse_core::{
    Millis, OutputLineId, PulseError, PulseResult, PulseTrainConfig, DEFAULT_OUTPUT_LINE,
};
use pulse_hal::Level;

use crate::engine::{EngineStatus, PulseEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Arm(u32),
    Interrupt,
    Drain,
}

/// Engine that records calls and replays scripted interrupt outcomes.
struct ScriptedEngine {
    line: OutputLineId,
    level: Level,
    calls: Vec<Call, 32>,
    script: Deque<PulseResult<EngineStatus>, 8>,
    fail_arm: Option<PulseError>,
}

impl ScriptedEngine {
    fn new() -> Self {
        Self {
            line: DEFAULT_OUTPUT_LINE,
            level: Level::Low,
            calls: Vec::new(),
            script: Deque::new(),
            fail_arm: None,
        }
    }

    fn then(mut self, outcome: PulseResult<EngineStatus>) -> Self {
        self.script.push_back(outcome).unwrap();
        self
    }
}

impl PulseEngine for ScriptedEngine {
    fn line_id(&self) -> OutputLineId {
        self.line
    }

    fn arm(&mut self, config: &PulseTrainConfig) -> PulseResult<()> {
        self.calls.push(Call::Arm(config.toggle_count())).unwrap();
        if let Some(err) = self.fail_arm {
            return Err(err);
        }
        self.level = Level::Low;
        Ok(())
    }

    fn on_interrupt(&mut self) -> PulseResult<EngineStatus> {
        self.calls.push(Call::Interrupt).unwrap();
        self.level = self.level.flipped();
        self.script.pop_front().unwrap_or(Ok(EngineStatus::Spurious))
    }

    fn drain(&mut self) -> PulseResult<()> {
        self.calls.push(Call::Drain).unwrap();
        self.level = Level::Low;
        Ok(())
    }

    fn line_level(&mut self) -> PulseResult<Level> {
        Ok(self.level)
    }
}

fn config(count: u32) -> PulseTrainConfig {
    PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
        .toggle_count(count)
        .toggle_interval(Millis::from_millis(10))
        .build()
        .unwrap()
}
