//! Scenario description and runner

use std::fmt;

use anyhow::Context;
use pulse_core::{PulseError, PulseTrainConfig, SequenceState};
use pulse_hal::Level;
use pulse_port_sim::{LineOpKind, SimBoard, SimConfig};
use pulse_seq::{ChainedEngine, PulseEngine, RescheduledEngine, Sequencer};
use serde::Deserialize;

/// Board section of a scenario file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BoardFile {
    pub irq_latency_us: Option<u64>,
    pub fabric_channels: Option<u8>,
}

/// TOML scenario file
///
/// ```toml
/// trigger_at = [0, 900]
/// until_ms = 6000
///
/// [train]
/// toggle_count = 6
/// toggle_interval = 500
/// output_line = { port = 0, pin = 1 }
///
/// [board]
/// irq_latency_us = 30
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub train: PulseTrainConfig,
    pub board: BoardFile,
    pub trigger_at: Vec<u32>,
    pub stop_at: Vec<u32>,
    pub until_ms: Option<u32>,
}

/// Fully resolved run
#[derive(Debug, Clone)]
pub struct Scenario {
    pub train: PulseTrainConfig,
    pub board: SimConfig,
    pub triggers: Vec<u32>,
    pub stops: Vec<u32>,
    pub until_ms: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Action {
    Trigger,
    Stop,
}

/// One line operation on the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub at_ms: f64,
    pub kind: OpName,
    pub level: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpName(LineOpKind);

impl fmt::Display for OpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            LineOpKind::Toggle => "toggle",
            LineOpKind::Write => "write",
            LineOpKind::Clear => "clear",
        };
        f.pad(name)
    }
}

/// Outcome of a run
#[derive(Debug)]
pub struct Report {
    pub timeline: Vec<Entry>,
    pub toggles: usize,
    pub armed: u32,
    pub completed: u32,
    pub state: SequenceState,
    pub level: Level,
    pub errors: Vec<PulseError>,
}

impl Scenario {
    pub fn run_chained(&self) -> anyhow::Result<Report> {
        let board = SimBoard::new(self.board);
        let engine = ChainedEngine::new(
            board.fabric(),
            board.periodic_source(),
            board.terminator(),
            board.output_line(),
        )
        .context("claiming fabric channels")?;
        self.run(&board, Sequencer::new(engine, self.train))
    }

    pub fn run_rescheduled(&self) -> anyhow::Result<Report> {
        let board = SimBoard::new(self.board);
        let compare = board.take_compare().context("claiming compare channel")?;
        let engine = RescheduledEngine::new(compare, board.output_line())?;
        self.run(&board, Sequencer::new(engine, self.train))
    }

    /// Last scheduled action plus two full trains, or `until_ms`.
    fn end_ms(&self) -> u32 {
        self.until_ms.unwrap_or_else(|| {
            let last = self
                .triggers
                .iter()
                .chain(self.stops.iter())
                .copied()
                .max()
                .unwrap_or(0);
            let span = self
                .train
                .train_length()
                .as_millis()
                .saturating_add(self.train.cycle_interval().as_millis());
            last.saturating_add(span.saturating_mul(2))
        })
    }

    fn run<E: PulseEngine>(&self, board: &SimBoard, mut seq: Sequencer<E>) -> anyhow::Result<Report> {
        let mut actions: Vec<(u32, Action)> = self
            .triggers
            .iter()
            .map(|&at| (at, Action::Trigger))
            .chain(self.stops.iter().map(|&at| (at, Action::Stop)))
            .collect();
        actions.sort();

        let mut errors = Vec::new();
        for (at, action) in actions {
            board.run_until(board.ms(at), |_| {
                if let Err(err) = seq.on_interrupt() {
                    errors.push(err);
                }
            });
            match action {
                Action::Trigger => seq.trigger()?,
                Action::Stop => seq.stop()?,
            }
        }
        board.run_until(board.ms(self.end_ms()), |_| {
            if let Err(err) = seq.on_interrupt() {
                errors.push(err);
            }
        });

        let hz = board.config().tick_rate.hz() as f64;
        let timeline = board
            .line_ops()
            .into_iter()
            .map(|op| Entry {
                at_ms: op.at.raw() as f64 * 1000.0 / hz,
                kind: OpName(op.kind),
                level: op.level,
            })
            .collect();

        Ok(Report {
            timeline,
            toggles: board.toggle_times().len(),
            armed: seq.sequences_armed(),
            completed: seq.sequences_completed(),
            state: seq.state(),
            level: seq.line_level()?,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{CycleAnchor, Millis, DEFAULT_OUTPUT_LINE};

    fn scenario(train: PulseTrainConfig, triggers: Vec<u32>) -> Scenario {
        Scenario {
            train,
            board: SimConfig::default(),
            triggers,
            stops: Vec::new(),
            until_ms: None,
        }
    }

    fn toggles_ms(report: &Report) -> Vec<u32> {
        report
            .timeline
            .iter()
            .filter(|e| e.kind == OpName(LineOpKind::Toggle))
            .map(|e| e.at_ms.round() as u32)
            .collect()
    }

    #[test]
    fn retrigger_scenario_on_both_engines() {
        let train = PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
            .toggle_count(6)
            .toggle_interval(Millis::from_millis(500))
            .build()
            .unwrap();
        let scenario = scenario(train, vec![0, 900]);

        for report in [
            scenario.run_chained().unwrap(),
            scenario.run_rescheduled().unwrap(),
        ] {
            assert_eq!(
                toggles_ms(&report),
                vec![500, 1400, 1900, 2400, 2900, 3400, 3900]
            );
            assert_eq!(report.armed, 2);
            assert_eq!(report.completed, 1);
            assert_eq!(report.state, SequenceState::Idle);
            assert_eq!(report.level, Level::Low);
            assert!(report.errors.is_empty());
        }
    }

    #[test]
    fn scenario_file_overrides_defaults() {
        let file: ScenarioFile = toml::from_str(
            r#"
            trigger_at = [0]
            until_ms = 5000

            [train]
            toggle_count = 6
            toggle_interval = 300
            cycle_interval = 3000
            cycle_anchor = "cycle-start"

            [board]
            irq_latency_us = 40
            "#,
        )
        .unwrap();

        assert_eq!(file.train.toggle_count(), 6);
        assert_eq!(file.train.cycle_interval(), Millis::from_millis(3000));
        assert_eq!(file.train.cycle_anchor(), CycleAnchor::CycleStart);
        assert_eq!(file.train.output_line(), DEFAULT_OUTPUT_LINE);
        assert_eq!(file.board.irq_latency_us, Some(40));
        assert!(file.train.validate().is_ok());

        let mut scenario = scenario(file.train, file.trigger_at);
        scenario.until_ms = file.until_ms;
        let report = scenario.run_rescheduled().unwrap();
        assert_eq!(report.toggles, 12);
        assert_eq!(report.state, SequenceState::Active);
    }

    #[test]
    fn unvalidated_file_config_is_rejected_at_arming() {
        let cases = [
            ("toggle_count = 0", PulseError::InvalidToggleCount),
            ("toggle_interval = 0", PulseError::InvalidToggleInterval),
        ];
        for (text, expected) in cases {
            let train: PulseTrainConfig = toml::from_str(text).unwrap();
            let board = SimBoard::new(SimConfig::default());
            let compare = board.take_compare().unwrap();
            let engine = RescheduledEngine::new(compare, board.output_line()).unwrap();
            let mut seq = Sequencer::new(engine, train);

            assert_eq!(seq.trigger(), Err(expected));
            assert_eq!(seq.state(), SequenceState::Idle);
            assert_eq!(seq.sequences_armed(), 0);

            board.run_until(board.ms(1000), |_| panic!("nothing armed"));
            assert!(board.toggle_times().is_empty());
            assert!(board.compare_history(0).is_empty());
        }
    }

    #[test]
    fn invalid_file_config_fails_the_run() {
        let train: PulseTrainConfig = toml::from_str("toggle_count = 0").unwrap();
        let scenario = scenario(train, vec![0]);
        let err = scenario.run_chained().unwrap_err();
        assert_eq!(
            err.downcast_ref::<PulseError>(),
            Some(&PulseError::InvalidToggleCount)
        );
    }

    #[test]
    fn stop_ends_the_run_early() {
        let train = PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
            .toggle_count(10)
            .toggle_interval(Millis::from_millis(100))
            .build()
            .unwrap();
        let mut scenario = scenario(train, vec![0]);
        scenario.stops = vec![350];

        let report = scenario.run_chained().unwrap();
        assert_eq!(toggles_ms(&report), vec![100, 200, 300]);
        assert_eq!(report.completed, 0);
        assert_eq!(report.level, Level::Low);
    }
}
