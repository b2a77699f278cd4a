#![allow(dead_code)]

use pulse_core::{CycleAnchor, Millis, PulseTrainConfig, DEFAULT_OUTPUT_LINE};
use pulse_port_sim::{SimBoard, SimCompare, SimConfig, SimFabric, SimLine, SimSource, SimTerminator};
use pulse_seq::{ChainedEngine, RescheduledEngine, Sequencer};

pub type Chained = ChainedEngine<SimFabric, SimSource, SimTerminator, SimLine>;
pub type Rescheduled = RescheduledEngine<SimCompare, SimLine>;

pub fn single_shot(count: u32, toggle_ms: u32) -> PulseTrainConfig {
    PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
        .toggle_count(count)
        .toggle_interval(Millis::from_millis(toggle_ms))
        .build()
        .unwrap()
}

pub fn cyclic(count: u32, toggle_ms: u32, cycle_ms: u32, anchor: CycleAnchor) -> PulseTrainConfig {
    PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
        .toggle_count(count)
        .toggle_interval(Millis::from_millis(toggle_ms))
        .cycle_interval(Millis::from_millis(cycle_ms))
        .cycle_anchor(anchor)
        .build()
        .unwrap()
}

pub fn chained(board: &SimBoard, config: PulseTrainConfig) -> Sequencer<Chained> {
    let engine = ChainedEngine::new(
        board.fabric(),
        board.periodic_source(),
        board.terminator(),
        board.output_line(),
    )
    .unwrap_or_else(|err| panic!("chained engine: {}", err));
    Sequencer::new(engine, config)
}

pub fn rescheduled(board: &SimBoard, config: PulseTrainConfig) -> Sequencer<Rescheduled> {
    let compare = board.take_compare().unwrap();
    let engine = RescheduledEngine::new(compare, board.output_line())
        .unwrap_or_else(|err| panic!("rescheduled engine: {}", err));
    Sequencer::new(engine, config)
}

pub fn board() -> SimBoard {
    SimBoard::new(SimConfig::default())
}

/// Millisecond timestamps `first, first + step, ...` with `count` entries
pub fn every(first: u64, step: u64, count: u64) -> Vec<u64> {
    (0..count).map(|k| first + k * step).collect()
}
