//! Fabric-chained engine on the simulated board

mod common;

use common::{board, chained, every, single_shot};
use pulse_core::{PulseError, SequenceState};
use pulse_hal::{EventFabric, Level};
use pulse_port_sim::{FabricOp, LineOpKind, SimBoard, SimConfig};
use pulse_seq::ChainedEngine;

#[test]
fn produces_exactly_n_toggles() {
    for count in [1u32, 2, 5, 6, 9] {
        let board = board();
        let mut seq = chained(&board, single_shot(count, 10));

        seq.trigger().unwrap();
        assert_eq!(seq.state(), SequenceState::Active);
        for binding in [seq.engine().tick_binding(), seq.engine().stop_binding()] {
            assert!(seq.engine().fabric().is_enabled(binding.channel()));
        }
        board.run_until(board.ms(count * 10 + 200), |_| seq.on_interrupt().unwrap());

        assert_eq!(
            board.toggle_times_ms(),
            every(10, 10, count as u64),
            "count {}",
            count
        );
        assert_eq!(seq.state(), SequenceState::Idle);
        assert_eq!(seq.sequences_completed(), 1);
    }
}

#[test]
fn line_ends_low_for_odd_and_even_counts() {
    for count in [3u32, 4] {
        let board = board();
        let mut seq = chained(&board, single_shot(count, 5));
        seq.trigger().unwrap();
        board.run_until(board.ms(100), |_| seq.on_interrupt().unwrap());

        assert_eq!(board.line_level(), Level::Low);
        assert_eq!(seq.line_level().unwrap(), Level::Low);
    }
}

#[test]
fn odd_train_is_cleared_by_the_stop_path() {
    let board = board();
    let mut seq = chained(&board, single_shot(3, 10));
    seq.trigger().unwrap();
    // no interrupt handler: the fabric alone must finish the train
    board.run_until(board.ms(500), |_| {});

    assert_eq!(board.toggle_times_ms(), vec![10, 20, 30]);
    assert_eq!(board.line_level(), Level::Low);
    assert!(board
        .line_ops()
        .iter()
        .any(|op| op.kind == LineOpKind::Clear && op.at == board.ms(30)));
    assert!(!board.source_running());
    assert_eq!(seq.state(), SequenceState::Active);
}

#[test]
fn toggles_track_terminator_count() {
    let board = board();
    let mut seq = chained(&board, single_shot(8, 10));
    seq.trigger().unwrap();

    for (until_ms, expected) in [(5, 0u32), (15, 1), (45, 4), (75, 7)] {
        board.run_until(board.ms(until_ms), |_| seq.on_interrupt().unwrap());
        assert_eq!(board.toggle_times().len() as u32, expected);
        assert_eq!(seq.engine().counted(), expected);
    }
}

#[test]
fn retrigger_aborts_and_restarts() {
    let board = board();
    let mut seq = chained(&board, single_shot(6, 500));

    seq.trigger().unwrap();
    board.run_until(board.ms(900), |_| seq.on_interrupt().unwrap());
    assert_eq!(board.toggle_times_ms(), vec![500]);
    assert_eq!(board.line_level(), Level::High);

    seq.trigger().unwrap();
    assert_eq!(board.line_level(), Level::Low);
    board.run_until(board.ms(6000), |_| seq.on_interrupt().unwrap());

    let mut expected = vec![500];
    expected.extend(every(1400, 500, 6));
    assert_eq!(board.toggle_times_ms(), expected);
    assert_eq!(seq.state(), SequenceState::Idle);
    assert_eq!(seq.sequences_armed(), 2);
    assert_eq!(seq.sequences_completed(), 1);
}

#[test]
fn completion_waits_for_interrupt_latency() {
    let board = SimBoard::new(SimConfig::default().irq_latency(2_000));
    let mut seq = chained(&board, single_shot(2, 10));
    seq.trigger().unwrap();

    board.run_until(board.ms(21), |_| seq.on_interrupt().unwrap());
    assert_eq!(seq.state(), SequenceState::Active);

    board.run_until(board.ms(22), |_| seq.on_interrupt().unwrap());
    assert_eq!(seq.state(), SequenceState::Idle);
    assert_eq!(board.toggle_times_ms(), vec![10, 20]);
}

#[test]
fn teardown_disables_channels_before_unlinking() {
    let board = board();
    let mut seq = chained(&board, single_shot(6, 10));
    seq.trigger().unwrap();
    board.run_until(board.ms(25), |_| seq.on_interrupt().unwrap());

    board.clear_fabric_log();
    seq.stop().unwrap();
    let log = board.fabric_log();

    for binding in [seq.engine().tick_binding(), seq.engine().stop_binding()] {
        let channel = binding.channel();
        let disabled = log
            .iter()
            .position(|op| *op == FabricOp::Disable(channel))
            .expect("channel disabled");
        let unlinked = log
            .iter()
            .position(|op| {
                matches!(op, FabricOp::Unsubscribe(ch, _) | FabricOp::Unpublish(ch, _) if *ch == channel)
            })
            .expect("channel unlinked");
        assert!(disabled < unlinked, "{:?}", log);
    }
    for binding in [seq.engine().tick_binding(), seq.engine().stop_binding()] {
        assert!(!seq.engine().fabric().is_enabled(binding.channel()));
    }
    assert_eq!(board.enabled_channels(), 0);
    assert_eq!(board.linked_channels(), 0);
    assert!(!board.source_running());
    assert!(!board.terminator_running());
    assert_eq!(board.line_level(), Level::Low);
}

#[test]
fn stop_while_idle_touches_nothing() {
    let board = board();
    let mut seq = chained(&board, single_shot(4, 10));
    let ops = board.line_ops().len();
    board.clear_fabric_log();

    seq.stop().unwrap();
    assert_eq!(board.line_ops().len(), ops);
    assert!(board.fabric_log().is_empty());
    assert_eq!(seq.state(), SequenceState::Idle);
}

#[test]
fn severed_channel_never_completes_until_stopped() {
    let board = board();
    let mut seq = chained(&board, single_shot(4, 10));
    board.sever_channel(seq.engine().tick_binding().channel());

    seq.trigger().unwrap();
    board.run_until(board.ms(1000), |_| seq.on_interrupt().unwrap());
    assert!(board.toggle_times().is_empty());
    assert_eq!(seq.state(), SequenceState::Active);

    seq.stop().unwrap();
    assert_eq!(seq.state(), SequenceState::Idle);
    assert_eq!(board.line_level(), Level::Low);
}

#[test]
fn missing_channels_fail_initialization() {
    let board = SimBoard::new(SimConfig::default().fabric_channels(1));
    let result = ChainedEngine::new(
        board.fabric(),
        board.periodic_source(),
        board.terminator(),
        board.output_line(),
    );
    assert!(matches!(result, Err(PulseError::ResourceExhausted)));

    // the one channel that was claimed went back to the pool
    assert!(board.fabric().allocate().is_ok());
}
