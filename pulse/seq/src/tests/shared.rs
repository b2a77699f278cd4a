use pulse_core::{PulseError, SequenceState, TriggerSource};

use super::{config, Call, ScriptedEngine};
use crate::engine::EngineStatus;
use crate::sequencer::Sequencer;
use crate::shared::SharedSequencer;
use crate::trigger::{on_button_edge, on_characteristic_write};

#[test]
fn empty_slot_reports_not_installed() {
    let shared: SharedSequencer<ScriptedEngine> = SharedSequencer::new();
    assert_eq!(shared.trigger(TriggerSource::Button), Err(PulseError::NotInstalled));
    assert_eq!(shared.state(), SequenceState::Idle);
}

#[test]
fn both_trigger_sources_serialize_through_one_lifecycle() {
    let shared = SharedSequencer::new();
    let engine = ScriptedEngine::new().then(Ok(EngineStatus::Complete));
    assert!(shared.install(Sequencer::new(engine, config(2))).is_none());

    on_button_edge(&shared).unwrap();
    assert_eq!(on_characteristic_write(&shared, b"\x01\x02\x03"), 3);
    assert_eq!(shared.state(), SequenceState::Active);

    shared.on_interrupt().unwrap();
    assert_eq!(shared.state(), SequenceState::Idle);

    let seq = shared.take().unwrap();
    assert_eq!(
        seq.engine().calls.as_slice(),
        &[Call::Arm(2), Call::Drain, Call::Arm(2), Call::Interrupt, Call::Drain]
    );
}

#[test]
fn characteristic_write_accepts_payload_when_uninstalled() {
    let shared: SharedSequencer<ScriptedEngine> = SharedSequencer::new();
    assert_eq!(on_characteristic_write(&shared, &[0u8; 20]), 20);
}
