//! Configuration tests for pulse-core

use pulse_core::{
    Millis, OutputLineId, PulseError, PulseTrainConfig, SequenceState, DEFAULT_OUTPUT_LINE,
};

#[test]
fn test_builder_rejects_zero_count() {
    let result = PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
        .toggle_count(0)
        .build();
    assert_eq!(result, Err(PulseError::InvalidToggleCount));
}

#[test]
fn test_builder_rejects_zero_interval() {
    let result = PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
        .toggle_interval(Millis::ZERO)
        .build();
    assert_eq!(result, Err(PulseError::InvalidToggleInterval));
}

#[test]
fn test_builder_keeps_line() {
    let line = OutputLineId::new(1, 4);
    let cfg = PulseTrainConfig::builder(line)
        .toggle_count(3)
        .toggle_interval(Millis::from_millis(10))
        .build()
        .unwrap();
    assert_eq!(cfg.output_line(), line);
    assert_eq!(cfg.output_line().pin_number(), 36);
    assert_eq!(cfg.train_length(), Millis::from_millis(30));
}

#[test]
fn test_single_toggle_is_valid() {
    let cfg = PulseTrainConfig::builder(DEFAULT_OUTPUT_LINE)
        .toggle_count(1)
        .toggle_interval(Millis::from_millis(1))
        .build();
    assert!(cfg.is_ok());
}

#[test]
fn test_state_predicates() {
    assert!(SequenceState::default().is_idle());
    assert!(SequenceState::Active.is_running());
    assert!(SequenceState::Draining.is_running());
    assert!(!SequenceState::Arming.is_active());
}
