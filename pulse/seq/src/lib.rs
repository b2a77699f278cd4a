#![no_std]
#![forbid(unsafe_code)]

//! # Pulse Sequencer
//!
//! Produces exactly N toggles of one output line at a fixed interval after an
//! external trigger, then returns the line and every peripheral it used to
//! an idle, low-power state.
//!
//! Two engines realize the train:
//! - [`ChainedEngine`] wires a periodic source to the output and to a
//!   counting terminator through the event fabric. The CPU only arms and
//!   cleans up.
//! - [`RescheduledEngine`] reprograms one compare channel from its own
//!   interrupt, for sources that have no fabric path to the output line.
//!
//! Both are driven by the same [`Sequencer`] lifecycle
//! (`Idle → Arming → Active → Draining → Idle`). Interrupt handlers reach the
//! one sequencer through a [`SharedSequencer`].

pub mod actuator;
pub mod binding;
pub mod chained;
pub mod engine;
pub mod rescheduled;
pub mod schedule;
pub mod sequencer;
pub mod shared;
pub mod trigger;

pub use actuator::Actuator;
pub use binding::ChannelBinding;
pub use chained::ChainedEngine;
pub use engine::{EngineStatus, PulseEngine};
pub use rescheduled::RescheduledEngine;
pub use schedule::{CompareSchedule, Fired, Role, Timing};
pub use sequencer::Sequencer;
pub use shared::SharedSequencer;

pub use pulse_core::{
    Millis, OutputLineId, PulseError, PulseResult, PulseTrainConfig, SequenceState, Ticks,
    TriggerSource,
};

#[cfg(test)]
mod tests;
