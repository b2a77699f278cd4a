//! Hardware abstraction for the pulse-train sequencer
//!
//! Vendor-agnostic traits for the handful of peripherals a pulse train
//! touches: one output line, the event fabric that wires peripheral events to
//! peripheral tasks, a periodic source, a counting terminator and a
//! deadline-compare channel. Board crates implement them over real registers;
//! `pulse-port-sim` implements them over a virtual clock.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod compare;
pub mod error;
pub mod fabric;
pub mod gpio;
pub mod timer;

// Re-export commonly used types
pub use compare::CompareChannel;
pub use error::{HalError, HalResult};
pub use fabric::{ChannelId, EventFabric, EventSource, TaskSink};
pub use gpio::{Level, OutputLine, StatefulPin};
pub use timer::{CountingTerminator, PeriodicSource};
