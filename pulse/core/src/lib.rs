#![no_std]
#![forbid(unsafe_code)]

//! # Pulse Core
//!
//! Core types shared by every layer of the pulse-train sequencer: tick and
//! millisecond time units, the [`PulseTrainConfig`] the sequencer arms from,
//! the [`SequenceState`] lifecycle enum and the events that drive it.
//!
//! The crate is `no_std` and allocation free so it can be linked into the
//! interrupt handlers of a low-power target unchanged.

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

pub mod config;
pub mod events;
pub mod state;
pub mod time;

pub use config::*;
pub use events::*;
pub use state::*;
pub use time::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the sequencer
pub type PulseResult<T> = Result<T, PulseError>;

/// Error types for sequencer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseError {
    /// `toggle_count` was zero
    InvalidToggleCount,
    /// `toggle_interval` was zero
    InvalidToggleInterval,
    /// `cycle_interval` cannot contain the train it is anchored to
    InvalidCycleInterval,
    /// Configuration names a line the engine does not own
    UnknownOutputLine,
    /// No free fabric channel or compare channel at initialization
    ResourceExhausted,
    /// A peripheral reported a failure
    Hardware(&'static str),
    /// The shared sequencer slot has not been populated
    NotInstalled,
}

impl fmt::Display for PulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PulseError::InvalidToggleCount => write!(f, "toggle count must be at least 1"),
            PulseError::InvalidToggleInterval => write!(f, "toggle interval must be non-zero"),
            PulseError::InvalidCycleInterval => {
                write!(f, "cycle interval is shorter than the toggle train")
            }
            PulseError::UnknownOutputLine => write!(f, "output line not owned by this sequencer"),
            PulseError::ResourceExhausted => write!(f, "no free channel available"),
            PulseError::Hardware(what) => write!(f, "hardware error: {}", what),
            PulseError::NotInstalled => write!(f, "sequencer not installed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PulseError {}

#[cfg(feature = "defmt")]
impl defmt::Format for PulseError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PulseError::InvalidToggleCount => defmt::write!(fmt, "InvalidToggleCount"),
            PulseError::InvalidToggleInterval => defmt::write!(fmt, "InvalidToggleInterval"),
            PulseError::InvalidCycleInterval => defmt::write!(fmt, "InvalidCycleInterval"),
            PulseError::UnknownOutputLine => defmt::write!(fmt, "UnknownOutputLine"),
            PulseError::ResourceExhausted => defmt::write!(fmt, "ResourceExhausted"),
            PulseError::Hardware(what) => defmt::write!(fmt, "Hardware({=str})", what),
            PulseError::NotInstalled => defmt::write!(fmt, "NotInstalled"),
        }
    }
}
