//! Events dispatched to the sequencer lifecycle

use core::fmt;

/// Origin of a trigger
///
/// Only used for logging; every source arms the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// Debounced edge on an input line
    Button,
    /// Write to the trigger characteristic; the payload is discarded
    Characteristic,
    /// Direct call from application code
    Software,
}

/// Event handled by the sequencer state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Arm a new sequence, aborting the running one first
    Trigger(TriggerSource),
    /// The engine's completion interrupt fired
    Interrupt,
    /// Drain the running sequence, if any
    Stop,
}

impl SequencerEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            SequencerEvent::Trigger(_) => "TRIGGER",
            SequencerEvent::Interrupt => "INTERRUPT",
            SequencerEvent::Stop => "STOP",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSource::Button => write!(f, "button"),
            TriggerSource::Characteristic => write!(f, "characteristic"),
            TriggerSource::Software => write!(f, "software"),
        }
    }
}

impl fmt::Display for SequencerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerEvent::Trigger(source) => write!(f, "TRIGGER({})", source),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TriggerSource {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TriggerSource::Button => defmt::write!(fmt, "Button"),
            TriggerSource::Characteristic => defmt::write!(fmt, "Characteristic"),
            TriggerSource::Software => defmt::write!(fmt, "Software"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SequencerEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name());
    }
}
