//! Event fabric abstraction
//!
//! The fabric is a publish/subscribe interconnect between peripherals: a
//! channel carries the events published into it to every task subscribed to
//! it, without the CPU, but only while the channel's enable bit is set.
//! Channels are a scarce shared resource and are allocated once at start-up.

use core::fmt;

use crate::error::HalResult;

/// Index of an allocated fabric channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(pub u8);

impl ChannelId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CH{}", self.0)
    }
}

/// Peripheral events that can be published into a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// Periodic source reached its interval
    SourceTick,
    /// Counting terminator reached its preloaded count
    TerminatorReached,
}

/// Peripheral tasks that can subscribe to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSink {
    /// Flip the output line
    ToggleOutput,
    /// Drive the output line low
    ClearOutput,
    /// Increment the counting terminator
    CountTick,
    /// Stop the periodic source
    StopSource,
    /// Stop the counting terminator
    StopTerminator,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "CH{=u8}", self.0);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EventSource {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            EventSource::SourceTick => defmt::write!(fmt, "SourceTick"),
            EventSource::TerminatorReached => defmt::write!(fmt, "TerminatorReached"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskSink {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TaskSink::ToggleOutput => defmt::write!(fmt, "ToggleOutput"),
            TaskSink::ClearOutput => defmt::write!(fmt, "ClearOutput"),
            TaskSink::CountTick => defmt::write!(fmt, "CountTick"),
            TaskSink::StopSource => defmt::write!(fmt, "StopSource"),
            TaskSink::StopTerminator => defmt::write!(fmt, "StopTerminator"),
        }
    }
}

/// Publish/subscribe interconnect between peripheral events and tasks
///
/// Every method other than [`allocate`](EventFabric::allocate) is a plain
/// register write and infallible for a channel this fabric handed out.
pub trait EventFabric {
    /// Reserve a free channel
    fn allocate(&mut self) -> HalResult<ChannelId>;

    /// Return a channel to the free pool
    fn free(&mut self, channel: ChannelId);

    /// Publish `event` into `channel`
    fn publish(&mut self, channel: ChannelId, event: EventSource) -> HalResult<()>;

    /// Stop publishing `event` into `channel`
    fn unpublish(&mut self, channel: ChannelId, event: EventSource);

    /// Subscribe `task` to `channel`
    fn subscribe(&mut self, channel: ChannelId, task: TaskSink) -> HalResult<()>;

    /// Unsubscribe `task` from `channel`
    fn unsubscribe(&mut self, channel: ChannelId, task: TaskSink);

    /// Set the channel enable bit
    fn enable(&mut self, channel: ChannelId);

    /// Clear the channel enable bit
    fn disable(&mut self, channel: ChannelId);

    /// Current state of the channel enable bit
    fn is_enabled(&self, channel: ChannelId) -> bool;
}
