//! Deadline-compare channel abstraction

use pulse_core::{TickRate, Ticks};

use crate::error::HalResult;

/// One compare register of a free-running counter
///
/// When the counter reaches the programmed deadline the channel raises its
/// interrupt once and disarms. A deadline already in the past fires as soon
/// as possible.
pub trait CompareChannel {
    /// Current counter value
    fn now(&self) -> Ticks;

    /// Counting frequency
    fn tick_rate(&self) -> TickRate;

    /// Program `deadline` and arm the channel, replacing any pending deadline
    fn set(&mut self, deadline: Ticks) -> HalResult<()>;

    /// Disarm the channel and drop a pending interrupt
    fn cancel(&mut self);

    /// Deadline currently armed, if any
    fn armed(&self) -> Option<Ticks>;
}
