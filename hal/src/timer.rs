//! Periodic source and counting terminator abstractions
//!
//! Both peripherals live on the same clock domain as the fabric, so their
//! tasks can also be started and stopped by fabric channels without the CPU.

use pulse_core::Millis;

use crate::error::HalResult;

/// Timer that publishes `SourceTick` every configured interval
pub trait PeriodicSource {
    /// Set the interval between ticks; only valid while stopped
    fn configure(&mut self, interval: Millis) -> HalResult<()>;

    /// Start counting; the first tick is one interval after this call
    fn start(&mut self);

    /// Stop counting
    fn stop(&mut self);

    /// Reset the internal counter to zero
    fn clear(&mut self);

    /// Whether the source is currently running
    fn is_running(&self) -> bool;
}

/// Counter that publishes `TerminatorReached` after a preloaded count
pub trait CountingTerminator {
    /// Number of `CountTick` tasks after which `TerminatorReached` fires
    fn preload(&mut self, count: u32) -> HalResult<()>;

    /// Start accepting `CountTick` tasks
    fn start(&mut self);

    /// Stop accepting `CountTick` tasks
    fn stop(&mut self);

    /// Reset the count to zero
    fn clear(&mut self);

    /// Ticks counted since the last clear
    fn count(&self) -> u32;

    /// Route `TerminatorReached` to the CPU interrupt
    fn enable_interrupt(&mut self);

    /// Stop routing `TerminatorReached` to the CPU; also drops a pending one
    fn disable_interrupt(&mut self);

    /// Acknowledge a delivered `TerminatorReached` interrupt
    fn clear_interrupt(&mut self);
}
