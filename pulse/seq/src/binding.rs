//! Fabric channel bindings
//!
//! A [`ChannelBinding`] is the software image of one fabric channel: which
//! event is published into it, which tasks listen, and whether the enable bit
//! is set. All fabric register traffic of the sequencer goes through it so
//! the create/enable/disable/clear ordering lives in one place.

use heapless::Vec;
use pulse_core::{PulseError, PulseResult};
use pulse_hal::{ChannelId, EventFabric, EventSource, TaskSink};

/// Maximum number of tasks one binding fans out to
pub const MAX_SINKS: usize = 4;

/// One allocated fabric channel and its current routing
#[derive(Debug)]
pub struct ChannelBinding {
    channel: ChannelId,
    source: Option<EventSource>,
    sinks: Vec<TaskSink, MAX_SINKS>,
    enabled: bool,
}

impl ChannelBinding {
    /// Reserve a channel; fails with `ResourceExhausted` when none is free.
    pub fn allocate<F: EventFabric>(fabric: &mut F) -> PulseResult<Self> {
        let channel = fabric.allocate()?;
        log::trace!("fabric {} allocated", channel);
        Ok(Self {
            channel,
            source: None,
            sinks: Vec::new(),
            enabled: false,
        })
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn source(&self) -> Option<EventSource> {
        self.source
    }

    pub fn sinks(&self) -> &[TaskSink] {
        &self.sinks
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Route `source` to every task in `sinks`, leaving the channel disabled.
    ///
    /// Any previous routing is cleared first, so re-arming never inherits a
    /// stale link.
    pub fn create<F: EventFabric>(
        &mut self,
        fabric: &mut F,
        source: EventSource,
        sinks: &[TaskSink],
    ) -> PulseResult<()> {
        self.clear(fabric);
        if sinks.len() > MAX_SINKS {
            return Err(PulseError::Hardware("too many sinks for one channel"));
        }

        fabric.publish(self.channel, source)?;
        self.source = Some(source);
        for &sink in sinks {
            fabric.subscribe(self.channel, sink)?;
            // capacity checked above
            let _ = self.sinks.push(sink);
        }
        log::trace!("fabric {} routes {:?} -> {:?}", self.channel, source, sinks);
        Ok(())
    }

    /// Set the enable bit of a created binding.
    pub fn enable<F: EventFabric>(&mut self, fabric: &mut F) {
        if self.source.is_none() {
            return;
        }
        fabric.enable(self.channel);
        self.enabled = true;
    }

    /// Clear the enable bit; the routing stays in place.
    pub fn disable<F: EventFabric>(&mut self, fabric: &mut F) {
        fabric.disable(self.channel);
        self.enabled = false;
    }

    /// Disable the channel, then remove every link.
    ///
    /// The enable bit goes first: an event already in flight must find a
    /// disabled channel rather than a half-unlinked one.
    pub fn clear<F: EventFabric>(&mut self, fabric: &mut F) {
        self.disable(fabric);
        for &sink in self.sinks.iter() {
            fabric.unsubscribe(self.channel, sink);
        }
        self.sinks.clear();
        if let Some(source) = self.source.take() {
            fabric.unpublish(self.channel, source);
        }
    }

    /// Clear and give the channel back to the fabric.
    pub fn release<F: EventFabric>(mut self, fabric: &mut F) {
        self.clear(fabric);
        fabric.free(self.channel);
    }
}
