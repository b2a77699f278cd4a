//! Simulated event fabric

use pulse_hal::{ChannelId, EventFabric, EventSource, HalResult, TaskSink};

use crate::board::{FabricOp, SimBoard, SimError};

/// [`EventFabric`] over the channels of a [`SimBoard`]
pub struct SimFabric {
    board: SimBoard,
}

impl SimFabric {
    pub(crate) fn new(board: SimBoard) -> Self {
        Self { board }
    }

    fn update<F>(&mut self, op: FabricOp, f: F) -> HalResult<()>
    where
        F: FnOnce(&mut crate::board::ChannelState),
    {
        let mut state = self.board.lock();
        state.fabric_log.push(op);
        let channel = state.channel_mut(op.channel())?;
        f(channel);
        Ok(())
    }
}

impl EventFabric for SimFabric {
    fn allocate(&mut self) -> HalResult<ChannelId> {
        let mut state = self.board.lock();
        let index = state
            .channels
            .iter()
            .position(|ch| !ch.allocated)
            .ok_or(SimError::NoFreeChannel)?;
        state.channels[index] = Default::default();
        state.channels[index].allocated = true;
        let channel = ChannelId::new(index as u8);
        state.fabric_log.push(FabricOp::Allocate(channel));
        log::debug!("sim fabric: allocated {}", channel);
        Ok(channel)
    }

    fn free(&mut self, channel: ChannelId) {
        let _ = self.update(FabricOp::Free(channel), |ch| *ch = Default::default());
    }

    fn publish(&mut self, channel: ChannelId, event: EventSource) -> HalResult<()> {
        self.update(FabricOp::Publish(channel, event), |ch| {
            if !ch.events.contains(&event) {
                ch.events.push(event);
            }
        })
    }

    fn unpublish(&mut self, channel: ChannelId, event: EventSource) {
        let _ = self.update(FabricOp::Unpublish(channel, event), |ch| {
            ch.events.retain(|e| *e != event)
        });
    }

    fn subscribe(&mut self, channel: ChannelId, task: TaskSink) -> HalResult<()> {
        self.update(FabricOp::Subscribe(channel, task), |ch| {
            if !ch.tasks.contains(&task) {
                ch.tasks.push(task);
            }
        })
    }

    fn unsubscribe(&mut self, channel: ChannelId, task: TaskSink) {
        let _ = self.update(FabricOp::Unsubscribe(channel, task), |ch| {
            ch.tasks.retain(|t| *t != task)
        });
    }

    fn enable(&mut self, channel: ChannelId) {
        let _ = self.update(FabricOp::Enable(channel), |ch| ch.enabled = true);
    }

    fn disable(&mut self, channel: ChannelId) {
        let _ = self.update(FabricOp::Disable(channel), |ch| ch.enabled = false);
    }

    fn is_enabled(&self, channel: ChannelId) -> bool {
        self.board
            .lock()
            .channels
            .get(channel.raw() as usize)
            .map_or(false, |ch| ch.allocated && ch.enabled)
    }
}
