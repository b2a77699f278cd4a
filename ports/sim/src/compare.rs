//! Simulated compare channel

use pulse_core::{TickRate, Ticks};
use pulse_hal::{CompareChannel, HalResult};

use crate::board::{Interrupt, SimBoard};

/// One compare register of the board counter
pub struct SimCompare {
    board: SimBoard,
    index: usize,
}

impl SimCompare {
    pub(crate) fn new(board: SimBoard, index: usize) -> Self {
        Self { board, index }
    }

    /// Interrupt raised when this channel matches
    pub fn interrupt(&self) -> Interrupt {
        Interrupt::Compare(self.index as u8)
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl CompareChannel for SimCompare {
    fn now(&self) -> Ticks {
        self.board.now()
    }

    fn tick_rate(&self) -> TickRate {
        self.board.config().tick_rate
    }

    fn set(&mut self, deadline: Ticks) -> HalResult<()> {
        let mut state = self.board.lock();
        let slot = &mut state.compares[self.index];
        slot.deadline = Some(deadline);
        slot.history.push(deadline);
        Ok(())
    }

    fn cancel(&mut self) {
        let mut state = self.board.lock();
        state.compares[self.index].deadline = None;
        state.purge(Interrupt::Compare(self.index as u8));
    }

    fn armed(&self) -> Option<Ticks> {
        self.board.lock().compares[self.index].deadline
    }
}
