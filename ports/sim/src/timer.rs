//! Simulated periodic source and counting terminator

use pulse_core::Millis;
use pulse_hal::{CountingTerminator, HalError, HalResult, PeriodicSource};

use crate::board::{Interrupt, SimBoard, SimError};

/// [`PeriodicSource`] publishing `SourceTick` on the board timeline
pub struct SimSource {
    board: SimBoard,
}

impl SimSource {
    pub(crate) fn new(board: SimBoard) -> Self {
        Self { board }
    }
}

impl PeriodicSource for SimSource {
    fn configure(&mut self, interval: Millis) -> HalResult<()> {
        let mut state = self.board.lock();
        if state.source.running {
            return Err(SimError::Busy.into());
        }
        let ticks = state.cfg.tick_rate.ticks_for(interval);
        if ticks == 0 {
            return Err(HalError::InvalidParameter);
        }
        state.source.interval = ticks;
        Ok(())
    }

    fn start(&mut self) {
        let mut state = self.board.lock();
        if state.source.running || state.source.interval == 0 {
            return;
        }
        state.source.running = true;
        state.source.next = Some(state.now.offset(state.source.interval));
    }

    fn stop(&mut self) {
        let mut state = self.board.lock();
        state.source.running = false;
        state.source.next = None;
    }

    fn clear(&mut self) {
        let mut state = self.board.lock();
        if state.source.running {
            state.source.next = Some(state.now.offset(state.source.interval));
        }
    }

    fn is_running(&self) -> bool {
        self.board.source_running()
    }
}

/// [`CountingTerminator`] fed by `CountTick` tasks from the fabric
pub struct SimTerminator {
    board: SimBoard,
}

impl SimTerminator {
    pub(crate) fn new(board: SimBoard) -> Self {
        Self { board }
    }
}

impl CountingTerminator for SimTerminator {
    fn preload(&mut self, count: u32) -> HalResult<()> {
        if count == 0 {
            return Err(HalError::InvalidParameter);
        }
        let mut state = self.board.lock();
        state.terminator.target = count;
        state.terminator.reached = false;
        Ok(())
    }

    fn start(&mut self) {
        self.board.lock().terminator.running = true;
    }

    fn stop(&mut self) {
        self.board.lock().terminator.running = false;
    }

    fn clear(&mut self) {
        let mut state = self.board.lock();
        state.terminator.count = 0;
        state.terminator.reached = false;
    }

    fn count(&self) -> u32 {
        self.board.lock().terminator.count
    }

    fn enable_interrupt(&mut self) {
        self.board.lock().terminator.irq_enabled = true;
    }

    fn disable_interrupt(&mut self) {
        let mut state = self.board.lock();
        state.terminator.irq_enabled = false;
        state.purge(Interrupt::Terminator);
    }

    fn clear_interrupt(&mut self) {
        self.board.lock().terminator.reached = false;
    }
}
