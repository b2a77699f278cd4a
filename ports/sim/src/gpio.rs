//! Simulated output line

use pulse_core::OutputLineId;
use pulse_hal::{HalResult, Level, OutputLine};

use crate::board::{LineOpKind, SimBoard};

/// [`OutputLine`] recording every CPU write on the board timeline
pub struct SimLine {
    board: SimBoard,
}

impl SimLine {
    pub(crate) fn new(board: SimBoard) -> Self {
        Self { board }
    }
}

impl OutputLine for SimLine {
    fn line_id(&self) -> OutputLineId {
        self.board.config().line
    }

    fn write(&mut self, level: Level) -> HalResult<()> {
        self.board.lock().write_line(level, LineOpKind::Write);
        Ok(())
    }

    fn level(&mut self) -> HalResult<Level> {
        Ok(self.board.line_level())
    }

    fn toggle(&mut self) -> HalResult<()> {
        let mut state = self.board.lock();
        let next = state.level.flipped();
        state.write_line(next, LineOpKind::Toggle);
        Ok(())
    }
}
