//! Simulated board for the pulse-train sequencer.
//!
//! Every peripheral trait of `pulse-hal` is implemented over one shared
//! [`SimBoard`] that keeps a virtual counter instead of a wall clock. Time
//! only moves inside [`SimBoard::run_until`], which replays hardware
//! occurrences (periodic ticks routed through the fabric, compare matches)
//! in timestamp order and hands interrupts to a caller-supplied handler.
//!
//! The board records every line operation, every fabric register write and
//! every programmed compare deadline so tests can assert on exact timing and
//! on teardown ordering.

mod board;
mod compare;
mod fabric;
mod gpio;
mod timer;

pub use board::{FabricOp, Interrupt, LineOp, LineOpKind, SimBoard, SimConfig, SimError};
pub use compare::SimCompare;
pub use fabric::SimFabric;
pub use gpio::SimLine;
pub use timer::{SimSource, SimTerminator};
