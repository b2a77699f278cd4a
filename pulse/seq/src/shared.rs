//! Interrupt-shared sequencer slot
//!
//! The trigger handler and the engine's completion handler run in different
//! interrupt contexts but must drive the same lifecycle. [`SharedSequencer`]
//! is meant to live in a `static` and hands each handler exclusive access
//! inside a critical section, so two trigger sources can never race each
//! other against the hardware.

use core::cell::RefCell;

use critical_section::Mutex;
use pulse_core::{PulseError, PulseResult, SequenceState, SequencerEvent, TriggerSource};

use crate::engine::PulseEngine;
use crate::sequencer::Sequencer;

/// Process-wide owner of the one [`Sequencer`]
pub struct SharedSequencer<E: PulseEngine> {
    inner: Mutex<RefCell<Option<Sequencer<E>>>>,
}

impl<E: PulseEngine> SharedSequencer<E> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Store `sequencer`, returning the one it replaces.
    pub fn install(&self, sequencer: Sequencer<E>) -> Option<Sequencer<E>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(sequencer))
    }

    /// Remove the sequencer from the slot.
    pub fn take(&self) -> Option<Sequencer<E>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Run `f` with exclusive access to the installed sequencer.
    pub fn with<R>(&self, f: impl FnOnce(&mut Sequencer<E>) -> R) -> PulseResult<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow_ref_mut(cs);
            slot.as_mut().map(f).ok_or(PulseError::NotInstalled)
        })
    }

    /// Dispatch `event` to the installed sequencer.
    pub fn dispatch(&self, event: SequencerEvent) -> PulseResult<()> {
        self.with(|sequencer| sequencer.dispatch(event))?
    }

    pub fn trigger(&self, source: TriggerSource) -> PulseResult<()> {
        self.dispatch(SequencerEvent::Trigger(source))
    }

    pub fn on_interrupt(&self) -> PulseResult<()> {
        self.dispatch(SequencerEvent::Interrupt)
    }

    pub fn stop(&self) -> PulseResult<()> {
        self.dispatch(SequencerEvent::Stop)
    }

    /// Current lifecycle state; `Idle` when nothing is installed.
    pub fn state(&self) -> SequenceState {
        self.with(|sequencer| sequencer.state())
            .unwrap_or(SequenceState::Idle)
    }
}

impl<E: PulseEngine> Default for SharedSequencer<E> {
    fn default() -> Self {
        Self::new()
    }
}
