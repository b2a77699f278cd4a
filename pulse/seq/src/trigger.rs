//! Adapters from external trigger sources
//!
//! Trigger sources are collaborators outside the sequencer: a debounced
//! button edge and a write-only characteristic whose payload carries no
//! meaning. Both reduce to a parameterless trigger.

use pulse_core::{PulseResult, TriggerSource};

use crate::engine::PulseEngine;
use crate::shared::SharedSequencer;

/// Call from the debounced button edge handler.
pub fn on_button_edge<E: PulseEngine>(shared: &SharedSequencer<E>) -> PulseResult<()> {
    shared.trigger(TriggerSource::Button)
}

/// Call from the trigger characteristic's write callback.
///
/// The payload is ignored. Returns the number of bytes accepted, which is
/// always the whole write, so the callback can hand it back to the stack even
/// when arming failed.
pub fn on_characteristic_write<E: PulseEngine>(
    shared: &SharedSequencer<E>,
    payload: &[u8],
) -> usize {
    if let Err(err) = shared.trigger(TriggerSource::Characteristic) {
        log::warn!("characteristic trigger dropped: {}", err);
    }
    payload.len()
}
