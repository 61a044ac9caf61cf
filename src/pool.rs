//! Free-list reuse pool for playback states.
//!
//! Starting and stopping clips happens continuously over an object's
//! lifetime; drawing states from a slot arena instead of allocating keeps
//! the per-transition cost flat. A state is never referenced from two
//! player slots at once, and `release` is called exactly once per
//! `acquire` before the slot is reused.

use slotmap::{SlotMap, new_key_type};

use crate::playback::PlaybackState;

new_key_type! {
    /// Handle to a pooled playback state.
    pub struct StateKey;
}

/// Arena of playback states with index-based slot reuse.
#[derive(Default, Debug)]
pub struct StatePool {
    states: SlotMap<StateKey, PlaybackState>,
}

impl StatePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `state` in a (possibly recycled) slot.
    pub fn acquire(&mut self, state: PlaybackState) -> StateKey {
        self.states.insert(state)
    }

    /// Returns a state to the pool. Releasing a key twice is a caller bug;
    /// it is logged and otherwise ignored.
    pub fn release(&mut self, key: StateKey) {
        if self.states.remove(key).is_none() {
            log::warn!("released a playback state that was not acquired: {key:?}");
        }
    }

    #[must_use]
    pub fn get(&self, key: StateKey) -> Option<&PlaybackState> {
        self.states.get(key)
    }

    #[must_use]
    pub fn get_mut(&mut self, key: StateKey) -> Option<&mut PlaybackState> {
        self.states.get_mut(key)
    }

    /// Number of live (acquired) states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
