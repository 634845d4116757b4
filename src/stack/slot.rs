//! Stack slots: a state unit paired with its lifecycle status.

use crate::core::{StateContext, StateMessage, StateRef, StateStatus};
use crate::event::{EventHandle, EventPool, TickContext};

pub(crate) type SlotId = usize;

/// One frame of the active chain.
///
/// Each lifecycle call hands the state the status the slot had when the
/// call started, then moves the slot to its next status.
pub(crate) struct Slot {
    state: Option<StateRef>,
    context: StateContext,
}

impl Slot {
    fn vacant() -> Self {
        Self {
            state: None,
            context: StateContext::disabled(),
        }
    }

    pub(crate) fn status(&self) -> StateStatus {
        self.context.status()
    }

    pub(crate) fn state(&self) -> Option<&StateRef> {
        self.state.as_ref()
    }

    pub(crate) fn name(&self) -> String {
        self.state
            .as_ref()
            .map(|state| state.borrow().name().to_string())
            .unwrap_or_default()
    }

    pub(crate) fn enter(&mut self) {
        if let Some(state) = &self.state {
            state.borrow_mut().on_entry(&self.context);
        }
        self.context.set_status(StateStatus::Active);
    }

    pub(crate) fn tick(&self, events: &mut EventPool) -> EventHandle {
        let Some(state) = &self.state else {
            return EventHandle::POP;
        };
        let mut ctx = TickContext::new(self.context, events);
        state.borrow_mut().on_tick(&mut ctx)
    }

    pub(crate) fn exit(&mut self) {
        if let Some(state) = &self.state {
            state.borrow_mut().on_exit(&self.context);
        }
        self.context.set_status(StateStatus::Disabled);
    }

    pub(crate) fn pause(&mut self) {
        if let Some(state) = &self.state {
            state.borrow_mut().on_pause(&self.context);
        }
        self.context.set_status(StateStatus::Paused);
    }

    pub(crate) fn resume(&mut self) {
        if let Some(state) = &self.state {
            state.borrow_mut().on_resume(&self.context);
        }
        self.context.set_status(StateStatus::Active);
    }

    pub(crate) fn handle_message(&self, message: &StateMessage<'_>) -> bool {
        self.state
            .as_ref()
            .is_some_and(|state| state.borrow_mut().handle_message(message, &self.context))
    }
}

/// Arena of slots with a free list.
///
/// Slots are created on demand and reused after release. Rebinding a slot
/// resets it to `Disabled`; releasing it drops the state reference.
pub(crate) struct SlotPool {
    slots: Vec<Slot>,
    free: Vec<SlotId>,
}

impl SlotPool {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn acquire(&mut self, state: StateRef) -> SlotId {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                self.slots.push(Slot::vacant());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[id];
        slot.state = Some(state);
        slot.context = StateContext::disabled();
        id
    }

    pub(crate) fn release(&mut self, id: SlotId) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.state = None;
            slot.context = StateContext::disabled();
            self.free.push(id);
        }
    }

    pub(crate) fn get(&self, id: SlotId) -> &Slot {
        &self.slots[id]
    }

    pub(crate) fn get_mut(&mut self, id: SlotId) -> &mut Slot {
        &mut self.slots[id]
    }

    /// Slots ever created.
    pub(crate) fn allocated(&self) -> usize {
        self.slots.len()
    }
}
