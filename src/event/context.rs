//! Tick context: the narrow view a ticking state gets of its stack.

use super::handle::EventHandle;
use super::store::EventPool;
use crate::core::{State, StateContext, StateRef, StateStatus};
use crate::stack::{StackError, StateKey};

/// Handed to [`State::on_tick`]. Reports the slot status and mints the
/// event handle the tick returns.
///
/// Handles minted here are only valid as the return value of the current
/// tick. Anything minted but not returned is recycled when the tick ends.
pub struct TickContext<'a> {
    context: StateContext,
    events: &'a mut EventPool,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(context: StateContext, events: &'a mut EventPool) -> Self {
        Self { context, events }
    }

    /// Status of the ticking slot. Always `Active` during a tick.
    pub fn status(&self) -> StateStatus {
        self.context.status()
    }

    /// Keep ticking this state.
    pub fn stay(&self) -> EventHandle {
        EventHandle::CONTINUE
    }

    /// Pop this state.
    pub fn pop(&self) -> EventHandle {
        EventHandle::POP
    }

    /// Push `state` above this one, or in its place when `pop_self` is set.
    pub fn push_sub_state(&mut self, state: StateRef, pop_self: bool) -> EventHandle {
        self.events.push_state(state, pop_self)
    }

    /// Push a sequence of states; the first element ends up on top.
    pub fn push_sub_states<I>(&mut self, states: I, pop_self: bool) -> EventHandle
    where
        I: IntoIterator<Item = StateRef>,
    {
        self.events.push_states(states, pop_self)
    }

    /// Push the state registered for `T`.
    pub fn push_registered<T: State>(&mut self, pop_self: bool) -> EventHandle {
        self.events.push_registered(StateKey::of::<T>(), pop_self)
    }

    /// Push registered states by key; the first key ends up on top.
    pub fn push_registered_states(&mut self, keys: &[StateKey], pop_self: bool) -> EventHandle {
        self.events.push_registered_states(keys, pop_self)
    }

    /// Route `message` through the chain with this state as sender.
    ///
    /// This state is the top of the chain, so it is offered the message
    /// first.
    pub fn raise_message<M: 'static>(&mut self, message: M) -> EventHandle {
        self.events.raise_message(message)
    }

    pub(crate) fn fail(&mut self, error: StackError) -> EventHandle {
        self.events.fail(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn context_mints_pooled_handles() {
        let mut events = EventPool::new(2);
        let mut ctx = TickContext::new(StateContext::default(), &mut events);

        assert_eq!(ctx.status(), StateStatus::Disabled);
        assert_eq!(ctx.stay(), EventHandle::CONTINUE);
        assert_eq!(ctx.pop(), EventHandle::POP);

        let handle = ctx.raise_message(7u8);
        assert_eq!(handle.kind(), EventKind::RaiseMessage);
        assert_eq!(handle.version(), Some(0));

        let handle = ctx.push_sub_states(Vec::new(), true);
        assert_eq!(handle.kind(), EventKind::PushSubStates);
    }
}
