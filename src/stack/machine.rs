//! The state stack: owns the active chain and drives lifecycle transitions.

use super::config::{RoutingPolicy, StackConfig};
use super::error::StackError;
use super::registry::{StateKey, StateRegistry};
use super::routing::UnhandledListeners;
use super::slot::{SlotId, SlotPool};
use crate::builder::StateStackBuilder;
use crate::core::{LifecycleEvent, LifecycleHistory, LifecycleRecord, State, StateRef, StateStatus};
use crate::event::{EventHandle, EventKind, EventPool};
use chrono::Utc;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Stack-based scheduler for nested states.
///
/// The bottom of the chain is the first state pushed; the top is the
/// deepest and the only one that ticks. Pushing over an active state
/// pauses it; popping the state above it lets it resume on the next tick.
///
/// # Example
///
/// ```rust
/// use mindstack::core::State;
/// use mindstack::event::{EventHandle, TickContext};
/// use mindstack::{StateStack, StateStatus};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// struct Wander;
///
/// impl State for Wander {}
///
/// struct Flee {
///     steps: u32,
/// }
///
/// impl State for Flee {
///     fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
///         self.steps += 1;
///         if self.steps == 2 { ctx.pop() } else { ctx.stay() }
///     }
/// }
///
/// let mut stack = StateStack::new();
/// stack.push_state(Rc::new(RefCell::new(Wander)));
/// stack.tick().unwrap();
///
/// stack.push_state(Rc::new(RefCell::new(Flee { steps: 0 })));
/// assert_eq!(stack.statuses().collect::<Vec<_>>(), [StateStatus::Paused, StateStatus::Disabled]);
///
/// stack.tick().unwrap();
/// stack.tick().unwrap();
/// assert_eq!(stack.process_count(), 1);
/// assert_eq!(stack.top_status(), Some(StateStatus::Paused));
///
/// stack.tick().unwrap();
/// assert_eq!(stack.top_status(), Some(StateStatus::Active));
/// ```
pub struct StateStack {
    pub(super) config: StackConfig,
    pub(super) chain: Vec<SlotId>,
    pub(super) slots: SlotPool,
    pub(super) events: EventPool,
    pub(super) registry: StateRegistry,
    pub(super) unhandled: UnhandledListeners,
    pub(super) history: LifecycleHistory,
}

impl StateStack {
    /// Create an empty stack with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StackConfig::default())
    }

    /// Create an empty stack with `config`.
    ///
    /// Slots and pooled events for `config.capacity` states are reserved
    /// up front.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mindstack::{StackConfig, StateStack};
    ///
    /// let stack = StateStack::with_config(StackConfig {
    ///     max_iterations: 0,
    ///     ..StackConfig::default()
    /// });
    /// assert_eq!(stack.config().iteration_cap(), None);
    /// ```
    pub fn with_config(config: StackConfig) -> Self {
        Self {
            chain: Vec::with_capacity(config.capacity),
            slots: SlotPool::with_capacity(config.capacity),
            events: EventPool::new(config.capacity),
            registry: StateRegistry::default(),
            unhandled: UnhandledListeners::default(),
            history: LifecycleHistory::with_limit(config.history_limit),
            config,
        }
    }

    /// Start a [`StateStackBuilder`] with the default configuration.
    pub fn builder() -> StateStackBuilder {
        StateStackBuilder::new()
    }

    /// The configuration in effect, including changes made by the setters.
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Keep stepping within one tick until a state answers Continue.
    pub fn set_tick_until_continue(&mut self, enabled: bool) {
        self.config.tick_until_continue = enabled;
    }

    /// Cap on chained steps per tick. Zero disables the cap.
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.max_iterations = max_iterations;
    }

    /// How messages travel down the chain.
    pub fn set_routing(&mut self, routing: RoutingPolicy) {
        self.config.routing = routing;
    }

    /// Register a long-lived instance to be pushed by type.
    ///
    /// Every push of `T` reuses this very instance.
    pub fn register_state<T: State>(&mut self, state: Rc<RefCell<T>>) -> Result<(), StackError> {
        self.registry.register(state)
    }

    /// Whether an instance is registered for `T`.
    pub fn is_registered<T: State>(&self) -> bool {
        self.registry.contains(&StateKey::of::<T>())
    }

    /// Number of states on the chain.
    pub fn process_count(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain has no states left to tick.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Status of the top slot, if any.
    pub fn top_status(&self) -> Option<StateStatus> {
        self.chain.last().map(|&id| self.slots.get(id).status())
    }

    /// The state on top of the chain.
    pub fn top_state(&self) -> Option<StateRef> {
        self.chain
            .last()
            .and_then(|&id| self.slots.get(id).state().cloned())
    }

    /// Slot statuses from the bottom of the chain to the top.
    pub fn statuses(&self) -> impl Iterator<Item = StateStatus> + '_ {
        self.chain.iter().map(|&id| self.slots.get(id).status())
    }

    /// Lifecycle records kept according to `history_limit`.
    pub fn history(&self) -> &LifecycleHistory {
        &self.history
    }

    /// Push a state on top of the chain.
    ///
    /// An active top is paused first, so a parent is always paused before
    /// its child enters. The new slot starts `Disabled` and is entered on
    /// the next tick.
    pub fn push_state(&mut self, state: StateRef) {
        self.pause_top();

        if self.is_live(&state) {
            warn!(
                state = %state.borrow().name(),
                "pushing a state instance that is already running lower in the chain"
            );
        }

        let id = self.slots.acquire(state);
        self.chain.push(id);
        debug!(
            state = %self.slots.get(id).name(),
            depth = self.chain.len() - 1,
            "pushed state"
        );
    }

    /// Push states so that the first one ends up on top.
    ///
    /// The sequence reads outer to inner: `[a, b]` runs `a` to completion,
    /// then `b`.
    pub fn push_states<I>(&mut self, states: I)
    where
        I: IntoIterator<Item = StateRef>,
        I::IntoIter: DoubleEndedIterator,
    {
        for state in states.into_iter().rev() {
            self.push_state(state);
        }
    }

    /// Push the instance registered for `T`.
    pub fn push_registered<T: State>(&mut self) -> Result<(), StackError> {
        let state = self.registry.resolve(StateKey::of::<T>())?;
        self.push_state(state);
        Ok(())
    }

    /// Push registered instances so that the first key ends up on top.
    ///
    /// Every key is resolved before anything is pushed; all missing keys
    /// are reported together.
    pub fn push_registered_states(&mut self, keys: &[StateKey]) -> Result<(), StackError> {
        let states = self.registry.resolve_all(keys)?;
        self.push_states(states);
        Ok(())
    }

    /// Advance the top state by one tick.
    ///
    /// Does nothing on an empty chain. With `tick_until_continue` enabled
    /// the stack keeps stepping until a state answers Continue, the chain
    /// empties, or the iteration cap is exceeded.
    pub fn tick(&mut self) -> Result<(), StackError> {
        let mut steps = 0usize;
        loop {
            let Some(kind) = self.step()? else {
                return Ok(());
            };
            steps += 1;

            if !self.config.tick_until_continue || kind == EventKind::Continue || self.is_empty() {
                return Ok(());
            }
            if let Some(cap) = self.config.iteration_cap() {
                if steps >= cap {
                    warn!(cap, "tick exceeded iteration cap");
                    return Err(StackError::IterationCapExceeded { cap });
                }
            }
        }
    }

    /// Pop every state, running exits from the top down.
    pub fn pop_all_states(&mut self) {
        while !self.chain.is_empty() {
            self.pop_state();
        }
    }

    /// One scheduler step: lifecycle catch-up, tick, interpretation.
    fn step(&mut self) -> Result<Option<EventKind>, StackError> {
        let Some(&id) = self.chain.last() else {
            return Ok(None);
        };
        let depth = self.chain.len() - 1;

        match self.slots.get(id).status() {
            StateStatus::Disabled => {
                self.record(id, depth, LifecycleEvent::Entry);
                self.slots.get_mut(id).enter();
            }
            StateStatus::Paused => {
                self.record(id, depth, LifecycleEvent::Resume);
                self.slots.get_mut(id).resume();
            }
            StateStatus::Active => {}
        }

        self.record(id, depth, LifecycleEvent::Tick);
        let handle = self.slots.get(id).tick(&mut self.events);
        let sender = self.slots.get(id).state().cloned();
        trace!(
            state = %self.slots.get(id).name(),
            event = %handle.kind(),
            version = ?handle.version(),
            "ticked state"
        );

        let result = self.execute_event(handle, sender.as_ref());
        self.events.sweep();
        result.map(|()| Some(handle.kind()))
    }

    /// Validate and apply one event handle.
    fn execute_event(
        &mut self,
        handle: EventHandle,
        sender: Option<&StateRef>,
    ) -> Result<(), StackError> {
        if let Err(error) = self.events.validate(&handle) {
            warn!(%error, "rejected event handle");
            return Err(error);
        }

        let Some(ticket) = handle.ticket() else {
            if handle.kind() == EventKind::Pop {
                self.pop_state();
            }
            return Ok(());
        };

        match handle.kind() {
            EventKind::Continue => {}
            EventKind::Pop => self.pop_state(),
            EventKind::PushSubState => {
                let mut request = self.events.take_push_state(ticket)?;
                if request.pop_self {
                    self.pop_state();
                }
                if let Some(state) = request.state.take() {
                    self.push_state(state);
                }
                self.events.finish_push_state(ticket, request);
            }
            EventKind::PushSubStates => {
                let request = self.events.take_push_states(ticket)?;
                if request.pop_self {
                    self.pop_state();
                }
                self.push_states(request.states.iter().cloned());
                self.events.finish_push_states(ticket, request);
            }
            EventKind::PushRegisteredState => {
                let request = self.events.take_push_registered(ticket)?;
                let pop_self = request.pop_self;
                let resolved = request.key.map(|key| self.registry.resolve(key));
                self.events.finish_push_registered(ticket, request);

                if let Some(state) = resolved.transpose()? {
                    if pop_self {
                        self.pop_state();
                    }
                    self.push_state(state);
                }
            }
            EventKind::PushRegisteredStates => {
                let request = self.events.take_push_registered_states(ticket)?;
                let pop_self = request.pop_self;
                let resolved = self.registry.resolve_all(&request.keys);
                self.events.finish_push_registered_states(ticket, request);

                let states = resolved?;
                if pop_self {
                    self.pop_state();
                }
                self.push_states(states);
            }
            EventKind::RaiseMessage => {
                let mut pool = self.events.take_messages(ticket)?;
                let routed = pool
                    .payload(ticket.index, ticket.version)
                    .map(|payload| self.route(payload, sender));
                if routed.is_ok() {
                    pool.release(ticket.index);
                }
                self.events.return_messages(ticket, pool);
                routed.map_err(|mismatch| StackError::StaleEvent {
                    kind: EventKind::RaiseMessage,
                    held: mismatch.held,
                    current: mismatch.current,
                })?;
            }
            EventKind::Failure => {
                let error = self.events.take_failure(ticket)?;
                warn!(%error, "nested state stack failed");
                return Err(StackError::Nested(Box::new(error)));
            }
        }
        Ok(())
    }

    /// Pop the top slot, exiting it if it was ever entered.
    ///
    /// The slot beneath is not resumed here; the next tick resumes it.
    pub(super) fn pop_state(&mut self) {
        let Some(id) = self.chain.pop() else {
            return;
        };
        let depth = self.chain.len();

        if matches!(
            self.slots.get(id).status(),
            StateStatus::Active | StateStatus::Paused
        ) {
            self.record(id, depth, LifecycleEvent::Exit);
            self.slots.get_mut(id).exit();
        }
        debug!(state = %self.slots.get(id).name(), depth, "popped state");
        self.slots.release(id);
    }

    /// Pause the top slot if it is active.
    pub(super) fn pause_top(&mut self) {
        if let Some(&top) = self.chain.last() {
            if self.slots.get(top).status() == StateStatus::Active {
                self.record(top, self.chain.len() - 1, LifecycleEvent::Pause);
                self.slots.get_mut(top).pause();
            }
        }
    }

    /// Resume the top slot if it is paused.
    pub(super) fn resume_top(&mut self) {
        if let Some(&top) = self.chain.last() {
            if self.slots.get(top).status() == StateStatus::Paused {
                self.record(top, self.chain.len() - 1, LifecycleEvent::Resume);
                self.slots.get_mut(top).resume();
            }
        }
    }

    /// Whether `state` already occupies an entered slot.
    fn is_live(&self, state: &StateRef) -> bool {
        self.chain.iter().any(|&id| {
            let slot = self.slots.get(id);
            slot.status() != StateStatus::Disabled
                && slot.state().is_some_and(|held| Rc::ptr_eq(held, state))
        })
    }

    pub(super) fn record(&mut self, id: SlotId, depth: usize, event: LifecycleEvent) {
        if !self.history.is_enabled() {
            return;
        }
        let slot = self.slots.get(id);
        self.history.record(LifecycleRecord {
            state: slot.name(),
            event,
            status: slot.status(),
            depth,
            timestamp: Utc::now(),
        });
    }

    /// Pooled event requests currently checked out.
    #[cfg(test)]
    pub(crate) fn live_requests(&self) -> usize {
        self.events.live_requests()
    }

    #[cfg(test)]
    pub(crate) fn allocated_slots(&self) -> usize {
        self.slots.allocated()
    }

    #[cfg(test)]
    pub(crate) fn allocated_events(&self, kind: EventKind) -> usize {
        self.events.allocated(kind)
    }
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StateStack {
    fn drop(&mut self) {
        self.pop_all_states();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state_ref;
    use crate::event::TickContext;

    struct Idle;
    impl State for Idle {}

    struct Blink;

    impl State for Blink {
        fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
            ctx.pop()
        }
    }

    struct Spawner;

    impl State for Spawner {
        fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
            ctx.push_sub_state(state_ref(Blink), false)
        }
    }

    #[test]
    fn tick_on_empty_stack_is_noop() {
        let mut stack = StateStack::new();
        stack.tick().unwrap();
        assert!(stack.is_empty());
        assert_eq!(stack.top_status(), None);
    }

    #[test]
    fn steady_state_reuses_slots_and_requests() {
        let mut stack = StateStack::new();
        stack.push_state(state_ref(Spawner));

        for _ in 0..100 {
            stack.tick().unwrap();
            stack.tick().unwrap();
        }

        assert_eq!(stack.process_count(), 1);
        assert_eq!(stack.allocated_slots(), 2);
        assert_eq!(stack.allocated_events(EventKind::PushSubState), 1);
        assert_eq!(stack.live_requests(), 0);
    }

    #[test]
    fn pushing_pauses_only_an_active_top() {
        let mut stack = StateStack::new();
        stack.push_states([state_ref(Idle), state_ref(Idle)]);
        assert_eq!(
            stack.statuses().collect::<Vec<_>>(),
            [StateStatus::Disabled, StateStatus::Disabled]
        );

        stack.tick().unwrap();
        stack.push_state(state_ref(Idle));
        assert_eq!(
            stack.statuses().collect::<Vec<_>>(),
            [StateStatus::Disabled, StateStatus::Paused, StateStatus::Disabled]
        );
    }

    #[test]
    fn pop_resumes_lazily() {
        let mut stack = StateStack::new();
        stack.push_state(state_ref(Idle));
        stack.tick().unwrap();
        stack.push_state(state_ref(Blink));
        stack.tick().unwrap();

        assert_eq!(stack.process_count(), 1);
        assert_eq!(stack.top_status(), Some(StateStatus::Paused));
        stack.tick().unwrap();
        assert_eq!(stack.top_status(), Some(StateStatus::Active));
    }

    #[test]
    fn setters_update_config() {
        let mut stack = StateStack::new();
        stack.set_tick_until_continue(true);
        stack.set_max_iterations(3);
        stack.set_routing(RoutingPolicy::Peek);

        assert!(stack.config().tick_until_continue);
        assert_eq!(stack.config().iteration_cap(), Some(3));
        assert_eq!(stack.config().routing, RoutingPolicy::Peek);
    }

    #[test]
    fn drop_exits_remaining_states() {
        let exited = Rc::new(RefCell::new(0));

        struct Counted(Rc<RefCell<u32>>);
        impl State for Counted {
            fn on_exit(&mut self, _ctx: &crate::core::StateContext) {
                *self.0.borrow_mut() += 1;
            }
        }

        let mut stack = StateStack::new();
        stack.push_state(state_ref(Counted(exited.clone())));
        stack.tick().unwrap();
        stack.push_state(state_ref(Counted(exited.clone())));
        stack.tick().unwrap();
        drop(stack);

        assert_eq!(*exited.borrow(), 2);
    }
}
