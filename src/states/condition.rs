//! Guarded states that pop themselves once a condition fails.

use crate::core::{state_ref, Guard, State, StateContext, StateMessage, StateRef};
use crate::event::{EventHandle, TickContext};
use tracing::debug;

/// Wraps a state behind a [`Guard`].
///
/// The guard is checked before every tick; once it fails the wrapper pops
/// instead of ticking the wrapped state. Every other callback, message
/// handling included, is forwarded unchanged.
pub struct Conditional {
    name: String,
    guard: Guard,
    inner: StateRef,
}

impl Conditional {
    pub fn new(inner: StateRef, guard: Guard) -> Self {
        let name = inner.borrow().name().to_string();
        Self { name, guard, inner }
    }

    /// The wrapped state.
    pub fn inner(&self) -> &StateRef {
        &self.inner
    }
}

impl State for Conditional {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_entry(&mut self, ctx: &StateContext) {
        self.inner.borrow_mut().on_entry(ctx);
    }

    fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
        if !self.guard.check() {
            debug!(state = %self.name, "guard failed, popping");
            return ctx.pop();
        }
        self.inner.borrow_mut().on_tick(ctx)
    }

    fn on_exit(&mut self, ctx: &StateContext) {
        self.inner.borrow_mut().on_exit(ctx);
    }

    fn on_pause(&mut self, ctx: &StateContext) {
        self.inner.borrow_mut().on_pause(ctx);
    }

    fn on_resume(&mut self, ctx: &StateContext) {
        self.inner.borrow_mut().on_resume(ctx);
    }

    fn handle_message(&mut self, message: &StateMessage<'_>, ctx: &StateContext) -> bool {
        self.inner.borrow_mut().handle_message(message, ctx)
    }
}

/// Combinators on shared state references.
pub trait StateRefExt {
    /// Wrap the state so it pops as soon as `guard` fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mindstack::core::{state_ref, Guard};
    /// use mindstack::states::{FnState, StateRefExt};
    /// use mindstack::StateStack;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let visible = Rc::new(Cell::new(true));
    /// let seen = visible.clone();
    /// let chase = state_ref(FnState::new("Chase")).with_condition(Guard::new(move || seen.get()));
    ///
    /// let mut stack = StateStack::new();
    /// stack.push_state(chase);
    /// stack.tick().unwrap();
    /// assert_eq!(stack.process_count(), 1);
    ///
    /// visible.set(false);
    /// stack.tick().unwrap();
    /// assert!(stack.is_empty());
    /// ```
    fn with_condition(self, guard: Guard) -> StateRef;
}

impl StateRefExt for StateRef {
    fn with_condition(self, guard: Guard) -> StateRef {
        state_ref(Conditional::new(self, guard))
    }
}
