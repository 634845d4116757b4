//! A state stack is itself a state.

use super::machine::StateStack;
use crate::core::{State, StateContext, StateMessage};
use crate::event::{EventHandle, TickContext};
use tracing::warn;

/// Nesting a stack inside another stack.
///
/// Ticking the outer slot ticks the inner chain; the outer slot pops once
/// the inner chain is empty. Exiting the outer slot pops every inner
/// state, and pausing or resuming it pauses or resumes the inner top.
/// An error inside the inner tick surfaces from the outer tick as
/// [`StackError::Nested`](super::StackError::Nested).
///
/// # Example
///
/// ```rust
/// use mindstack::core::state_ref;
/// use mindstack::event::{EventHandle, TickContext};
/// use mindstack::{State, StateStack};
///
/// struct Once;
///
/// impl State for Once {
///     fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
///         ctx.pop()
///     }
/// }
///
/// let mut inner = StateStack::new();
/// inner.push_state(state_ref(Once));
///
/// let mut outer = StateStack::new();
/// outer.push_state(state_ref(inner));
///
/// outer.tick().unwrap();
/// assert_eq!(outer.process_count(), 1);
/// outer.tick().unwrap();
/// assert!(outer.is_empty());
/// ```
impl State for StateStack {
    fn name(&self) -> &str {
        "StateStack"
    }

    fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
        if self.is_empty() {
            return ctx.pop();
        }
        match self.tick() {
            Ok(()) => ctx.stay(),
            Err(error) => {
                warn!(%error, "inner state stack failed");
                ctx.fail(error)
            }
        }
    }

    fn on_exit(&mut self, _ctx: &StateContext) {
        self.pop_all_states();
    }

    fn on_pause(&mut self, _ctx: &StateContext) {
        self.pause_top();
    }

    fn on_resume(&mut self, _ctx: &StateContext) {
        self.resume_top();
    }

    fn handle_message(&mut self, message: &StateMessage<'_>, _ctx: &StateContext) -> bool {
        self.walk(message)
    }
}
