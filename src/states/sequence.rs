//! States that walk through numbered steps.

use crate::core::{State, StateContext};
use crate::event::{EventHandle, TickContext};

type StepFn = Box<dyn FnMut(usize, &mut TickContext<'_>) -> Option<EventHandle>>;

/// A state driven by a step function.
///
/// Each tick calls the function with the current step number, starting
/// from zero on every entry. Returning `None` ends the sequence and pops
/// the state.
///
/// # Example
///
/// ```rust
/// use mindstack::core::state_ref;
/// use mindstack::states::SequenceState;
/// use mindstack::StateStack;
///
/// let countdown = SequenceState::new("Countdown", |step, ctx| (step < 3).then(|| ctx.stay()));
///
/// let mut stack = StateStack::new();
/// stack.push_state(state_ref(countdown));
/// for _ in 0..3 {
///     stack.tick().unwrap();
/// }
/// assert_eq!(stack.process_count(), 1);
///
/// stack.tick().unwrap();
/// assert!(stack.is_empty());
/// ```
pub struct SequenceState {
    name: String,
    step: usize,
    advance: StepFn,
}

impl SequenceState {
    pub fn new<F>(name: impl Into<String>, advance: F) -> Self
    where
        F: FnMut(usize, &mut TickContext<'_>) -> Option<EventHandle> + 'static,
    {
        Self {
            name: name.into(),
            step: 0,
            advance: Box::new(advance),
        }
    }

    /// Steps taken since the last entry.
    pub fn step(&self) -> usize {
        self.step
    }
}

impl State for SequenceState {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_entry(&mut self, _ctx: &StateContext) {
        self.step = 0;
    }

    fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
        let current = self.step;
        self.step += 1;
        match (self.advance)(current, ctx) {
            Some(handle) => handle,
            None => ctx.pop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StateStack;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn step_counter_restarts_on_entry() {
        let steps = Rc::new(RefCell::new(Vec::new()));
        let sink = steps.clone();
        let sequence = Rc::new(RefCell::new(SequenceState::new("Twice", move |step, ctx| {
            sink.borrow_mut().push(step);
            (step < 1).then(|| ctx.stay())
        })));

        let mut stack = StateStack::new();
        for _ in 0..2 {
            stack.push_state(sequence.clone());
            stack.tick().unwrap();
            stack.tick().unwrap();
            assert!(stack.is_empty());
        }

        assert_eq!(*steps.borrow(), [0, 1, 0, 1]);
        assert_eq!(sequence.borrow().step(), 2);
    }

    #[test]
    fn steps_may_push_sub_states() {
        let mut stack = StateStack::new();
        let sequence = SequenceState::new("Spawner", |step, ctx| match step {
            0 => Some(ctx.push_sub_state(
                crate::core::state_ref(SequenceState::new("Child", |_, _| None)),
                false,
            )),
            _ => None,
        });
        stack.push_state(crate::core::state_ref(sequence));

        stack.tick().unwrap();
        assert_eq!(stack.process_count(), 2);
        stack.tick().unwrap();
        assert_eq!(stack.process_count(), 1);
        stack.tick().unwrap();
        assert!(stack.is_empty());
    }
}
