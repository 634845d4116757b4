//! States assembled from closures.

use crate::core::{State, StateContext, StateMessage};
use crate::event::{EventHandle, TickContext};
use std::fmt;

type Callback = Box<dyn FnMut(&StateContext)>;
type TickFn = Box<dyn FnMut(&mut TickContext<'_>) -> EventHandle>;
type MessageFn = Box<dyn FnMut(&StateMessage<'_>, &StateContext) -> bool>;

/// A named state built from optional closures.
///
/// Without a tick closure the state keeps running; without a message
/// closure it handles nothing.
///
/// # Example
///
/// ```rust
/// use mindstack::states::FnState;
/// use mindstack::StateStack;
/// use mindstack::core::state_ref;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let entered = Rc::new(Cell::new(false));
/// let flag = entered.clone();
/// let alert = FnState::new("Alert")
///     .entry(move |_| flag.set(true))
///     .tick(|ctx| ctx.pop());
///
/// let mut stack = StateStack::new();
/// stack.push_state(state_ref(alert));
/// stack.tick().unwrap();
///
/// assert!(entered.get());
/// assert!(stack.is_empty());
/// ```
pub struct FnState {
    name: String,
    entry: Option<Callback>,
    tick: Option<TickFn>,
    exit: Option<Callback>,
    pause: Option<Callback>,
    resume: Option<Callback>,
    message: Option<MessageFn>,
}

impl FnState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: None,
            tick: None,
            exit: None,
            pause: None,
            resume: None,
            message: None,
        }
    }

    pub fn entry<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StateContext) + 'static,
    {
        self.entry = Some(Box::new(f));
        self
    }

    pub fn tick<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut TickContext<'_>) -> EventHandle + 'static,
    {
        self.tick = Some(Box::new(f));
        self
    }

    pub fn exit<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StateContext) + 'static,
    {
        self.exit = Some(Box::new(f));
        self
    }

    pub fn pause<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StateContext) + 'static,
    {
        self.pause = Some(Box::new(f));
        self
    }

    pub fn resume<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StateContext) + 'static,
    {
        self.resume = Some(Box::new(f));
        self
    }

    /// Handle messages with a closure; return `true` to consume.
    pub fn message<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StateMessage<'_>, &StateContext) -> bool + 'static,
    {
        self.message = Some(Box::new(f));
        self
    }
}

fn call(callback: &mut Option<Callback>, ctx: &StateContext) {
    if let Some(callback) = callback {
        callback(ctx);
    }
}

impl State for FnState {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_entry(&mut self, ctx: &StateContext) {
        call(&mut self.entry, ctx);
    }

    fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
        match &mut self.tick {
            Some(tick) => tick(ctx),
            None => ctx.stay(),
        }
    }

    fn on_exit(&mut self, ctx: &StateContext) {
        call(&mut self.exit, ctx);
    }

    fn on_pause(&mut self, ctx: &StateContext) {
        call(&mut self.pause, ctx);
    }

    fn on_resume(&mut self, ctx: &StateContext) {
        call(&mut self.resume, ctx);
    }

    fn handle_message(&mut self, message: &StateMessage<'_>, ctx: &StateContext) -> bool {
        self.message
            .as_mut()
            .is_some_and(|handler| handler(message, ctx))
    }
}

impl fmt::Debug for FnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnState")
            .field("name", &self.name)
            .field("tick", &self.tick.is_some())
            .field("message", &self.message.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{state_ref, StateStatus};
    use crate::stack::StateStack;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn missing_tick_keeps_running() {
        let mut stack = StateStack::new();
        stack.push_state(state_ref(FnState::new("Idle")));
        stack.tick().unwrap();
        stack.tick().unwrap();

        assert_eq!(stack.top_status(), Some(StateStatus::Active));
    }

    #[test]
    fn missing_message_handler_declines() {
        let mut stack = StateStack::new();
        stack.push_state(state_ref(FnState::new("Idle")));

        assert!(!stack.raise_message(()));
        assert!(stack.is_empty());
    }

    #[test]
    fn callbacks_see_prior_status() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (entry, pause, resume, exit) = (seen.clone(), seen.clone(), seen.clone(), seen.clone());
        let parent = FnState::new("Parent")
            .entry(move |ctx| entry.borrow_mut().push(("entry", ctx.status())))
            .pause(move |ctx| pause.borrow_mut().push(("pause", ctx.status())))
            .resume(move |ctx| resume.borrow_mut().push(("resume", ctx.status())))
            .exit(move |ctx| exit.borrow_mut().push(("exit", ctx.status())));

        let mut stack = StateStack::new();
        stack.push_state(state_ref(parent));
        stack.tick().unwrap();
        stack.push_state(state_ref(FnState::new("Child").tick(|ctx| ctx.pop())));
        stack.tick().unwrap();
        stack.tick().unwrap();
        stack.pop_all_states();

        assert_eq!(
            *seen.borrow(),
            [
                ("entry", StateStatus::Disabled),
                ("pause", StateStatus::Active),
                ("resume", StateStatus::Paused),
                ("exit", StateStatus::Active),
            ]
        );
    }

    #[test]
    fn message_closure_consumes_payload() {
        let received = Rc::new(RefCell::new(None));
        let sink = received.clone();
        let listener = FnState::new("Listener").message(move |message, _| {
            *sink.borrow_mut() = message.downcast::<&str>().copied();
            true
        });

        let mut stack = StateStack::new();
        stack.push_state(state_ref(listener));

        assert!(stack.raise_message("hello"));
        assert_eq!(*received.borrow(), Some("hello"));
    }
}
