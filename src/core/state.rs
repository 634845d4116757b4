//! Core State trait for units of behavior that live on a state stack.
//!
//! A state unit is a plain Rust value with lifecycle callbacks. The stack
//! only ever holds shared references to it and tells it, through a
//! [`StateContext`], which lifecycle status its current slot is in.

use crate::core::message::StateMessage;
use crate::event::{EventHandle, TickContext};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Lifecycle status of a slot on the stack.
///
/// A slot starts `Disabled`, becomes `Active` on entry, `Paused` while a
/// child sits above it, `Active` again on resume and `Disabled` once it
/// has exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateStatus {
    Disabled,
    Active,
    Paused,
}

impl fmt::Display for StateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disabled => "Disabled",
            Self::Active => "Active",
            Self::Paused => "Paused",
        };
        f.write_str(name)
    }
}

/// Per-activation view handed to every lifecycle callback.
///
/// The status is the one the slot had when the callback started: entry
/// observes `Disabled`, pause observes `Active`, resume observes `Paused`
/// and exit observes `Active` or `Paused`. The stack moves the slot to its
/// next status after the callback returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateContext {
    status: StateStatus,
}

impl StateContext {
    pub(crate) fn disabled() -> Self {
        Self {
            status: StateStatus::Disabled,
        }
    }

    /// Current lifecycle status of the slot wrapping the state.
    pub fn status(&self) -> StateStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: StateStatus) {
        self.status = status;
    }
}

impl Default for StateContext {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Trait for units of behavior scheduled by a [`StateStack`].
///
/// Every callback has a no-op default, and the default tick keeps the
/// state running. Side effects are entirely up to the implementor; the
/// stack only guarantees the order in which callbacks fire:
///
/// - `on_entry` runs before the first `on_tick` of an activation
/// - `on_pause` runs before a child's `on_entry`
/// - `on_resume` runs before the first `on_tick` after a child is popped
/// - `on_exit` runs after the last `on_tick` of an activation
///
/// # Example
///
/// ```rust
/// use mindstack::core::{State, StateContext};
/// use mindstack::event::{EventHandle, TickContext};
/// use mindstack::StateStack;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// struct Countdown {
///     remaining: u32,
/// }
///
/// impl State for Countdown {
///     fn name(&self) -> &str {
///         "Countdown"
///     }
///
///     fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
///         if self.remaining == 0 {
///             return ctx.pop();
///         }
///         self.remaining -= 1;
///         ctx.stay()
///     }
/// }
///
/// let countdown = Rc::new(RefCell::new(Countdown { remaining: 2 }));
/// let mut stack = StateStack::new();
/// stack.push_state(countdown.clone());
///
/// stack.tick().unwrap();
/// stack.tick().unwrap();
/// assert_eq!(stack.process_count(), 1);
///
/// stack.tick().unwrap();
/// assert_eq!(stack.process_count(), 0);
/// assert_eq!(countdown.borrow().remaining, 0);
/// ```
///
/// [`StateStack`]: crate::stack::StateStack
pub trait State: 'static {
    /// Name used for diagnostics and lifecycle history.
    ///
    /// Defaults to the Rust type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once when the slot is first ticked.
    fn on_entry(&mut self, _ctx: &StateContext) {}

    /// Called on every tick while the state is the top of the stack.
    ///
    /// The returned handle must be produced by `ctx` during this call.
    fn on_tick(&mut self, _ctx: &mut TickContext<'_>) -> EventHandle {
        EventHandle::CONTINUE
    }

    /// Called when the slot leaves the stack after it has been entered.
    fn on_exit(&mut self, _ctx: &StateContext) {}

    /// Called when a child is pushed above an active slot.
    fn on_pause(&mut self, _ctx: &StateContext) {}

    /// Called on the next tick after the child above was popped.
    fn on_resume(&mut self, _ctx: &StateContext) {}

    /// Offer a routed message to this state.
    ///
    /// Returning `false` tells the router that this state is finished with
    /// respect to the message. Implement through [`receives!`] rather than
    /// by hand to dispatch on concrete payload types.
    ///
    /// [`receives!`]: crate::receives
    fn handle_message(&mut self, _message: &StateMessage<'_>, _ctx: &StateContext) -> bool {
        false
    }
}

/// Shared, non-owning handle the stack keeps for a state unit.
pub type StateRef = Rc<RefCell<dyn State>>;

/// Wrap a state unit so it can be pushed onto a stack.
///
/// Keep a typed `Rc<RefCell<S>>` instead when the caller needs to inspect
/// the state afterwards; it coerces to [`StateRef`] at the call site.
pub fn state_ref<S: State>(state: S) -> StateRef {
    Rc::new(RefCell::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named;

    impl State for Named {
        fn name(&self) -> &str {
            "Named"
        }
    }

    struct Anonymous;

    impl State for Anonymous {}

    #[test]
    fn context_starts_disabled() {
        let context = StateContext::default();
        assert_eq!(context.status(), StateStatus::Disabled);
    }

    #[test]
    fn context_tracks_status_changes() {
        let mut context = StateContext::disabled();
        context.set_status(StateStatus::Active);
        assert_eq!(context.status(), StateStatus::Active);

        context.set_status(StateStatus::Paused);
        assert_eq!(context.status(), StateStatus::Paused);
    }

    #[test]
    fn name_defaults_to_type_name() {
        let state = Anonymous;
        assert!(state.name().ends_with("Anonymous"));
        assert_eq!(Named.name(), "Named");
    }

    #[test]
    fn state_ref_erases_type() {
        let state = state_ref(Named);
        assert_eq!(state.borrow().name(), "Named");
    }

    #[test]
    fn status_displays_variant_name() {
        assert_eq!(StateStatus::Paused.to_string(), "Paused");
    }

    #[test]
    fn status_serializes_correctly() {
        let json = serde_json::to_string(&StateStatus::Active).unwrap();
        let status: StateStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, StateStatus::Active);
    }
}
