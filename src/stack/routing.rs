//! Message routing through the active chain.

use super::config::RoutingPolicy;
use super::machine::StateStack;
use crate::core::{LifecycleEvent, StateMessage, StateRef};
use std::any::Any;
use std::fmt;
use tracing::debug;

/// Callback for messages that no slot handled.
pub type UnhandledListener = Box<dyn FnMut(&dyn Any, Option<&StateRef>)>;

/// Token returned by [`StateStack::subscribe_unhandled`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct UnhandledListeners {
    next_id: u64,
    listeners: Vec<(SubscriptionId, UnhandledListener)>,
}

impl UnhandledListeners {
    fn subscribe(&mut self, listener: UnhandledListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(held, _)| *held != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, payload: &dyn Any, sender: Option<&StateRef>) {
        for (_, listener) in &mut self.listeners {
            listener(payload, sender);
        }
    }
}

impl fmt::Debug for UnhandledListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnhandledListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl StateStack {
    /// Route `message` from the top of the chain down, with no sender.
    ///
    /// Returns whether some slot handled it. Under
    /// [`RoutingPolicy::PopUnhandled`] every slot that declines is popped
    /// on the way down; under [`RoutingPolicy::Peek`] the chain is left
    /// untouched. A message nobody handles is reported to the unhandled
    /// listeners; it is not an error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mindstack::core::{state_ref, Receives, State, StateRef};
    /// use mindstack::{receives, StateStack};
    ///
    /// struct Alarm;
    ///
    /// struct Guard {
    ///     alerted: bool,
    /// }
    ///
    /// impl Receives<Alarm> for Guard {
    ///     fn receive(&mut self, _: &Alarm, _: Option<&StateRef>) -> bool {
    ///         self.alerted = true;
    ///         true
    ///     }
    /// }
    ///
    /// impl State for Guard {
    ///     receives!(Alarm);
    /// }
    ///
    /// struct Sleep;
    /// impl State for Sleep {}
    ///
    /// let mut stack = StateStack::new();
    /// stack.push_states([state_ref(Sleep), state_ref(Guard { alerted: false })]);
    /// stack.tick().unwrap();
    ///
    /// assert!(stack.raise_message(Alarm));
    /// assert_eq!(stack.process_count(), 1);
    /// ```
    pub fn raise_message<M: 'static>(&mut self, message: M) -> bool {
        self.route(&message, None)
    }

    /// Register a callback for messages no slot handles.
    pub fn subscribe_unhandled<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&dyn Any, Option<&StateRef>) + 'static,
    {
        self.unhandled.subscribe(Box::new(listener))
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe_unhandled(&mut self, id: SubscriptionId) -> bool {
        self.unhandled.unsubscribe(id)
    }

    /// Route a message raised on this stack, notifying the unhandled
    /// listeners when no slot takes it.
    pub(crate) fn route(&mut self, payload: &dyn Any, sender: Option<&StateRef>) -> bool {
        let message = StateMessage::new(payload, sender);
        let handled = self.walk(&message);

        if !handled {
            debug!(
                payload = ?message.payload_type(),
                remaining = self.chain.len(),
                "message not handled"
            );
            self.unhandled.notify(payload, sender);
        }
        handled
    }

    /// Offer `message` down the chain under the routing policy.
    ///
    /// Listeners are not notified here: a nested stack that declines may
    /// still see the message handled further down the outer chain.
    pub(crate) fn walk(&mut self, message: &StateMessage<'_>) -> bool {
        match self.config.routing {
            RoutingPolicy::PopUnhandled => self.route_popping(message),
            RoutingPolicy::Peek => self.route_peeking(message),
        }
    }

    fn route_popping(&mut self, message: &StateMessage<'_>) -> bool {
        while let Some(&id) = self.chain.last() {
            self.record(id, self.chain.len() - 1, LifecycleEvent::Message);
            if self.slots.get(id).handle_message(message) {
                return true;
            }
            self.pop_state();
        }
        false
    }

    fn route_peeking(&mut self, message: &StateMessage<'_>) -> bool {
        for depth in (0..self.chain.len()).rev() {
            let id = self.chain[depth];
            self.record(id, depth, LifecycleEvent::Message);
            if self.slots.get(id).handle_message(message) {
                return true;
            }
        }
        false
    }
}
