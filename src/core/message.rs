//! Typed messages routed through the active chain.
//!
//! A message is any `'static` value. It travels inside a borrowed
//! [`StateMessage`] envelope together with the state that raised it, so
//! routing never allocates. States opt into concrete payload types by
//! implementing [`Receives`] and listing the types with [`receives!`].
//!
//! [`receives!`]: crate::receives

use super::state::StateRef;
use std::any::{Any, TypeId};
use std::fmt;

/// Capability to handle messages of type `M`.
///
/// Return `true` when the message is consumed. Returning `false` marks the
/// state as finished with respect to the message and lets routing move on.
///
/// The sender is the state that raised the message, or `None` for
/// messages raised by the host. The sender may be the receiver itself;
/// do not borrow it in that case.
pub trait Receives<M: 'static> {
    fn receive(&mut self, message: &M, sender: Option<&StateRef>) -> bool;
}

/// Envelope pairing a message payload with its sender.
#[derive(Clone, Copy)]
pub struct StateMessage<'a> {
    payload: &'a dyn Any,
    sender: Option<&'a StateRef>,
}

impl<'a> StateMessage<'a> {
    pub fn new(payload: &'a dyn Any, sender: Option<&'a StateRef>) -> Self {
        Self { payload, sender }
    }

    /// The raw payload.
    pub fn payload(&self) -> &'a dyn Any {
        self.payload
    }

    /// The state that raised the message, if any.
    pub fn sender(&self) -> Option<&'a StateRef> {
        self.sender
    }

    pub fn payload_type(&self) -> TypeId {
        self.payload.type_id()
    }

    /// Check whether the payload is an `M`.
    pub fn is<M: 'static>(&self) -> bool {
        self.payload.is::<M>()
    }

    /// Borrow the payload as an `M`.
    pub fn downcast<M: 'static>(&self) -> Option<&'a M> {
        self.payload.downcast_ref::<M>()
    }

    /// Deliver the payload to `receiver` if it is an `M`.
    ///
    /// Returns `None` when the payload has another type, otherwise the
    /// receiver's answer.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mindstack::core::{Receives, StateMessage, StateRef};
    ///
    /// struct Alarm(u8);
    ///
    /// struct Guard {
    ///     alarms: u32,
    /// }
    ///
    /// impl Receives<Alarm> for Guard {
    ///     fn receive(&mut self, alarm: &Alarm, _sender: Option<&StateRef>) -> bool {
    ///         self.alarms += 1;
    ///         alarm.0 > 2
    ///     }
    /// }
    ///
    /// let mut guard = Guard { alarms: 0 };
    /// let alarm = Alarm(3);
    /// let message = StateMessage::new(&alarm, None);
    /// assert_eq!(message.dispatch::<Alarm, _>(&mut guard), Some(true));
    ///
    /// let noise = "footsteps";
    /// let message = StateMessage::new(&noise, None);
    /// assert_eq!(message.dispatch::<Alarm, _>(&mut guard), None);
    /// assert_eq!(guard.alarms, 1);
    /// ```
    pub fn dispatch<M, R>(&self, receiver: &mut R) -> Option<bool>
    where
        M: 'static,
        R: Receives<M> + ?Sized,
    {
        let message = self.downcast::<M>()?;
        Some(receiver.receive(message, self.sender))
    }
}

impl fmt::Debug for StateMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMessage")
            .field("payload_type", &self.payload_type())
            .field(
                "sender",
                &self.sender.map(|sender| sender.borrow().name().to_string()),
            )
            .finish()
    }
}

/// Implement [`State::handle_message`] by dispatching to [`Receives`]
/// implementations, one per listed message type.
///
/// Types are tried in order; the first matching type answers. A payload
/// of an unlisted type is not handled.
///
/// # Example
///
/// ```
/// use mindstack::core::{Receives, State, StateRef};
/// use mindstack::receives;
///
/// struct Ping;
/// struct Pong;
///
/// struct Player {
///     pings: u32,
/// }
///
/// impl Receives<Ping> for Player {
///     fn receive(&mut self, _message: &Ping, _sender: Option<&StateRef>) -> bool {
///         self.pings += 1;
///         true
///     }
/// }
///
/// impl Receives<Pong> for Player {
///     fn receive(&mut self, _message: &Pong, _sender: Option<&StateRef>) -> bool {
///         false
///     }
/// }
///
/// impl State for Player {
///     receives!(Ping, Pong);
/// }
/// ```
///
/// [`State::handle_message`]: crate::core::State::handle_message
#[macro_export]
macro_rules! receives {
    ($($message:ty),+ $(,)?) => {
        fn handle_message(
            &mut self,
            message: &$crate::core::StateMessage<'_>,
            _context: &$crate::core::StateContext,
        ) -> bool {
            $(
                if let Some(handled) = message.dispatch::<$message, Self>(self) {
                    return handled;
                }
            )+
            false
        }
    };
}
