//! Event handles returned from `State::on_tick`.

use std::any::TypeId;
use std::fmt;

/// The closed set of requests a tick can make of the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Keep the current state running.
    Continue,
    /// Pop the current state.
    Pop,
    /// Push one state, optionally popping the current one first.
    PushSubState,
    /// Push a sequence of states, first element on top.
    PushSubStates,
    /// Push a registered state by type.
    PushRegisteredState,
    /// Push several registered states by type, first key on top.
    PushRegisteredStates,
    /// Route a message with the current state as sender.
    RaiseMessage,
    /// A nested stack failed inside its tick.
    Failure,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Location of a pooled event instance and the version it was minted at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ticket {
    pub(crate) owner: u64,
    pub(crate) index: u32,
    pub(crate) version: u32,
    pub(crate) payload: Option<TypeId>,
}

/// Opaque, copyable reference to a pooled transition request.
///
/// A handle is only meaningful as the return value of the tick that
/// produced it. Once the stack consumes it, or the tick ends without
/// returning it, the pooled instance is recycled and the handle goes
/// stale; returning a stale handle later fails with
/// [`StackError::StaleEvent`](crate::stack::StackError::StaleEvent).
///
/// `Continue` and `Pop` carry no payload and are plain constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventHandle {
    kind: EventKind,
    ticket: Option<Ticket>,
}

impl EventHandle {
    /// Keep ticking the current state.
    pub const CONTINUE: EventHandle = EventHandle {
        kind: EventKind::Continue,
        ticket: None,
    };

    /// Pop the current state.
    pub const POP: EventHandle = EventHandle {
        kind: EventKind::Pop,
        ticket: None,
    };

    pub(crate) fn pooled(kind: EventKind, ticket: Ticket) -> Self {
        Self {
            kind,
            ticket: Some(ticket),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Version of the pooled instance at the time the handle was minted.
    pub fn version(&self) -> Option<u32> {
        self.ticket.map(|ticket| ticket.version)
    }

    pub fn is_continue(&self) -> bool {
        self.kind == EventKind::Continue
    }

    pub(crate) fn ticket(&self) -> Option<Ticket> {
        self.ticket
    }
}
