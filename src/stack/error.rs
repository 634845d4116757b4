//! Scheduler error types.

use crate::event::EventKind;
use thiserror::Error;

/// Programmer errors detected by the stack.
///
/// Every variant aborts the operation that detected it. An unhandled
/// message is not an error; see [`StateStack::raise_message`].
///
/// [`StateStack::raise_message`]: crate::stack::StateStack::raise_message
#[derive(Debug, Error)]
pub enum StackError {
    #[error("Stale {kind} event handle: minted at version {held}, instance is at version {current}")]
    StaleEvent {
        kind: EventKind,
        held: u32,
        current: u32,
    },

    #[error("{kind} event handle was minted by a different state stack")]
    ForeignEvent { kind: EventKind },

    #[error("Tick exceeded the iteration cap of {cap} chained transitions")]
    IterationCapExceeded { cap: usize },

    #[error("State type not registered: {}", .names.join(", "))]
    Unregistered { names: Vec<&'static str> },

    #[error("State type '{name}' is already registered")]
    AlreadyRegistered { name: &'static str },

    #[error("Nested state stack failed: {0}")]
    Nested(Box<StackError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_lists_every_name() {
        let error = StackError::Unregistered {
            names: vec!["Patrol", "Chase"],
        };
        assert_eq!(error.to_string(), "State type not registered: Patrol, Chase");
    }

    #[test]
    fn nested_wraps_inner_message() {
        let error = StackError::Nested(Box::new(StackError::IterationCapExceeded { cap: 2 }));
        assert_eq!(
            error.to_string(),
            "Nested state stack failed: Tick exceeded the iteration cap of 2 chained transitions"
        );
    }

    #[test]
    fn stale_event_names_kind() {
        let error = StackError::StaleEvent {
            kind: EventKind::PushSubState,
            held: 1,
            current: 2,
        };
        assert!(error.to_string().starts_with("Stale PushSubState event handle"));
    }
}
