//! Builder for constructing state stacks.

use crate::builder::error::BuildError;
use crate::core::{State, StateRef};
use crate::stack::{RoutingPolicy, StackConfig, StackError, StateStack};
use std::cell::RefCell;
use std::rc::Rc;

type Registration = Box<dyn FnOnce(&mut StateStack) -> Result<(), StackError>>;

/// Builder for constructing state stacks with a fluent API.
///
/// # Example
///
/// ```rust
/// use mindstack::core::State;
/// use mindstack::{RoutingPolicy, StateStack};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// struct Patrol;
/// impl State for Patrol {}
///
/// let mut stack = StateStack::builder()
///     .tick_until_continue(true)
///     .max_iterations(8)
///     .routing(RoutingPolicy::Peek)
///     .register(Rc::new(RefCell::new(Patrol)))
///     .build()
///     .unwrap();
///
/// stack.push_registered::<Patrol>().unwrap();
/// assert_eq!(stack.config().max_iterations, 8);
/// ```
pub struct StateStackBuilder {
    config: StackConfig,
    registrations: Vec<Registration>,
    initial: Vec<StateRef>,
}

impl StateStackBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: StackConfig::default(),
            registrations: Vec::new(),
            initial: Vec::new(),
        }
    }

    /// Start from a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(Self::new().config(StackConfig::from_json(json)?))
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: StackConfig) -> Self {
        self.config = config;
        self
    }

    /// Slots and pooled events reserved up front.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn tick_until_continue(mut self, enabled: bool) -> Self {
        self.config.tick_until_continue = enabled;
        self
    }

    /// Cap on chained steps per tick; zero disables it.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn routing(mut self, routing: RoutingPolicy) -> Self {
        self.config.routing = routing;
        self
    }

    /// Keep the last `limit` lifecycle records.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Register a long-lived instance to be pushed by type.
    pub fn register<T: State>(mut self, state: Rc<RefCell<T>>) -> Self {
        self.registrations
            .push(Box::new(move |stack: &mut StateStack| stack.register_state(state)));
        self
    }

    /// Push a state once the stack is built. Later calls end up on top.
    pub fn initial(mut self, state: StateRef) -> Self {
        self.initial.push(state);
        self
    }

    /// Build the state stack.
    /// Returns an error if a state type was registered more than once.
    pub fn build(self) -> Result<StateStack, BuildError> {
        let mut stack = StateStack::with_config(self.config);

        let mut duplicates = Vec::new();
        for registration in self.registrations {
            if let Err(StackError::AlreadyRegistered { name }) = registration(&mut stack) {
                duplicates.push(name);
            }
        }
        if !duplicates.is_empty() {
            return Err(BuildError::DuplicateRegistration { names: duplicates });
        }

        for state in self.initial {
            stack.push_state(state);
        }
        Ok(stack)
    }
}

impl Default for StateStackBuilder {
    fn default() -> Self {
        Self::new()
    }
}
