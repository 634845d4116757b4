//! Builder API for ergonomic state stack construction.
//!
//! This module provides the fluent stack builder, macros, and shortcuts
//! for the small states most stacks need.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::StateStackBuilder;

use crate::core::{state_ref, Guard, StateRef};
use crate::states::{FnState, StateRefExt};

/// Create a state that runs `action` on its first tick and pops.
///
/// # Example
///
/// ```
/// use mindstack::builder::run_once;
/// use mindstack::StateStack;
///
/// let mut stack = StateStack::new();
/// stack.push_state(run_once("Greet", || println!("hello")));
/// stack.tick().unwrap();
/// assert!(stack.is_empty());
/// ```
pub fn run_once<F>(name: &str, mut action: F) -> StateRef
where
    F: FnMut() + 'static,
{
    state_ref(FnState::new(name).tick(move |ctx| {
        action();
        ctx.pop()
    }))
}

/// Create a state that keeps running while `predicate` holds.
///
/// # Example
///
/// ```
/// use mindstack::builder::run_while;
/// use mindstack::StateStack;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let fuel = Rc::new(Cell::new(2));
/// let tank = fuel.clone();
/// let mut stack = StateStack::new();
/// stack.push_state(run_while("Drive", move || {
///     tank.set(tank.get() - 1);
///     tank.get() > 0
/// }));
///
/// stack.tick().unwrap();
/// stack.tick().unwrap();
/// assert!(stack.is_empty());
/// ```
pub fn run_while<F>(name: &str, predicate: F) -> StateRef
where
    F: Fn() -> bool + 'static,
{
    state_ref(FnState::new(name)).with_condition(Guard::new(predicate))
}
