//! The state stack scheduler.
//!
//! A [`StateStack`] keeps an ordered chain of slots, each binding a state
//! to its lifecycle status. Only the top slot ticks. Whatever its tick
//! returns is interpreted right away: pops, pushes and messages reshape
//! the chain before the tick ends.
//!
//! # Registered states
//!
//! States registered with [`StateStack::register_state`] can be pushed by
//! type through a [`StateKey`]. The registered instance itself is pushed
//! every time, so its fields survive across activations.
//!
//! # Errors
//!
//! Misuse such as returning a stale event handle, pushing an unregistered
//! type or running away inside one tick is reported as a [`StackError`].

mod config;
mod error;
mod machine;
mod nested;
mod registry;
mod routing;
mod slot;

pub use config::{RoutingPolicy, StackConfig};
pub use error::StackError;
pub use machine::StateStack;
pub use registry::StateKey;
pub use routing::{SubscriptionId, UnhandledListener};
