//! Core state unit types.
//!
//! This module contains the contract between the stack and the behaviors
//! it schedules:
//! - The `State` trait and its per-activation `StateContext`
//! - Typed message envelopes and the `Receives` capability
//! - Guard predicates for conditional states
//! - Bounded lifecycle history for diagnostics

mod guard;
mod history;
mod message;
mod state;

pub use guard::Guard;
pub use history::{LifecycleEvent, LifecycleHistory, LifecycleRecord};
pub use message::{Receives, StateMessage};
pub use state::{state_ref, State, StateContext, StateRef, StateStatus};
