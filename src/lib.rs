//! Mindstack: A hierarchical, stack-based state machine engine
//!
//! Mindstack schedules units of behavior on a stack. The host calls
//! [`StateStack::tick`] once per frame; only the top state runs, and what
//! it returns tells the stack what to do next: keep running, pop itself,
//! push sub-states, or raise a message that travels down the chain.
//!
//! # Core Concepts
//!
//! - **State**: A unit of behavior with lifecycle callbacks via the `State` trait
//! - **Stack**: The scheduler that owns the active chain of slots
//! - **Events**: Pooled, versioned handles describing the next transition
//! - **Messages**: Typed payloads routed from the top of the chain down
//!
//! # Example
//!
//! ```rust
//! use mindstack::core::{state_ref, Receives, State, StateRef};
//! use mindstack::event::{EventHandle, TickContext};
//! use mindstack::{receives, StateStack};
//!
//! struct Noise;
//!
//! struct Patrol {
//!     alerts: u32,
//! }
//!
//! impl Receives<Noise> for Patrol {
//!     fn receive(&mut self, _noise: &Noise, _sender: Option<&StateRef>) -> bool {
//!         self.alerts += 1;
//!         true
//!     }
//! }
//!
//! impl State for Patrol {
//!     fn name(&self) -> &str {
//!         "Patrol"
//!     }
//!
//!     receives!(Noise);
//! }
//!
//! struct Listen;
//!
//! impl State for Listen {
//!     fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
//!         ctx.raise_message(Noise)
//!     }
//! }
//!
//! let patrol = std::rc::Rc::new(std::cell::RefCell::new(Patrol { alerts: 0 }));
//! let mut stack = StateStack::builder().history_limit(16).build().unwrap();
//! stack.push_state(patrol.clone());
//! stack.tick().unwrap();
//!
//! stack.push_state(state_ref(Listen));
//! stack.tick().unwrap();
//!
//! assert_eq!(patrol.borrow().alerts, 1);
//! assert_eq!(stack.process_count(), 1);
//! ```

pub mod builder;
pub mod core;
pub mod event;
pub mod stack;
pub mod states;

// Re-export commonly used types
pub use builder::{BuildError, StateStackBuilder};
pub use core::{state_ref, Guard, Receives, State, StateContext, StateRef, StateStatus};
pub use event::{EventHandle, EventKind, TickContext};
pub use stack::{RoutingPolicy, StackConfig, StackError, StateKey, StateStack, SubscriptionId};
