//! Transition requests and their versioned handles.
//!
//! A state's tick answers with an [`EventHandle`] naming the next action
//! for the stack: keep running, pop, push sub-states, or raise a message.
//!
//! # Pooling
//!
//! Requests that carry data are pooled per kind and reused in place, so a
//! steady-state tick does not allocate. Each pooled instance carries a
//! version that is bumped whenever it is recycled. A handle remembers the
//! version it was minted at, and the stack refuses a handle whose version
//! no longer matches, instead of applying whatever request now occupies
//! the instance.

mod context;
mod handle;
mod pool;
mod store;

pub use context::TickContext;
pub use handle::{EventHandle, EventKind};

pub(crate) use store::EventPool;
