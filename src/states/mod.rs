//! Ready-made state units.
//!
//! - [`FnState`]: a state assembled from closures
//! - [`Conditional`]: a state that pops once its guard fails
//! - [`SequenceState`]: a state stepping through numbered ticks

mod condition;
mod function;
mod sequence;

pub use condition::{Conditional, StateRefExt};
pub use function::FnState;
pub use sequence::SequenceState;
