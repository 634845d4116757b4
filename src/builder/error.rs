//! Build errors for the state stack builder.

use thiserror::Error;

/// Errors that can occur when building a state stack.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("State types registered more than once: {}", .names.join(", "))]
    DuplicateRegistration { names: Vec<&'static str> },

    #[error("Invalid stack configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
