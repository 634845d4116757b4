//! Stack configuration.

use serde::{Deserialize, Serialize};

/// What routing does with a slot that does not handle a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Pop the slot and offer the message to the one beneath.
    #[default]
    PopUnhandled,
    /// Offer the message to the slot beneath without popping anything.
    Peek,
}

/// Configuration for a [`StateStack`](crate::stack::StateStack).
///
/// Missing fields take their defaults when deserialized.
///
/// # Example
///
/// ```rust
/// use mindstack::{RoutingPolicy, StackConfig};
///
/// let config = StackConfig::from_json(r#"{ "tick_until_continue": true, "routing": "peek" }"#)
///     .unwrap();
///
/// assert!(config.tick_until_continue);
/// assert_eq!(config.routing, RoutingPolicy::Peek);
/// assert_eq!(config.max_iterations, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Slots and pooled events reserved up front.
    pub capacity: usize,

    /// Keep stepping within one tick until a state answers Continue.
    pub tick_until_continue: bool,

    /// Most steps one tick may chain while `tick_until_continue` is on.
    /// Zero disables the cap.
    pub max_iterations: usize,

    /// Handling of slots that do not handle a routed message.
    pub routing: RoutingPolicy,

    /// Lifecycle records kept for diagnostics. Zero disables recording.
    pub history_limit: usize,
}

impl StackConfig {
    pub const DEFAULT_CAPACITY: usize = 5;
    pub const DEFAULT_MAX_ITERATIONS: usize = 64;

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Cap on chained steps, or `None` when disabled.
    pub fn iteration_cap(&self) -> Option<usize> {
        (self.max_iterations > 0).then_some(self.max_iterations)
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            tick_until_continue: false,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            routing: RoutingPolicy::PopUnhandled,
            history_limit: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = StackConfig::from_json("{}").unwrap();
        assert_eq!(config, StackConfig::default());
    }

    #[test]
    fn zero_disables_iteration_cap() {
        let config = StackConfig {
            max_iterations: 0,
            ..StackConfig::default()
        };
        assert_eq!(config.iteration_cap(), None);
        assert_eq!(StackConfig::default().iteration_cap(), Some(64));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(StackConfig::from_json(r#"{ "capacity": "many" }"#).is_err());
    }

    #[test]
    fn config_roundtrip_serialization() {
        let config = StackConfig {
            capacity: 8,
            tick_until_continue: true,
            max_iterations: 3,
            routing: RoutingPolicy::Peek,
            history_limit: 16,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(StackConfig::from_json(&json).unwrap(), config);
    }
}
