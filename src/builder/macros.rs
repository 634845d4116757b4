//! Macros for ergonomic stack construction.

/// Build an array of [`StateKey`]s from state types.
///
/// # Example
///
/// ```
/// use mindstack::core::State;
/// use mindstack::{state_keys, StateKey};
///
/// struct Patrol;
/// impl State for Patrol {}
///
/// struct Chase;
/// impl State for Chase {}
///
/// let keys = state_keys![Chase, Patrol];
/// assert_eq!(keys[1], StateKey::of::<Patrol>());
/// ```
///
/// [`StateKey`]: crate::stack::StateKey
#[macro_export]
macro_rules! state_keys {
    ($($state:ty),* $(,)?) => {
        [$($crate::stack::StateKey::of::<$state>()),*]
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;
    use crate::stack::StateKey;

    struct Wander;
    impl State for Wander {}

    struct Flee;
    impl State for Flee {}

    #[test]
    fn keys_keep_declaration_order() {
        let keys = state_keys![Flee, Wander];

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], StateKey::of::<Flee>());
        assert_eq!(keys[1], StateKey::of::<Wander>());
    }

    #[test]
    fn empty_key_list() {
        let keys: [StateKey; 0] = state_keys![];
        assert!(keys.is_empty());
    }
}
