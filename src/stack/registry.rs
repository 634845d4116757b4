//! Registered states, looked up by type.

use super::error::StackError;
use crate::core::{State, StateRef};
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type key naming a registered state.
///
/// # Example
///
/// ```rust
/// use mindstack::core::State;
/// use mindstack::StateKey;
///
/// struct Patrol;
/// impl State for Patrol {}
///
/// let key = StateKey::of::<Patrol>();
/// assert_eq!(key, StateKey::of::<Patrol>());
/// assert!(key.name().ends_with("Patrol"));
/// ```
#[derive(Clone, Copy)]
pub struct StateKey {
    id: TypeId,
    name: &'static str,
}

impl StateKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Rust type name of the key, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for StateKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StateKey {}

impl Hash for StateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateKey").field(&self.name).finish()
    }
}

/// Long-lived state instances keyed by their type.
///
/// Pushing by key hands out the registered instance itself; it is never
/// cloned.
#[derive(Default)]
pub(crate) struct StateRegistry {
    states: HashMap<StateKey, StateRef>,
}

impl StateRegistry {
    pub(crate) fn register<T: State>(&mut self, state: Rc<RefCell<T>>) -> Result<(), StackError> {
        let key = StateKey::of::<T>();
        if self.states.contains_key(&key) {
            return Err(StackError::AlreadyRegistered { name: key.name() });
        }
        self.states.insert(key, state);
        Ok(())
    }

    pub(crate) fn contains(&self, key: &StateKey) -> bool {
        self.states.contains_key(key)
    }

    pub(crate) fn resolve(&self, key: StateKey) -> Result<StateRef, StackError> {
        self.states
            .get(&key)
            .map(Rc::clone)
            .ok_or(StackError::Unregistered {
                names: vec![key.name()],
            })
    }

    /// Resolve every key, reporting all unregistered keys at once.
    ///
    /// Nothing is returned unless every key resolves.
    pub(crate) fn resolve_all(&self, keys: &[StateKey]) -> Result<Vec<StateRef>, StackError> {
        let checks: Vec<Validation<StateRef, NonEmptyVec<StateKey>>> = keys
            .iter()
            .map(|key| match self.states.get(key) {
                Some(state) => Validation::success(Rc::clone(state)),
                None => Validation::fail(*key),
            })
            .collect();

        match Validation::all_vec(checks) {
            Validation::Success(states) => Ok(states),
            Validation::Failure(missing) => Err(StackError::Unregistered {
                names: missing.iter().map(StateKey::name).collect(),
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }
}
