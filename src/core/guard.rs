//! Guard predicates that keep a state alive.
//!
//! A guard is a boolean function checked before a conditional state ticks.
//! When it fails the state pops itself instead of ticking.

/// Predicate that decides whether a conditional state may keep running.
///
/// # Example
///
/// ```rust
/// use mindstack::core::Guard;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let alive = Rc::new(Cell::new(true));
/// let flag = alive.clone();
/// let guard = Guard::new(move || flag.get());
///
/// assert!(guard.check());
/// alive.set(false);
/// assert!(!guard.check());
/// ```
pub struct Guard {
    predicate: Box<dyn Fn() -> bool>,
}

impl Guard {
    /// Create a guard from a predicate.
    ///
    /// The predicate is evaluated once per tick and should be cheap.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that always passes.
    pub fn always() -> Self {
        Self::new(|| true)
    }

    /// Evaluate the predicate.
    pub fn check(&self) -> bool {
        (self.predicate)()
    }

    /// Combine with another guard; both must pass.
    pub fn and(self, other: Guard) -> Self {
        Self::new(move || self.check() && other.check())
    }

    /// Invert the guard.
    pub fn negate(self) -> Self {
        Self::new(move || !self.check())
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
