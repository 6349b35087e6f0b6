//! Pure transitions: `(state, event) -> next state + effects`
//!
//! A reducer never touches the state it is given. It either returns a brand
//! new state value or declares the event a no-op. Work that has to happen
//! outside the reducer (network calls, timers, disk) is described by effect
//! values that the driver hands to an effect handler afterwards.
//!
//! # Example
//!
//! ```
//! use unistate_core::reducer::Transition;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct State {
//!     loading: bool,
//! }
//!
//! #[derive(Debug, PartialEq)]
//! enum Effect {
//!     Fetch,
//! }
//!
//! fn on_refresh(state: &State) -> Transition<State, Effect> {
//!     if state.loading {
//!         return Transition::unchanged();
//!     }
//!     Transition::to_with(State { loading: true }, Effect::Fetch)
//! }
//!
//! let idle = State { loading: false };
//! let t = on_refresh(&idle);
//! assert_eq!(t.next, Some(State { loading: true }));
//! assert_eq!(t.effects, vec![Effect::Fetch]);
//!
//! let busy = State { loading: true };
//! assert!(!on_refresh(&busy).is_changed());
//! ```

/// Outcome of one reducer call.
///
/// `next == None` is the explicit no-op transition: the driver keeps the
/// current state instance and notifies nobody.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S, F> {
    /// Replacement state, if the event changed anything.
    pub next: Option<S>,
    /// Effects to start after the state has been stored.
    pub effects: Vec<F>,
}

impl<S, F> Default for Transition<S, F> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<S, F> Transition<S, F> {
    /// No state change and no effects.
    #[inline]
    pub fn unchanged() -> Self {
        Self {
            next: None,
            effects: vec![],
        }
    }

    /// Replace the state, no effects.
    #[inline]
    pub fn to(next: S) -> Self {
        Self {
            next: Some(next),
            effects: vec![],
        }
    }

    /// Replace the state and start one effect.
    #[inline]
    pub fn to_with(next: S, effect: F) -> Self {
        Self {
            next: Some(next),
            effects: vec![effect],
        }
    }

    /// Replace the state and start several effects.
    #[inline]
    pub fn to_with_many(next: S, effects: Vec<F>) -> Self {
        Self {
            next: Some(next),
            effects,
        }
    }

    /// Keep the state, start one effect.
    #[inline]
    pub fn effect(effect: F) -> Self {
        Self {
            next: None,
            effects: vec![effect],
        }
    }

    /// Keep the state, start several effects.
    #[inline]
    pub fn effects(effects: Vec<F>) -> Self {
        Self {
            next: None,
            effects,
        }
    }

    /// Add an effect to this transition.
    #[inline]
    pub fn with(mut self, effect: F) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether the transition replaces the state.
    #[inline]
    pub fn is_changed(&self) -> bool {
        self.next.is_some()
    }

    /// Whether there are any effects to start.
    #[inline]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    /// Split into the optional next state and the effects.
    #[inline]
    pub fn into_parts(self) -> (Option<S>, Vec<F>) {
        (self.next, self.effects)
    }
}

/// A reducer function.
///
/// Takes the current state by reference and an event by value and returns
/// the transition. Must be deterministic: no I/O, no clocks, no globals.
pub type ReducerFn<S, E, F> = fn(&S, E) -> Transition<S, F>;
