//! Test utilities for reducers and effect handlers
//!
//! - [`ReducerHarness`]: drive a reducer synchronously and collect its effects
//! - [`assert_deterministic`]: check that a reducer call is repeatable
//! - [`EffectHarness`]: run an effect handler without a driver and await the
//!   events it produces
//! - Assertion macros over collected effects or events
//!
//! # Example
//!
//! ```ignore
//! use unistate::testing::ReducerHarness;
//! use unistate::{assert_effect, assert_no_effect};
//!
//! let mut harness = ReducerHarness::new(CheckoutState::default(), reduce);
//!
//! assert!(harness.dispatch(CheckoutEvent::SubmitTapped));
//! assert_effect!(harness.drain_effects(), CheckoutEffect::Charge { .. });
//!
//! // Second tap while submitting is ignored
//! assert!(!harness.dispatch(CheckoutEvent::SubmitTapped));
//! assert_no_effect!(harness.drain_effects(), CheckoutEffect::Charge { .. });
//! ```

use std::fmt::Debug;

use tokio::sync::mpsc;

use crate::dispatcher::{self, Command, Dispatcher};
use crate::driver::EffectContext;
use crate::effect::{Completion, EffectManager};
use crate::event::{Event, EventCategory};
use crate::reducer::ReducerFn;

#[cfg(feature = "subscriptions")]
use crate::subscriptions::Subscriptions;

/// Synchronous harness around a reducer.
///
/// Applies events the way the driver does (replacing state only when the
/// reducer returns one) and keeps every effect for inspection.
pub struct ReducerHarness<S, E, F> {
    state: S,
    reducer: ReducerFn<S, E, F>,
    effects: Vec<F>,
    changes: usize,
}

impl<S, E: Event, F> ReducerHarness<S, E, F> {
    pub fn new(state: S, reducer: ReducerFn<S, E, F>) -> Self {
        Self {
            state,
            reducer,
            effects: Vec::new(),
            changes: 0,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Apply one event. Returns whether the state was replaced.
    pub fn dispatch(&mut self, event: E) -> bool {
        let (next, effects) = (self.reducer)(&self.state, event).into_parts();
        self.effects.extend(effects);
        match next {
            Some(next) => {
                self.state = next;
                self.changes += 1;
                true
            }
            None => false,
        }
    }

    /// Apply events in order. Returns how many replaced the state.
    pub fn dispatch_all(&mut self, events: impl IntoIterator<Item = E>) -> usize {
        events
            .into_iter()
            .map(|event| self.dispatch(event))
            .filter(|changed| *changed)
            .count()
    }

    /// Take the effects collected so far.
    pub fn drain_effects(&mut self) -> Vec<F> {
        std::mem::take(&mut self.effects)
    }

    /// Number of state replacements so far.
    pub fn changes(&self) -> usize {
        self.changes
    }

    /// Apply an event that must be a no-op: state kept, no effects.
    ///
    /// # Panics
    ///
    /// Panics if the reducer returned a next state or any effect.
    pub fn assert_ignored(&mut self, event: E)
    where
        F: Debug,
    {
        let name = event.name();
        let (next, effects) = (self.reducer)(&self.state, event).into_parts();
        assert!(next.is_none(), "expected `{name}` to leave the state unchanged");
        assert!(
            effects.is_empty(),
            "expected `{name}` to start no effects, got {effects:?}"
        );
    }
}

impl<S: Default, E: Event, F> ReducerHarness<S, E, F> {
    pub fn with_default(reducer: ReducerFn<S, E, F>) -> Self {
        Self::new(S::default(), reducer)
    }
}

/// Call the reducer twice with the same input and compare the transitions.
///
/// # Panics
///
/// Panics if the two calls disagree.
pub fn assert_deterministic<S, E, F>(reducer: ReducerFn<S, E, F>, state: &S, event: E)
where
    S: PartialEq + Debug,
    E: Event,
    F: PartialEq + Debug,
{
    let name = event.name();
    let first = reducer(state, event.clone());
    let second = reducer(state, event);
    assert_eq!(first, second, "reducer is not deterministic for `{name}`");
}

/// Keep only the events of one category.
pub fn in_category<E: EventCategory>(events: &[E], category: &str) -> Vec<E> {
    events
        .iter()
        .filter(|event| event.category() == Some(category))
        .cloned()
        .collect()
}

/// Runs effect handlers outside a driver.
///
/// Events emitted directly through the context are collected by
/// [`drain_emitted`](Self::drain_emitted); events produced by effects are
/// awaited with [`next_event`](Self::next_event), with stale completions
/// discarded as the driver would.
pub struct EffectHarness<E: Event> {
    effects: EffectManager<E>,
    completions: mpsc::UnboundedReceiver<Completion<E>>,
    dispatcher: Dispatcher<E>,
    emitted: mpsc::UnboundedReceiver<Command<E>>,
    #[cfg(feature = "subscriptions")]
    subscriptions: Subscriptions<E>,
}

impl<E: Event> Default for EffectHarness<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> EffectHarness<E> {
    pub fn new() -> Self {
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let (dispatcher, emitted) = dispatcher::channel();
        Self {
            effects: EffectManager::new(completion_tx),
            completions,
            #[cfg(feature = "subscriptions")]
            subscriptions: Subscriptions::new(dispatcher.clone()),
            dispatcher,
            emitted,
        }
    }

    pub fn effects(&mut self) -> &mut EffectManager<E> {
        &mut self.effects
    }

    /// Context handed to effect handlers.
    #[cfg(feature = "subscriptions")]
    pub fn context(&mut self) -> EffectContext<'_, E> {
        EffectContext::new(&mut self.effects, &self.dispatcher, &mut self.subscriptions)
    }

    /// Context handed to effect handlers.
    #[cfg(not(feature = "subscriptions"))]
    pub fn context(&mut self) -> EffectContext<'_, E> {
        EffectContext::new(&mut self.effects, &self.dispatcher)
    }

    /// Run `handler` on one effect.
    pub fn handle<F, H>(&mut self, handler: &mut H, effect: F)
    where
        H: FnMut(F, &mut EffectContext<'_, E>),
    {
        let mut ctx = self.context();
        handler(effect, &mut ctx);
    }

    /// Events emitted through the context or by subscriptions so far.
    pub fn drain_emitted(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Ok(command) = self.emitted.try_recv() {
            if let Command::Dispatch(event) = command {
                events.push(event);
            }
        }
        events
    }

    /// Wait for the next event from a live effect.
    ///
    /// Returns `None` once no effect is running. Wrap in a timeout when an
    /// effect may never finish.
    pub async fn next_event(&mut self) -> Option<E> {
        while !self.effects.is_empty() {
            let completion = self.completions.recv().await?;
            if let Some(event) = self.effects.settle(completion) {
                return Some(event);
            }
        }
        None
    }
}

/// Pause the tokio clock for the current test runtime.
#[cfg(feature = "testing-time")]
pub fn pause_time() {
    tokio::time::pause();
}

/// Move the paused clock forward and let woken tasks run.
#[cfg(feature = "testing-time")]
pub async fn advance_time(duration: std::time::Duration) {
    tokio::time::advance(duration).await;
    tokio::task::yield_now().await;
}

/// Assert that an effect matching the pattern is present.
///
/// # Example
///
/// ```ignore
/// let effects = harness.drain_effects();
/// assert_effect!(effects, Effect::Charge { amount_cents: 1999 });
/// assert_effect!(effects, Effect::Search { query, .. } if query == "rust");
/// ```
#[macro_export]
macro_rules! assert_effect {
    ($items:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $items.iter().any(|item| matches!(item, $pattern $(if $guard)?)),
            "expected an item matching `{}`, got: {:?}",
            stringify!($pattern),
            $items
        );
    };
}

/// Assert that no effect matches the pattern.
#[macro_export]
macro_rules! assert_no_effect {
    ($items:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$items.iter().any(|item| matches!(item, $pattern $(if $guard)?)),
            "expected no item matching `{}`, got: {:?}",
            stringify!($pattern),
            $items
        );
    };
}

/// First effect matching the pattern, if any.
#[macro_export]
macro_rules! find_effect {
    ($items:expr, $pattern:pat $(if $guard:expr)?) => {
        $items.iter().find(|item| matches!(item, $pattern $(if $guard)?))
    };
}

/// Number of effects matching the pattern.
#[macro_export]
macro_rules! count_effects {
    ($items:expr, $pattern:pat $(if $guard:expr)?) => {
        $items
            .iter()
            .filter(|item| matches!(item, $pattern $(if $guard)?))
            .count()
    };
}
