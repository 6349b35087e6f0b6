//! Core traits and types for unistate
//!
//! This crate provides a unidirectional state container: a pure reducer
//! computes each next state from the current one and an event, and a single
//! driver task serializes events, publishes states and runs effects.
//!
//! # Core Concepts
//!
//! - **Event**: closed enum of everything that can happen
//! - **Reducer**: `fn(&State, Event) -> Transition<State, Effect>`, no I/O
//! - **Store**: owns the current state and applies the reducer
//! - **Driver**: queue consumer that owns the store and the effects
//! - **EffectManager**: keyed async work with overlap policy and stale-result discard
//! - **Operation**: reducer-side guard against double starts and late results
//!
//! # Basic Example
//!
//! ```
//! use unistate_core::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! enum CounterEvent {
//!     Increment,
//!     Reset,
//! }
//!
//! impl Event for CounterEvent {
//!     fn name(&self) -> &'static str {
//!         match self {
//!             CounterEvent::Increment => "Increment",
//!             CounterEvent::Reset => "Reset",
//!         }
//!     }
//! }
//!
//! fn reducer(count: &u32, event: CounterEvent) -> Transition<u32, ()> {
//!     match event {
//!         CounterEvent::Increment => Transition::to(count + 1),
//!         CounterEvent::Reset if *count == 0 => Transition::unchanged(),
//!         CounterEvent::Reset => Transition::to(0),
//!     }
//! }
//!
//! let mut store = Store::new(0, reducer);
//! assert!(store.dispatch(CounterEvent::Increment).changed);
//! assert!(store.dispatch(CounterEvent::Reset).changed);
//! assert!(!store.dispatch(CounterEvent::Reset).changed);
//! assert_eq!(**store.state(), 0);
//! assert_eq!(store.version(), 2);
//! ```
//!
//! # Async Work
//!
//! Reducers never await. They return effect descriptors, and the driver
//! hands each one to an effect handler that starts the real work:
//!
//! 1. **Intent events** change state and describe work (e.g. `SubmitTapped`
//!    sets `is_submitting` and returns `Effect::Charge`)
//! 2. **Result events** carry the outcome back (e.g. `PaymentDidSucceed`,
//!    `PaymentDidFail`)
//!
//! Results re-enter through the same queue as every other event, so the
//! reducer sees them one at a time and in order. With
//! `#[event(infer_categories)]`, `PaymentSubmit` and `PaymentDidFail` both
//! land in category `"payment"`.

pub mod config;
pub mod dispatcher;
pub mod driver;
pub mod effect;
pub mod event;
pub mod guard;
pub mod log;
pub mod observe;
pub mod reducer;
pub mod store;
#[cfg(feature = "subscriptions")]
pub mod subscriptions;
pub mod testing;

// Core trait exports
pub use event::{Event, EventCategory, EventSummary};
pub use reducer::{ReducerFn, Transition};

// Store exports
pub use store::{
    ComposedMiddleware, DispatchResult, DispatchStore, LoggingMiddleware, Middleware,
    NoopMiddleware, Store, StoreWithMiddleware,
};

// Effect exports
pub use effect::{Completion, EffectFailure, EffectKey, EffectManager, Generation, Launch, Overlap};
pub use guard::{Operation, Phase};

// Driver exports
pub use config::{ConfigError, DriverConfig};
pub use dispatcher::{DispatchError, Dispatcher};
pub use driver::{Driver, DriverHandle, EffectContext};
pub use observe::{StateCell, Subscription};

// Logging exports
pub use log::{
    glob_match, EventFilter, EventLog, EventLogConfig, EventLogEntry, EventLoggerMiddleware,
    SharedEventLog,
};

// Subscription exports (requires "subscriptions" feature)
#[cfg(feature = "subscriptions")]
pub use subscriptions::{SubKey, Subscriptions};

// Testing exports
pub use testing::{assert_deterministic, EffectHarness, ReducerHarness};

#[cfg(feature = "testing-time")]
pub use testing::{advance_time, pause_time};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::DriverConfig;
    pub use crate::driver::{Driver, DriverHandle, EffectContext};
    pub use crate::effect::{EffectFailure, EffectKey, EffectManager, Generation, Launch, Overlap};
    pub use crate::event::{Event, EventCategory, EventSummary};
    pub use crate::guard::{Operation, Phase};
    pub use crate::observe::Subscription;
    pub use crate::reducer::Transition;
    pub use crate::store::{
        ComposedMiddleware, DispatchResult, LoggingMiddleware, Middleware, NoopMiddleware, Store,
        StoreWithMiddleware,
    };
    #[cfg(feature = "subscriptions")]
    pub use crate::subscriptions::{SubKey, Subscriptions};
}
