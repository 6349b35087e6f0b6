//! unistate: unidirectional state management with an async effect driver
//!
//! Like Redux/Elm: state is an immutable value, every change goes through a
//! pure reducer, and async work is described by effects that report back as
//! events. One driver task applies events in arrival order.
//!
//! # Example
//! ```ignore
//! use unistate::prelude::*;
//!
//! #[derive(Event, Clone, Debug)]
//! #[event(infer_categories)]
//! enum CheckoutEvent {
//!     SubmitTapped,
//!     PaymentDidSucceed(Receipt),
//!     PaymentDidFail(String),
//! }
//!
//! fn reduce(state: &Checkout, event: CheckoutEvent) -> Transition<Checkout, CheckoutEffect> {
//!     match event {
//!         CheckoutEvent::SubmitTapped if state.is_submitting => Transition::unchanged(),
//!         CheckoutEvent::SubmitTapped => Transition::to_with(
//!             Checkout { is_submitting: true, ..state.clone() },
//!             CheckoutEffect::Charge { amount_cents: state.total_cents },
//!         ),
//!         // ...
//!     }
//! }
//! ```

// Re-export everything from core
pub use unistate_core::*;

// Re-export derive macros
pub use unistate_macros::Event;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use unistate_core::{Event, EventCategory, EventSummary};

    // Reducer and store
    pub use unistate_core::{
        ComposedMiddleware, DispatchResult, LoggingMiddleware, Middleware, NoopMiddleware, Store,
        StoreWithMiddleware, Transition,
    };

    // Effects and guards
    pub use unistate_core::{
        EffectFailure, EffectKey, EffectManager, Generation, Launch, Operation, Overlap, Phase,
    };

    // Driver
    pub use unistate_core::{
        DispatchError, Dispatcher, Driver, DriverConfig, DriverHandle, EffectContext, Subscription,
    };

    // Logging
    pub use unistate_core::{EventFilter, EventLogConfig, EventLoggerMiddleware};

    #[cfg(feature = "subscriptions")]
    pub use unistate_core::{SubKey, Subscriptions};

    // Derive macros
    pub use unistate_macros::Event;
}
