//! Checkout demo - payment submission with unistate
//!
//! Shows the whole loop on a small flow:
//! 1. `SubmitTapped` flips `is_submitting` and returns `CheckoutEffect::Charge`
//! 2. The driver hands the effect to [`PaymentEffects`], which calls the gateway
//! 3. The outcome re-enters as `PaymentDidSucceed` / `PaymentDidFail`
//!
//! A second tap while a charge is in flight is ignored twice over: the
//! reducer returns `Transition::unchanged()` and the effect runs with
//! `Overlap::Suppress`.

pub mod effect;
pub mod event;
pub mod gateway;
pub mod reducer;
pub mod state;

use unistate::{
    Driver, DriverConfig, EventFilter, EventLog, EventLogConfig, EventLoggerMiddleware,
    SharedEventLog, StoreWithMiddleware,
};

pub use effect::CheckoutEffect;
pub use event::CheckoutEvent;
pub use gateway::{PaymentEffects, PaymentError, PaymentGateway, SimulatedGateway, CHARGE_KEY};
pub use reducer::reduce;
pub use state::{CheckoutState, Receipt, Step, DEFAULT_AMOUNT_CENTS};

/// Events kept in the demo's history.
pub const EVENT_LOG_CAPACITY: usize = 64;

/// Store type used by the checkout driver.
pub type CheckoutStore =
    StoreWithMiddleware<CheckoutState, CheckoutEvent, CheckoutEffect, EventLoggerMiddleware>;

/// Driver type used by the demo binary and tests.
pub type CheckoutDriver = Driver<CheckoutState, CheckoutEvent, CheckoutEffect, CheckoutStore>;

/// Build a checkout driver that records admitted events in a shared log.
///
/// Every event is recorded; `filter` only decides what is traced.
pub fn build_driver(state: CheckoutState, filter: EventFilter) -> (CheckoutDriver, SharedEventLog) {
    let log = EventLog::shared(EventLogConfig::new(EVENT_LOG_CAPACITY, EventFilter::allow_all()));
    let middleware = EventLoggerMiddleware::with_shared_log(filter.clone(), log.clone());
    let store = StoreWithMiddleware::new(state, reduce, middleware);
    let driver = Driver::from_store(store)
        .with_config(DriverConfig::named("checkout").with_event_logging(filter));
    (driver, log)
}
