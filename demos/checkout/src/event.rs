//! Events - everything that can happen during checkout
//!
//! Intent events come from the user, `PaymentDid*` events come back from
//! the charge effect through the same queue.

use unistate::Event;

use crate::state::Receipt;

#[derive(Event, Clone, Debug, PartialEq)]
#[event(infer_categories, summary)]
pub enum CheckoutEvent {
    /// Screen became visible
    Appeared,

    /// Card details filled in
    DetailsEntered {
        cardholder: String,
        amount_cents: u64,
    },

    /// Pay button pressed
    SubmitTapped,

    // ===== Async results =====
    PaymentDidSucceed(Receipt),
    PaymentDidFail(String),

    ErrorDismissed,
}
