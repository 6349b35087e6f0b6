//! Checkout reducer
//!
//! Every guard lives here: a second submit while one is in flight, results
//! that arrive when nothing was submitted, and dismissing an error that is
//! not shown all come back as `Transition::unchanged()`.

use unistate::Transition;

use crate::effect::CheckoutEffect;
use crate::event::CheckoutEvent;
use crate::state::{CheckoutState, Step};

pub fn reduce(
    state: &CheckoutState,
    event: CheckoutEvent,
) -> Transition<CheckoutState, CheckoutEffect> {
    match event {
        CheckoutEvent::Appeared => {
            // Coming back after a completed purchase starts a new order
            if state.step != Step::Confirmed {
                return Transition::unchanged();
            }
            Transition::to(CheckoutState::default())
        }

        CheckoutEvent::DetailsEntered {
            cardholder,
            amount_cents,
        } => {
            if state.is_submitting || state.step == Step::Confirmed {
                return Transition::unchanged();
            }
            Transition::to(CheckoutState {
                cardholder: Some(cardholder),
                amount_cents,
                step: Step::Review,
                error: None,
                ..state.clone()
            })
        }

        CheckoutEvent::SubmitTapped => {
            if !state.can_submit() {
                return Transition::unchanged();
            }
            Transition::to_with(
                CheckoutState {
                    is_submitting: true,
                    error: None,
                    ..state.clone()
                },
                CheckoutEffect::Charge {
                    amount_cents: state.amount_cents,
                },
            )
        }

        CheckoutEvent::PaymentDidSucceed(receipt) => {
            if !state.is_submitting {
                return Transition::unchanged();
            }
            Transition::to(CheckoutState {
                is_submitting: false,
                step: Step::Confirmed,
                receipt: Some(receipt),
                ..state.clone()
            })
        }

        CheckoutEvent::PaymentDidFail(error) => {
            if !state.is_submitting {
                return Transition::unchanged();
            }
            Transition::to(CheckoutState {
                is_submitting: false,
                error: Some(error),
                ..state.clone()
            })
        }

        CheckoutEvent::ErrorDismissed => {
            if state.error.is_none() {
                return Transition::unchanged();
            }
            Transition::to(CheckoutState {
                error: None,
                ..state.clone()
            })
        }
    }
}
