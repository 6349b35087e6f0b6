//! Checkout state

use serde::Serialize;

/// Default order total used by the demo.
pub const DEFAULT_AMOUNT_CENTS: u64 = 1999;

/// Which screen of the checkout flow is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    EnterDetails,
    Review,
    Confirmed,
}

/// Proof of a successful charge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub id: String,
    pub amount_cents: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutState {
    /// A charge is in flight; further submits are ignored
    pub is_submitting: bool,
    /// Last payment error, shown until dismissed
    pub error: Option<String>,
    pub step: Step,
    pub receipt: Option<Receipt>,
    pub cardholder: Option<String>,
    pub amount_cents: u64,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self {
            is_submitting: false,
            error: None,
            step: Step::EnterDetails,
            receipt: None,
            cardholder: None,
            amount_cents: DEFAULT_AMOUNT_CENTS,
        }
    }
}

impl CheckoutState {
    /// Whether a submit would start a charge.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting && self.step != Step::Confirmed && self.amount_cents > 0
    }

    /// One-line rendering for the demo binary.
    pub fn status_line(&self) -> String {
        let mut line = format!("{:?}", self.step);
        if self.is_submitting {
            line.push_str(" | submitting");
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" | error: {error}"));
        }
        if let Some(receipt) = &self.receipt {
            line.push_str(&format!(" | receipt {}", receipt.id));
        }
        line
    }
}
