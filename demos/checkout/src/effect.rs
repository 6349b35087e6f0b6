//! Effects - work the reducer asks for

/// Side effects returned by the checkout reducer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutEffect {
    /// Charge the card for the given total
    Charge { amount_cents: u64 },
}
