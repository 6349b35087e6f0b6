//! Payment gateway client
//!
//! The reducer never sees the gateway. `PaymentEffects` turns a `Charge`
//! effect into a gateway call and maps the outcome back to a `PaymentDid*`
//! event, errors and panics included.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use unistate::{EffectContext, Overlap};

use crate::effect::CheckoutEffect;
use crate::event::CheckoutEvent;
use crate::state::Receipt;

/// Key of the in-flight charge.
pub const CHARGE_KEY: &str = "charge";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("card declined")]
    Declined,

    #[error("invalid amount: {0} cents")]
    InvalidAmount(u64),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Something that can charge a card.
pub trait PaymentGateway: Clone + Send + Sync + 'static {
    fn charge(
        &self,
        amount_cents: u64,
    ) -> impl Future<Output = Result<Receipt, PaymentError>> + Send + 'static;
}

/// In-process gateway with configurable latency and outcome.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    latency: Duration,
    decline: bool,
    issued: Arc<AtomicU64>,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl SimulatedGateway {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            decline: false,
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Decline every charge.
    pub fn declining(mut self) -> Self {
        self.decline = true;
        self
    }

    /// Number of charge attempts that reached the gateway.
    pub fn attempts(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for SimulatedGateway {
    fn charge(
        &self,
        amount_cents: u64,
    ) -> impl Future<Output = Result<Receipt, PaymentError>> + Send + 'static {
        let latency = self.latency;
        let decline = self.decline;
        let attempt = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        async move {
            if amount_cents == 0 {
                return Err(PaymentError::InvalidAmount(amount_cents));
            }
            tokio::time::sleep(latency).await;
            if decline {
                return Err(PaymentError::Declined);
            }
            Ok(Receipt {
                id: format!("rcpt-{attempt:04}"),
                amount_cents,
            })
        }
    }
}

/// Effect handler for the checkout driver.
#[derive(Debug, Clone)]
pub struct PaymentEffects<G> {
    gateway: G,
}

impl<G: PaymentGateway> PaymentEffects<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn handle(&self, effect: CheckoutEffect, ctx: &mut EffectContext<'_, CheckoutEvent>) {
        match effect {
            CheckoutEffect::Charge { amount_cents } => {
                let gateway = self.gateway.clone();
                let launch = ctx.effects().attempt(
                    CHARGE_KEY,
                    Overlap::Suppress,
                    async move {
                        gateway
                            .charge(amount_cents)
                            .await
                            .map(CheckoutEvent::PaymentDidSucceed)
                    },
                    |failure| CheckoutEvent::PaymentDidFail(failure.message().to_string()),
                );
                if !launch.is_started() {
                    tracing::debug!(
                        generation = %launch.generation(),
                        "charge already in flight; submit suppressed"
                    );
                }
            }
        }
    }
}
