//! Checkout - scripted unistate session
//!
//! Runs one checkout against a simulated gateway and prints every state the
//! driver publishes, followed by the event log.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p checkout-demo
//!
//! # Card gets declined
//! cargo run -p checkout-demo -- --decline
//!
//! # Trace only payment events
//! RUST_LOG=debug cargo run -p checkout-demo -- --log-include "Payment*"
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use unistate::EventFilter;

use checkout_demo::{
    build_driver, CheckoutEvent, CheckoutState, PaymentEffects, SimulatedGateway,
    DEFAULT_AMOUNT_CENTS,
};

/// Checkout - unistate payment flow demo
#[derive(Parser, Debug)]
#[command(name = "checkout")]
#[command(about = "Scripted checkout session on a unistate driver")]
struct Args {
    /// Make the simulated gateway decline every charge
    #[arg(long)]
    decline: bool,

    /// Order total in cents
    #[arg(long, default_value_t = DEFAULT_AMOUNT_CENTS)]
    amount: u64,

    /// Simulated gateway latency in milliseconds
    #[arg(long, default_value_t = 300)]
    latency_ms: u64,

    /// Cardholder name entered in the details step
    #[arg(long, default_value = "Ada Lovelace")]
    cardholder: String,

    /// Only trace events matching these patterns (comma-separated, supports *)
    #[arg(long)]
    log_include: Option<String>,

    /// Never trace events matching these patterns (comma-separated, supports *)
    #[arg(long)]
    log_exclude: Option<String>,

    /// Print the event log as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// A charge finished one way or the other.
fn is_settled(state: &CheckoutState) -> bool {
    !state.is_submitting && (state.receipt.is_some() || state.error.is_some())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let mut gateway = SimulatedGateway::new(Duration::from_millis(args.latency_ms));
    if args.decline {
        gateway = gateway.declining();
    }

    let filter = EventFilter::new(args.log_include.as_deref(), args.log_exclude.as_deref());
    let (driver, log) = build_driver(CheckoutState::default(), filter);
    let effects = PaymentEffects::new(gateway);
    let (handle, task) = driver.spawn(move |effect, ctx| effects.handle(effect, ctx));

    let (states_tx, mut states) = mpsc::unbounded_channel();
    let subscription = handle.subscribe(move |state: &Arc<CheckoutState>| {
        let _ = states_tx.send(Arc::clone(state));
    });

    handle.dispatch(CheckoutEvent::Appeared);
    handle.dispatch(CheckoutEvent::DetailsEntered {
        cardholder: args.cardholder.clone(),
        amount_cents: args.amount,
    });
    handle.dispatch(CheckoutEvent::SubmitTapped);
    // Impatient second tap; the reducer ignores it
    handle.dispatch(CheckoutEvent::SubmitTapped);

    let mut published = 0usize;
    while let Some(state) = states.recv().await {
        println!("[{published:>2}] {}", state.status_line());
        published += 1;

        if is_settled(&state) {
            if state.error.is_some() {
                handle.dispatch(CheckoutEvent::ErrorDismissed);
            }
            break;
        }
    }

    handle.shutdown();
    let final_state = task.await?;
    subscription.unsubscribe();

    while let Ok(state) = states.try_recv() {
        println!("[{published:>2}] {}", state.status_line());
        published += 1;
    }

    println!();
    println!("final: {}", serde_json::to_string(&*final_state)?);
    println!();

    let log = log.lock();
    if args.json {
        println!("{}", log.to_json()?);
    } else {
        for entry in log.entries() {
            let changed = match entry.state_changed {
                Some(true) => "changed",
                Some(false) => "ignored",
                None => "-",
            };
            println!(
                "#{:<3} {:>8} {:<8} {}",
                entry.sequence,
                entry.elapsed_display(),
                changed,
                entry.summary
            );
        }
    }

    Ok(())
}
