//! Search - types a query one character at a time
//!
//! Each keystroke is a `QueryChanged` event. With the default timings only
//! the last few keystrokes survive the debounce, and only the newest search
//! is allowed to update the results.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p search-demo -- --query tokio
//!
//! # Watch superseded searches being discarded
//! RUST_LOG=debug cargo run -p search-demo -- --keystroke-ms 300
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use unistate::EventFilter;

use search_demo::{build_driver, Catalog, SearchEffects, SearchEvent, SearchState};

/// Search - unistate search-as-you-type demo
#[derive(Parser, Debug)]
#[command(name = "search")]
#[command(about = "Types a query into a unistate-driven search box")]
struct Args {
    /// Text to type
    #[arg(long, short, default_value = "tokio")]
    query: String,

    /// Delay between keystrokes in milliseconds
    #[arg(long, default_value_t = 80)]
    keystroke_ms: u64,

    /// Quiet period before a search starts, in milliseconds
    #[arg(long, default_value_t = 250)]
    debounce_ms: u64,

    /// Simulated catalog latency in milliseconds
    #[arg(long, default_value_t = 150)]
    latency_ms: u64,

    /// Make every lookup fail
    #[arg(long)]
    offline: bool,

    /// Only trace events matching these patterns (comma-separated, supports *)
    #[arg(long)]
    log_include: Option<String>,

    /// Never trace events matching these patterns (comma-separated, supports *)
    #[arg(long)]
    log_exclude: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Give up waiting for results after this long.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let mut catalog = Catalog::default().with_latency(Duration::from_millis(args.latency_ms));
    if args.offline {
        catalog = catalog.offline();
    }

    let filter = EventFilter::new(args.log_include.as_deref(), args.log_exclude.as_deref());
    let effects = SearchEffects::new(catalog, Duration::from_millis(args.debounce_ms));
    let (handle, task) =
        build_driver(filter).spawn(move |effect, ctx| effects.handle(effect, ctx));

    let (states_tx, mut states) = mpsc::unbounded_channel();
    let subscription = handle.subscribe(move |state: &Arc<SearchState>| {
        let _ = states_tx.send(Arc::clone(state));
    });

    let mut typed = String::new();
    for ch in args.query.chars() {
        typed.push(ch);
        handle.dispatch(SearchEvent::QueryChanged(typed.clone()));
        tokio::time::sleep(Duration::from_millis(args.keystroke_ms)).await;
    }

    let settled = tokio::time::timeout(SETTLE_TIMEOUT, async {
        while let Some(state) = states.recv().await {
            println!("{}", state.status_line());
            if state.query == args.query && state.search.is_settled() {
                return Some(state);
            }
        }
        None
    })
    .await
    .ok()
    .flatten();

    match settled {
        Some(state) => {
            println!();
            for (rank, name) in state.results.iter().enumerate() {
                println!("{:>2}. {name}", rank + 1);
            }
            handle.dispatch(SearchEvent::ResultsDismissed);
        }
        None => tracing::warn!(query = %args.query, "search did not settle"),
    }

    handle.shutdown();
    let final_state = task.await?;
    subscription.unsubscribe();
    tracing::info!(status = %final_state.status_line(), "search finished");

    Ok(())
}
