//! Search demo - search-as-you-type with stale result discard
//!
//! Every keystroke restarts the `search` operation in state and returns a
//! debounced `SearchEffect::Search` tagged with the new generation. Two
//! layers keep old answers out:
//! - the effect manager replaces the pending search, so completions from an
//!   older start are discarded before they reach the queue
//! - the reducer applies `SearchDidLoad` / `SearchDidFail` only for the
//!   operation's live generation

pub mod catalog;
pub mod effect;
pub mod event;
pub mod reducer;
pub mod state;

use std::time::Duration;

use unistate::{Driver, DriverConfig, EventFilter};

pub use catalog::{Catalog, SearchEffects, SearchError, MAX_QUERY_LEN, RESULT_LIMIT, SEARCH_KEY};
pub use effect::SearchEffect;
pub use event::SearchEvent;
pub use reducer::reduce;
pub use state::SearchState;

/// Quiet period before a search starts.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

pub type SearchDriver = Driver<SearchState, SearchEvent, SearchEffect>;

/// Driver with an empty search box.
pub fn build_driver(filter: EventFilter) -> SearchDriver {
    Driver::new(SearchState::default(), reduce)
        .with_config(DriverConfig::named("search").with_event_logging(filter))
}
