//! Search effects

use unistate::Generation;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchEffect {
    /// Run a debounced query, tagged with the operation's generation
    Search { query: String, generation: Generation },
    /// Drop whatever search is pending or in flight
    CancelSearch,
}
