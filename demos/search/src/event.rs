//! Search events

use unistate::{Event, EventSummary, Generation};

#[derive(Event, Clone, Debug, PartialEq, Eq)]
#[event(infer_categories)]
pub enum SearchEvent {
    /// Search box text edited
    QueryChanged(String),

    // Results carry the generation they were started with
    SearchDidLoad {
        generation: Generation,
        results: Vec<String>,
    },
    SearchDidFail {
        generation: Generation,
        error: String,
    },

    ResultsDismissed,
}

impl EventSummary for SearchEvent {
    fn summary(&self) -> String {
        match self {
            SearchEvent::SearchDidLoad {
                generation,
                results,
            } => format!("SearchDidLoad({generation}, {} results)", results.len()),
            _ => format!("{:?}", self),
        }
    }
}
