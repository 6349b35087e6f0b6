//! Search state

use unistate::Operation;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Text in the search box
    pub query: String,
    /// Latest search; its generation tags the request in flight
    pub search: Operation<Vec<String>>,
    /// Results on screen, kept while a newer search runs
    pub results: Vec<String>,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.search.is_running()
    }

    /// One-line rendering for the demo binary.
    pub fn status_line(&self) -> String {
        let status = if self.is_loading() {
            "searching".to_string()
        } else if let Some(error) = self.search.error() {
            format!("error: {error}")
        } else {
            format!("{} results", self.results.len())
        };
        format!(
            "query={:?} gen={} {status}",
            self.query,
            self.search.generation()
        )
    }
}
