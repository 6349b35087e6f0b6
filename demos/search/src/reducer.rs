//! Search reducer
//!
//! Each keystroke restarts the search operation. Results are applied only
//! when they carry the operation's live generation, so an answer to an old
//! query can never overwrite the results of a newer one.

use unistate::Transition;

use crate::effect::SearchEffect;
use crate::event::SearchEvent;
use crate::state::SearchState;

pub fn reduce(state: &SearchState, event: SearchEvent) -> Transition<SearchState, SearchEffect> {
    match event {
        SearchEvent::QueryChanged(query) => {
            // Resubmitting the same query only retries a failed search
            if query == state.query && state.search.error().is_none() {
                return Transition::unchanged();
            }

            if query.trim().is_empty() {
                let search = state
                    .search
                    .cancel()
                    .or_else(|| state.search.acknowledge())
                    .unwrap_or_else(|| state.search.clone());
                return Transition::to_with(
                    SearchState {
                        query,
                        search,
                        results: Vec::new(),
                    },
                    SearchEffect::CancelSearch,
                );
            }

            let (search, generation) = state.search.restart();
            Transition::to_with(
                SearchState {
                    query: query.clone(),
                    search,
                    ..state.clone()
                },
                SearchEffect::Search { query, generation },
            )
        }

        SearchEvent::SearchDidLoad {
            generation,
            results,
        } => match state.search.succeed(generation, results.clone()) {
            Some(search) => Transition::to(SearchState {
                search,
                results,
                ..state.clone()
            }),
            None => Transition::unchanged(),
        },

        SearchEvent::SearchDidFail { generation, error } => {
            match state.search.fail(generation, error) {
                Some(search) => Transition::to(SearchState {
                    search,
                    ..state.clone()
                }),
                None => Transition::unchanged(),
            }
        }

        SearchEvent::ResultsDismissed => match state.search.acknowledge() {
            Some(search) => Transition::to(SearchState {
                search,
                results: Vec::new(),
                ..state.clone()
            }),
            None => Transition::unchanged(),
        },
    }
}
