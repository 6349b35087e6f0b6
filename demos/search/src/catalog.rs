//! In-memory search backend and the effect handler that calls it

use std::sync::Arc;
use std::time::Duration;

use unistate::{EffectContext, EffectKey};

use crate::effect::SearchEffect;
use crate::event::SearchEvent;

/// Key shared by every search start; a new one replaces the pending one.
pub const SEARCH_KEY: &str = "search";

/// Longest query the catalog accepts.
pub const MAX_QUERY_LEN: usize = 64;

/// Results returned per query.
pub const RESULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("catalog offline")]
    Offline,

    #[error("query too long: {0} characters")]
    QueryTooLong(usize),
}

/// Crate names with a simulated lookup latency.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Arc<[String]>,
    latency: Duration,
    offline: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            [
                "clap",
                "parking_lot",
                "proc-macro2",
                "quote",
                "rust-analyzer",
                "rustls",
                "rustyline",
                "serde",
                "serde_json",
                "syn",
                "thiserror",
                "tokio",
                "tokio-stream",
                "tokio-util",
                "tracing",
                "tracing-subscriber",
            ],
            Duration::from_millis(150),
        )
    }
}

impl Catalog {
    pub fn new<I, T>(entries: I, latency: Duration) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
            latency,
            offline: false,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every lookup.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Case-insensitive substring match, sorted, at most [`RESULT_LIMIT`] items.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        tokio::time::sleep(self.latency).await;

        if self.offline {
            return Err(SearchError::Offline);
        }
        let len = query.chars().count();
        if len > MAX_QUERY_LEN {
            return Err(SearchError::QueryTooLong(len));
        }

        let needle = query.trim().to_lowercase();
        let mut matches: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort();
        matches.truncate(RESULT_LIMIT);
        Ok(matches)
    }
}

/// Effect handler for the search driver.
#[derive(Debug, Clone)]
pub struct SearchEffects {
    catalog: Catalog,
    debounce: Duration,
}

impl SearchEffects {
    pub fn new(catalog: Catalog, debounce: Duration) -> Self {
        Self { catalog, debounce }
    }

    pub fn handle(&self, effect: SearchEffect, ctx: &mut EffectContext<'_, SearchEvent>) {
        match effect {
            SearchEffect::Search { query, generation } => {
                let catalog = self.catalog.clone();
                ctx.effects().debounce(SEARCH_KEY, self.debounce, async move {
                    match catalog.search(&query).await {
                        Ok(results) => SearchEvent::SearchDidLoad {
                            generation,
                            results,
                        },
                        Err(e) => SearchEvent::SearchDidFail {
                            generation,
                            error: e.to_string(),
                        },
                    }
                });
            }
            SearchEffect::CancelSearch => {
                ctx.effects().cancel(&EffectKey::new(SEARCH_KEY));
            }
        }
    }
}
