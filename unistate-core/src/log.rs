//! Event logging with pattern-based filtering and in-memory history
//!
//! Event names are matched against glob patterns to decide what gets logged.
//! Logged events go to `tracing` and, optionally, to a bounded [`EventLog`]
//! that can be inspected while the driver runs or exported as JSON.
//!
//! # Example
//!
//! ```
//! use unistate_core::log::{EventFilter, EventLogConfig, EventLoggerMiddleware};
//!
//! // Everything except timer ticks, tracing only
//! let tracing_only = EventLoggerMiddleware::new(EventFilter::default());
//!
//! // Keep the last 50 payment events in memory as well
//! let filter = EventFilter::new(Some("Payment*"), None);
//! let middleware = EventLoggerMiddleware::with_log(EventLogConfig::new(50, filter));
//! let history = middleware.log_handle().expect("storage enabled");
//! assert!(history.lock().is_empty());
//! # let _ = tracing_only;
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::event::EventSummary;
use crate::store::Middleware;

fn default_excludes() -> Vec<String> {
    vec!["Tick".to_string()]
}

fn split_patterns(patterns: &str) -> Vec<String> {
    patterns
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Include/exclude filter over event names.
///
/// Patterns support `*` (any run of characters) and `?` (one character):
///
/// - `Payment*` matches PaymentDidFail, PaymentDidSucceed
/// - `*Did*` matches every completion event
/// - `Tick` matches only Tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilter {
    /// If non-empty, only names matching one of these are logged
    pub include: Vec<String>,
    /// Names matching any of these are skipped (checked after `include`)
    pub exclude: Vec<String>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: default_excludes(),
        }
    }
}

impl EventFilter {
    /// Build a filter from comma-separated pattern lists.
    ///
    /// `None` for `include` admits everything; `None` for `exclude` keeps the
    /// default exclusion of `Tick`.
    ///
    /// ```
    /// use unistate_core::log::EventFilter;
    ///
    /// let filter = EventFilter::new(Some("Search*, SubmitTapped"), Some("SearchDidFail"));
    /// assert!(filter.allows("SearchDidLoad"));
    /// assert!(filter.allows("SubmitTapped"));
    /// assert!(!filter.allows("SearchDidFail"));
    /// assert!(!filter.allows("Appeared"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include: include.map(split_patterns).unwrap_or_default(),
            exclude: exclude.map(split_patterns).unwrap_or_else(default_excludes),
        }
    }

    /// Build a filter from explicit pattern lists.
    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// A filter that admits every event.
    pub fn allow_all() -> Self {
        Self::with_patterns(Vec::new(), Vec::new())
    }

    /// Whether an event with this name passes the filter.
    pub fn allows(&self, name: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| glob_match(p, name)) {
            return false;
        }
        !self.exclude.iter().any(|p| glob_match(p, name))
    }
}

/// One recorded event.
#[derive(Debug, Clone, Serialize)]
pub struct EventLogEntry {
    /// Event name
    pub name: &'static str,
    /// Rendering from [`EventSummary::summary`]
    pub summary: String,
    /// Position in the log, counting filtered-in events only
    pub sequence: u64,
    /// Whether the reducer replaced the state; `None` until it has run
    pub state_changed: Option<bool>,
    #[serde(skip)]
    recorded_at: Instant,
}

impl EventLogEntry {
    pub fn new(name: &'static str, summary: String, sequence: u64) -> Self {
        Self {
            name,
            summary,
            sequence,
            state_changed: None,
            recorded_at: Instant::now(),
        }
    }

    /// Time since the event was recorded.
    pub fn elapsed(&self) -> Duration {
        self.recorded_at.elapsed()
    }

    /// Elapsed time as `"150ms"` or `"2.3s"`.
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

/// Settings for an [`EventLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// Maximum number of entries kept
    pub capacity: usize,
    /// Which events are recorded
    pub filter: EventFilter,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: EventFilter::default(),
        }
    }
}

impl EventLogConfig {
    pub fn new(capacity: usize, filter: EventFilter) -> Self {
        Self { capacity, filter }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }
}

/// Bounded history of dispatched events, oldest dropped first.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<EventLogEntry>,
    config: EventLogConfig,
    next_sequence: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(EventLogConfig::default())
    }
}

impl EventLog {
    pub fn new(config: EventLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// New empty log behind a shared lock.
    pub fn shared(config: EventLogConfig) -> SharedEventLog {
        Arc::new(Mutex::new(Self::new(config)))
    }

    /// Record an event if the filter admits it.
    pub fn record<E: EventSummary>(&mut self, event: &E) -> Option<&EventLogEntry> {
        let name = event.name();
        if self.config.capacity == 0 || !self.config.filter.allows(name) {
            return None;
        }

        let entry = EventLogEntry::new(name, event.summary(), self.next_sequence);
        self.next_sequence += 1;
        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.entries.back()
    }

    /// Mark whether the newest entry changed the state.
    pub fn mark_last(&mut self, state_changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(state_changed);
        }
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &EventLogEntry> {
        self.entries.iter()
    }

    /// The newest `count` entries, newest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &EventLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn config(&self) -> &EventLogConfig {
        &self.config
    }

    /// Entries as a JSON array, oldest first.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

/// Event log shared between the driver task and readers.
pub type SharedEventLog = Arc<Mutex<EventLog>>;

/// Middleware that logs dispatched events.
///
/// Always logs admitted events through `tracing::debug!`. With
/// [`with_log`](Self::with_log) it also records them in a shared
/// [`EventLog`] that stays readable from outside the store.
#[derive(Debug, Clone)]
pub struct EventLoggerMiddleware {
    filter: EventFilter,
    log: Option<SharedEventLog>,
    recorded_last: bool,
    active: bool,
}

impl EventLoggerMiddleware {
    /// Tracing only.
    pub fn new(filter: EventFilter) -> Self {
        Self {
            filter,
            log: None,
            recorded_last: false,
            active: true,
        }
    }

    /// Tracing plus in-memory history.
    pub fn with_log(config: EventLogConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            log: Some(Arc::new(Mutex::new(EventLog::new(config)))),
            recorded_last: false,
            active: true,
        }
    }

    /// Tracing plus recording into an existing history.
    pub fn with_shared_log(filter: EventFilter, log: SharedEventLog) -> Self {
        Self {
            filter,
            log: Some(log),
            recorded_last: false,
            active: true,
        }
    }

    /// Enable or disable the middleware; inactive middleware does nothing.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Shared handle to the history, if storage is enabled.
    pub fn log_handle(&self) -> Option<SharedEventLog> {
        self.log.clone()
    }
}

impl<E: EventSummary> Middleware<E> for EventLoggerMiddleware {
    fn before(&mut self, event: &E) {
        if !self.active {
            return;
        }

        let name = event.name();
        if self.filter.allows(name) {
            tracing::debug!(event = %name, "event");
        }

        self.recorded_last = match &self.log {
            Some(log) => log.lock().record(event).is_some(),
            None => false,
        };
    }

    fn after(&mut self, _event: &E, state_changed: bool) {
        if !self.active || !self.recorded_last {
            return;
        }
        if let Some(log) = &self.log {
            log.lock().mark_last(state_changed);
        }
    }
}

/// Glob matching with `*` (zero or more characters) and `?` (exactly one).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                // Let the last star swallow one more character
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    #[derive(Clone, Debug)]
    enum TestEvent {
        Tick,
        SubmitTapped,
        PaymentDidFail(String),
    }

    impl Event for TestEvent {
        fn name(&self) -> &'static str {
            match self {
                TestEvent::Tick => "Tick",
                TestEvent::SubmitTapped => "SubmitTapped",
                TestEvent::PaymentDidFail(_) => "PaymentDidFail",
            }
        }
    }

    impl EventSummary for TestEvent {
        fn summary(&self) -> String {
            match self {
                TestEvent::PaymentDidFail(reason) => format!("PaymentDidFail({reason})"),
                other => other.name().to_string(),
            }
        }
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("Tick", "Tick"));
        assert!(!glob_match("Tick", "TickTock"));
        assert!(glob_match("Payment*", "PaymentDidFail"));
        assert!(glob_match("Payment*", "Payment"));
        assert!(!glob_match("Payment*", "RetryPayment"));
        assert!(glob_match("*Did*", "SearchDidLoad"));
        assert!(glob_match("Tick?", "Ticks"));
        assert!(!glob_match("Tick?", "Tick"));
        assert!(glob_match("Search*Did*", "SearchResultsDidLoad"));
        assert!(glob_match("*a*b", "xaab"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_filter_include_and_exclude() {
        let filter = EventFilter::new(Some("*Did*"), Some("*DidFail"));
        assert!(filter.allows("SearchDidLoad"));
        assert!(!filter.allows("PaymentDidFail"));
        assert!(!filter.allows("SubmitTapped"));
    }

    #[test]
    fn test_filter_default_excludes_tick() {
        let filter = EventFilter::default();
        assert!(!filter.allows("Tick"));
        assert!(filter.allows("SubmitTapped"));
        assert!(EventFilter::allow_all().allows("Tick"));
        assert_eq!(EventFilter::new(None, None), filter);
    }

    #[test]
    fn test_filter_ignores_blank_patterns() {
        let filter = EventFilter::new(Some(" , Submit*,"), Some(""));
        assert_eq!(filter.include, vec!["Submit*".to_string()]);
        assert!(filter.exclude.is_empty());
    }

    #[test]
    fn test_log_records_and_filters() {
        let mut log = EventLog::default();
        assert!(log.record(&TestEvent::Tick).is_none());

        let entry = log.record(&TestEvent::SubmitTapped).unwrap();
        assert_eq!(entry.name, "SubmitTapped");
        assert_eq!(entry.sequence, 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_log_capacity_drops_oldest() {
        let mut log = EventLog::new(EventLogConfig::new(2, EventFilter::allow_all()));
        for _ in 0..3 {
            log.record(&TestEvent::SubmitTapped);
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries().next().unwrap().sequence, 1);

        let recent: Vec<_> = log.recent(5).map(|e| e.sequence).collect();
        assert_eq!(recent, vec![2, 1]);
    }

    #[test]
    fn test_log_to_json() {
        let mut log = EventLog::default();
        log.record(&TestEvent::PaymentDidFail("card declined".into()));
        log.mark_last(true);

        let json: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["name"], "PaymentDidFail");
        assert_eq!(json[0]["summary"], "PaymentDidFail(card declined)");
        assert_eq!(json[0]["state_changed"], true);
    }

    #[test]
    fn test_middleware_marks_only_recorded_events() {
        let mut middleware = EventLoggerMiddleware::with_log(EventLogConfig::default());
        let log = middleware.log_handle().unwrap();

        middleware.before(&TestEvent::SubmitTapped);
        middleware.after(&TestEvent::SubmitTapped, true);

        // Filtered out; must not overwrite the previous entry
        middleware.before(&TestEvent::Tick);
        middleware.after(&TestEvent::Tick, false);

        let log = log.lock();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries().next().unwrap().state_changed, Some(true));
    }

    #[test]
    fn test_shared_log_records_with_its_own_filter() {
        let log = EventLog::shared(EventLogConfig::new(8, EventFilter::allow_all()));
        let mut middleware =
            EventLoggerMiddleware::with_shared_log(EventFilter::default(), Arc::clone(&log));

        middleware.before(&TestEvent::Tick);
        middleware.after(&TestEvent::Tick, false);

        let log = log.lock();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries().next().unwrap().name, "Tick");
    }

    #[test]
    fn test_inactive_middleware_records_nothing() {
        let mut middleware =
            EventLoggerMiddleware::with_log(EventLogConfig::default()).active(false);
        middleware.before(&TestEvent::SubmitTapped);
        middleware.after(&TestEvent::SubmitTapped, true);

        assert!(middleware.log_handle().unwrap().lock().is_empty());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: EventLogConfig = serde_json::from_str(r#"{"capacity": 5}"#).unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.filter, EventFilter::default());
    }
}
