//! Event traits for closed sets of reducer inputs

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for events that can be dispatched to a store
///
/// Events describe one discrete input: a user intent, a lifecycle signal,
/// or the completion of an effect. They should be:
/// - Clone: Events may be logged or inspected by middleware before the reducer consumes them
/// - Debug: For logging and test assertions
/// - Send + 'static: Effects deliver them from other tasks
///
/// Use `#[derive(Event)]` from `unistate-macros` to auto-implement this trait.
pub trait Event: Clone + Debug + Send + 'static {
    /// Get the event name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Events grouped by naming convention.
///
/// Generated by `#[derive(Event)]` with `#[event(infer_categories)]`:
/// `PaymentSubmit` and `PaymentDidFail` both land in the `"payment"` category.
pub trait EventCategory: Event {
    /// Enum of every category the event type declares
    type Category: Copy + Eq + Hash + Debug;

    /// Category name, or `None` for uncategorized events
    fn category(&self) -> Option<&'static str>;

    /// Category as an enum value
    fn category_enum(&self) -> Self::Category;
}

/// Short human-readable rendering used by the event log.
///
/// The default falls back to `Debug`. Override it for events carrying large
/// payloads:
///
/// ```ignore
/// impl EventSummary for SearchEvent {
///     fn summary(&self) -> String {
///         match self {
///             SearchEvent::SearchDidLoad { results, .. } => {
///                 format!("SearchDidLoad({} results)", results.len())
///             }
///             _ => format!("{:?}", self),
///         }
///     }
/// }
/// ```
pub trait EventSummary: Event {
    /// Summary for log display
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
