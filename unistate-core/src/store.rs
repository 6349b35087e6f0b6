//! Centralized state store with reducer pattern

use std::sync::Arc;

use crate::event::Event;
use crate::reducer::ReducerFn;

/// Result of dispatching an event to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult<F> {
    /// Whether the reducer replaced the state.
    pub changed: bool,
    /// Effects to be started after dispatch.
    pub effects: Vec<F>,
}

impl<F> DispatchResult<F> {
    /// Returns true if there are any effects to process.
    #[inline]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// State container with Redux-like reducer pattern
///
/// The store owns the single slot holding the latest state. The slot is
/// swapped for a new `Arc` every time the reducer returns a next state; the
/// previous snapshot is never mutated, so readers holding an old `Arc` keep
/// a consistent view.
///
/// # Type Parameters
/// * `S` - The state type
/// * `E` - The event type (must implement `Event`)
/// * `F` - The effect descriptor type
///
/// # Example
/// ```ignore
/// #[derive(Clone, Default)]
/// struct Counter {
///     count: i32,
/// }
///
/// #[derive(Event, Clone, Debug)]
/// enum CounterEvent {
///     Increment,
/// }
///
/// fn reducer(state: &Counter, event: CounterEvent) -> Transition<Counter, ()> {
///     match event {
///         CounterEvent::Increment => Transition::to(Counter { count: state.count + 1 }),
///     }
/// }
///
/// let mut store = Store::new(Counter::default(), reducer);
/// store.dispatch(CounterEvent::Increment);
/// assert_eq!(store.state().count, 1);
/// ```
pub struct Store<S, E, F> {
    state: Arc<S>,
    version: u64,
    reducer: ReducerFn<S, E, F>,
}

impl<S, E: Event, F> Store<S, E, F> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: ReducerFn<S, E, F>) -> Self {
        Self {
            state: Arc::new(state),
            version: 0,
            reducer,
        }
    }

    /// Dispatch an event to the store
    ///
    /// The reducer is called with the current state and event. When it
    /// returns a next state, that state becomes current and the version
    /// advances by one.
    pub fn dispatch(&mut self, event: E) -> DispatchResult<F> {
        let (next, effects) = (self.reducer)(&self.state, event).into_parts();
        let changed = match next {
            Some(next) => {
                self.state = Arc::new(next);
                self.version += 1;
                true
            }
            None => false,
        };
        DispatchResult { changed, effects }
    }

    /// Get the current state snapshot
    pub fn state(&self) -> &Arc<S> {
        &self.state
    }

    /// Number of state replacements since creation
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Store with middleware support
///
/// Wraps a `Store` and allows middleware to intercept events
/// before and after they are processed by the reducer.
pub struct StoreWithMiddleware<S, E: Event, F, M: Middleware<E>> {
    store: Store<S, E, F>,
    middleware: M,
}

impl<S, E: Event, F, M: Middleware<E>> StoreWithMiddleware<S, E, F, M> {
    /// Create a new store with middleware
    pub fn new(state: S, reducer: ReducerFn<S, E, F>, middleware: M) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Dispatch an event through middleware and store
    pub fn dispatch(&mut self, event: E) -> DispatchResult<F> {
        self.middleware.before(&event);
        let result = self.store.dispatch(event.clone());
        self.middleware.after(&event, result.changed);
        result
    }

    /// Get the current state snapshot
    pub fn state(&self) -> &Arc<S> {
        self.store.state()
    }

    /// Number of state replacements since creation
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Get a reference to the middleware
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Get a mutable reference to the middleware
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }
}

/// Store interface used by [`Driver`](crate::driver::Driver).
pub trait DispatchStore<S, E: Event, F> {
    /// Dispatch an event and return the state change plus effects.
    fn dispatch(&mut self, event: E) -> DispatchResult<F>;
    /// Get the current state snapshot.
    fn state(&self) -> &Arc<S>;
    /// Number of state replacements since creation.
    fn version(&self) -> u64;
}

impl<S, E: Event, F> DispatchStore<S, E, F> for Store<S, E, F> {
    fn dispatch(&mut self, event: E) -> DispatchResult<F> {
        Store::dispatch(self, event)
    }

    fn state(&self) -> &Arc<S> {
        Store::state(self)
    }

    fn version(&self) -> u64 {
        Store::version(self)
    }
}

impl<S, E: Event, F, M: Middleware<E>> DispatchStore<S, E, F> for StoreWithMiddleware<S, E, F, M> {
    fn dispatch(&mut self, event: E) -> DispatchResult<F> {
        StoreWithMiddleware::dispatch(self, event)
    }

    fn state(&self) -> &Arc<S> {
        StoreWithMiddleware::state(self)
    }

    fn version(&self) -> u64 {
        StoreWithMiddleware::version(self)
    }
}

/// Middleware trait for intercepting events
///
/// Implement this trait to add logging, auditing, or other
/// cross-cutting concerns to your store.
pub trait Middleware<E: Event> {
    /// Called before the event is handed to the reducer
    fn before(&mut self, event: &E);

    /// Called after the event is processed by the reducer
    fn after(&mut self, event: &E, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<E: Event> Middleware<E> for NoopMiddleware {
    fn before(&mut self, _event: &E) {}
    fn after(&mut self, _event: &E, _state_changed: bool) {}
}

/// Middleware that logs events (for debugging)
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Create a logging middleware that logs both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<E: Event> Middleware<E> for LoggingMiddleware {
    fn before(&mut self, event: &E) {
        if self.log_before {
            tracing::debug!(event = %event.name(), "Dispatching event");
        }
    }

    fn after(&mut self, event: &E, state_changed: bool) {
        if self.log_after {
            tracing::debug!(
                event = %event.name(),
                state_changed = state_changed,
                "Event processed"
            );
        }
    }
}

/// Compose multiple middleware into a single middleware
pub struct ComposedMiddleware<E: Event> {
    middlewares: Vec<Box<dyn Middleware<E> + Send>>,
}

impl<E: Event> std::fmt::Debug for ComposedMiddleware<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<E: Event> Default for ComposedMiddleware<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> ComposedMiddleware<E> {
    /// Create a new composed middleware
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the composition
    pub fn add<M: Middleware<E> + Send + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }
}

impl<E: Event> Middleware<E> for ComposedMiddleware<E> {
    fn before(&mut self, event: &E) {
        for middleware in &mut self.middlewares {
            middleware.before(event);
        }
    }

    fn after(&mut self, event: &E, state_changed: bool) {
        // Reverse order for proper nesting
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(event, state_changed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::Transition;
    use std::sync::Mutex;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct TestState {
        counter: i32,
    }

    #[derive(Clone, Debug)]
    enum TestEvent {
        Increment,
        Decrement,
        NoOp,
    }

    impl Event for TestEvent {
        fn name(&self) -> &'static str {
            match self {
                TestEvent::Increment => "Increment",
                TestEvent::Decrement => "Decrement",
                TestEvent::NoOp => "NoOp",
            }
        }
    }

    #[derive(Debug, PartialEq)]
    enum TestEffect {
        Announce(i32),
    }

    fn test_reducer(state: &TestState, event: TestEvent) -> Transition<TestState, TestEffect> {
        match event {
            TestEvent::Increment => Transition::to(TestState {
                counter: state.counter + 1,
            }),
            TestEvent::Decrement => {
                let counter = state.counter - 1;
                Transition::to_with(TestState { counter }, TestEffect::Announce(counter))
            }
            TestEvent::NoOp => Transition::unchanged(),
        }
    }

    #[test]
    fn test_store_dispatch() {
        let mut store = Store::new(TestState::default(), test_reducer);

        assert!(store.dispatch(TestEvent::Increment).changed);
        assert_eq!(store.state().counter, 1);

        assert!(store.dispatch(TestEvent::Increment).changed);
        assert_eq!(store.state().counter, 2);

        let result = store.dispatch(TestEvent::Decrement);
        assert!(result.changed);
        assert_eq!(result.effects, vec![TestEffect::Announce(1)]);
        assert_eq!(store.state().counter, 1);
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn test_store_noop_keeps_snapshot() {
        let mut store = Store::new(TestState::default(), test_reducer);
        let before = Arc::clone(store.state());

        let result = store.dispatch(TestEvent::NoOp);

        assert!(!result.changed);
        assert!(!result.has_effects());
        assert!(Arc::ptr_eq(&before, store.state()));
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_old_snapshot_is_untouched() {
        let mut store = Store::new(TestState::default(), test_reducer);
        let before = Arc::clone(store.state());

        store.dispatch(TestEvent::Increment);

        assert_eq!(before.counter, 0);
        assert_eq!(store.state().counter, 1);
    }

    #[derive(Default)]
    struct CountingMiddleware {
        before_count: usize,
        after_count: usize,
        changed_count: usize,
    }

    impl<E: Event> Middleware<E> for CountingMiddleware {
        fn before(&mut self, _event: &E) {
            self.before_count += 1;
        }

        fn after(&mut self, _event: &E, state_changed: bool) {
            self.after_count += 1;
            if state_changed {
                self.changed_count += 1;
            }
        }
    }

    #[test]
    fn test_store_with_middleware() {
        let mut store = StoreWithMiddleware::new(
            TestState::default(),
            test_reducer,
            CountingMiddleware::default(),
        );

        store.dispatch(TestEvent::Increment);
        store.dispatch(TestEvent::NoOp);

        assert_eq!(store.middleware().before_count, 2);
        assert_eq!(store.middleware().after_count, 2);
        assert_eq!(store.middleware().changed_count, 1);
        assert_eq!(store.state().counter, 1);
    }

    struct Recording {
        label: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware<TestEvent> for Recording {
        fn before(&mut self, _event: &TestEvent) {
            self.calls.lock().unwrap().push(format!("before:{}", self.label));
        }

        fn after(&mut self, _event: &TestEvent, _state_changed: bool) {
            self.calls.lock().unwrap().push(format!("after:{}", self.label));
        }
    }

    #[test]
    fn test_composed_middleware_nests() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut composed = ComposedMiddleware::new();
        composed.add(Recording {
            label: "outer",
            calls: calls.clone(),
        });
        composed.add(Recording {
            label: "inner",
            calls: calls.clone(),
        });

        let mut store = StoreWithMiddleware::new(TestState::default(), test_reducer, composed);
        store.dispatch(TestEvent::Increment);

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["before:outer", "before:inner", "after:inner", "after:outer"]
        );
    }
}
