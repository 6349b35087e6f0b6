//! The driver: single consumer that owns the store
//!
//! A [`Driver`] runs as one task. It takes events from a queue fed by any
//! number of [`DriverHandle`]s, applies them to the store one at a time,
//! publishes every new state, and hands the reducer's effect descriptors to
//! an effect handler. Effect results come back as completions and go through
//! the same loop, so reducer calls never overlap.
//!
//! # Example
//!
//! ```ignore
//! let driver = Driver::new(State::default(), reducer)
//!     .with_config(DriverConfig::named("checkout"));
//!
//! let (handle, task) = driver.spawn(move |effect, ctx| match effect {
//!     Effect::Charge { amount_cents } => {
//!         let gateway = gateway.clone();
//!         let _ = ctx.effects().attempt(
//!             "charge",
//!             Overlap::Suppress,
//!             async move { gateway.charge(amount_cents).await.map(Event::PaymentDidSucceed) },
//!             |failure| Event::PaymentDidFail(failure.message().to_string()),
//!         );
//!     }
//! });
//!
//! let _sub = handle.subscribe(|state| println!("{state:?}"));
//! handle.dispatch(Event::SubmitTapped);
//! handle.shutdown();
//! let final_state = task.await?;
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::DriverConfig;
use crate::dispatcher::{self, Command, DispatchError, Dispatcher};
use crate::effect::{Completion, EffectManager};
use crate::event::Event;
use crate::observe::{StateCell, Subscription};
use crate::reducer::ReducerFn;
use crate::store::{DispatchStore, Store};

#[cfg(feature = "subscriptions")]
use crate::subscriptions::Subscriptions;

/// Context passed to effect handlers.
pub struct EffectContext<'a, E> {
    effects: &'a mut EffectManager<E>,
    dispatcher: &'a Dispatcher<E>,
    #[cfg(feature = "subscriptions")]
    subscriptions: &'a mut Subscriptions<E>,
}

impl<'a, E: Event> EffectContext<'a, E> {
    pub(crate) fn new(
        effects: &'a mut EffectManager<E>,
        dispatcher: &'a Dispatcher<E>,
        #[cfg(feature = "subscriptions")] subscriptions: &'a mut Subscriptions<E>,
    ) -> Self {
        Self {
            effects,
            dispatcher,
            #[cfg(feature = "subscriptions")]
            subscriptions,
        }
    }

    /// Start, replace or cancel effects.
    pub fn effects(&mut self) -> &mut EffectManager<E> {
        self.effects
    }

    /// Queue an event behind everything already dispatched.
    pub fn emit(&self, event: E) {
        self.dispatcher.dispatch(event);
    }

    /// A dispatcher to move into code that outlives the handler call.
    pub fn dispatcher(&self) -> &Dispatcher<E> {
        self.dispatcher
    }

    /// Manage long-lived event sources.
    #[cfg(feature = "subscriptions")]
    pub fn subscriptions(&mut self) -> &mut Subscriptions<E> {
        self.subscriptions
    }
}

/// Owner of the store and the effect lifecycle.
///
/// Build it, grab handles, then [`run`](Self::run) it on a task (or call
/// [`spawn`](Self::spawn)). The loop ends on [`DriverHandle::shutdown`].
/// Dropping every handle does not stop it.
pub struct Driver<S, E, F, St = Store<S, E, F>> {
    store: St,
    cell: Arc<StateCell<S>>,
    dispatcher: Dispatcher<E>,
    commands: mpsc::UnboundedReceiver<Command<E>>,
    completions: mpsc::UnboundedReceiver<Completion<E>>,
    effects: EffectManager<E>,
    #[cfg(feature = "subscriptions")]
    subscriptions: Subscriptions<E>,
    stopped: CancellationToken,
    config: DriverConfig,
    _effect: PhantomData<fn() -> F>,
}

impl<S, E: Event, F> Driver<S, E, F, Store<S, E, F>> {
    /// Create a driver from initial state and reducer.
    pub fn new(state: S, reducer: ReducerFn<S, E, F>) -> Self {
        Self::from_store(Store::new(state, reducer))
    }
}

impl<S, E, F, St> Driver<S, E, F, St>
where
    E: Event,
    St: DispatchStore<S, E, F>,
{
    /// Create a driver around an existing store, e.g. one with middleware.
    pub fn from_store(store: St) -> Self {
        let (dispatcher, commands) = dispatcher::channel();
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let cell = Arc::new(StateCell::new(Arc::clone(store.state()), store.version()));

        Self {
            store,
            cell,
            #[cfg(feature = "subscriptions")]
            subscriptions: Subscriptions::new(dispatcher.clone()),
            dispatcher,
            commands,
            completions,
            effects: EffectManager::new(completion_tx),
            stopped: CancellationToken::new(),
            config: DriverConfig::default(),
            _effect: PhantomData,
        }
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// A handle for dispatching, reading and observing.
    pub fn handle(&self) -> DriverHandle<S, E> {
        DriverHandle {
            dispatcher: self.dispatcher.clone(),
            cell: Arc::clone(&self.cell),
            stopped: self.stopped.clone(),
            name: Arc::from(self.config.name.as_str()),
        }
    }

    /// Queue an event before the loop starts.
    pub fn enqueue(&self, event: E) {
        self.dispatcher.dispatch(event);
    }

    /// Current state held by the store.
    pub fn state(&self) -> &Arc<S> {
        self.store.state()
    }

    /// Effects started so far, e.g. to start work before the loop runs.
    pub fn effects(&mut self) -> &mut EffectManager<E> {
        &mut self.effects
    }

    #[cfg(feature = "subscriptions")]
    pub fn subscriptions(&mut self) -> &mut Subscriptions<E> {
        &mut self.subscriptions
    }

    /// Run the loop until shutdown and return the final state.
    pub async fn run<H>(mut self, mut handle_effect: H) -> Arc<S>
    where
        H: FnMut(F, &mut EffectContext<'_, E>),
    {
        tracing::info!(
            driver = %self.config.name,
            version = self.store.version(),
            "driver started"
        );

        loop {
            tokio::select! {
                Some(completion) = self.completions.recv() => {
                    if let Some(event) = self.effects.settle(completion) {
                        self.apply(event, &mut handle_effect);
                    }
                }

                command = self.commands.recv() => match command {
                    Some(Command::Dispatch(event)) => self.apply(event, &mut handle_effect),
                    Some(Command::Shutdown) | None => break,
                },
            }
        }

        self.teardown()
    }

    /// Spawn the loop on the current runtime.
    pub fn spawn<H>(self, handle_effect: H) -> (DriverHandle<S, E>, JoinHandle<Arc<S>>)
    where
        S: Send + Sync + 'static,
        F: 'static,
        St: Send + 'static,
        H: FnMut(F, &mut EffectContext<'_, E>) + Send + 'static,
    {
        let handle = self.handle();
        let task = tokio::spawn(self.run(handle_effect));
        (handle, task)
    }

    fn apply<H>(&mut self, event: E, handle_effect: &mut H)
    where
        H: FnMut(F, &mut EffectContext<'_, E>),
    {
        let name = event.name();
        if self.config.logs(name) {
            tracing::debug!(driver = %self.config.name, event = name, "applying event");
        }

        let result = self.store.dispatch(event);
        if result.changed {
            let version = self.store.version();
            tracing::trace!(driver = %self.config.name, event = name, version, "state replaced");
            self.cell.publish(Arc::clone(self.store.state()), version);
        }

        if result.has_effects() {
            let mut ctx = self.effect_context();
            for effect in result.effects {
                handle_effect(effect, &mut ctx);
            }
        }
    }

    fn effect_context(&mut self) -> EffectContext<'_, E> {
        EffectContext {
            effects: &mut self.effects,
            dispatcher: &self.dispatcher,
            #[cfg(feature = "subscriptions")]
            subscriptions: &mut self.subscriptions,
        }
    }

    fn teardown(mut self) -> Arc<S> {
        let in_flight = self.effects.len();
        self.effects.cancel_all();
        #[cfg(feature = "subscriptions")]
        self.subscriptions.cancel_all();

        self.commands.close();
        let mut dropped = 0usize;
        while let Ok(command) = self.commands.try_recv() {
            if matches!(command, Command::Dispatch(_)) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!(
                driver = %self.config.name,
                dropped,
                "dropped events queued after shutdown"
            );
        }

        self.stopped.cancel();
        tracing::info!(
            driver = %self.config.name,
            version = self.store.version(),
            cancelled_effects = in_flight,
            "driver stopped"
        );
        Arc::clone(self.store.state())
    }
}

impl<S, E, F, St> Drop for Driver<S, E, F, St> {
    fn drop(&mut self) {
        self.stopped.cancel();
    }
}

/// Cloneable access to a running driver.
pub struct DriverHandle<S, E> {
    dispatcher: Dispatcher<E>,
    cell: Arc<StateCell<S>>,
    stopped: CancellationToken,
    name: Arc<str>,
}

impl<S, E> Clone for DriverHandle<S, E> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            cell: Arc::clone(&self.cell),
            stopped: self.stopped.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

impl<S, E> fmt::Debug for DriverHandle<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverHandle")
            .field("name", &self.name)
            .field("stopped", &self.stopped.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<S, E: Event> DriverHandle<S, E> {
    /// Queue an event. Dropped with a debug log once the driver stopped.
    pub fn dispatch(&self, event: E) {
        self.dispatcher.dispatch(event);
    }

    /// Queue an event, getting it back if the driver stopped.
    pub fn try_dispatch(&self, event: E) -> Result<(), DispatchError<E>> {
        self.dispatcher.try_dispatch(event)
    }

    /// Latest published state.
    pub fn current_state(&self) -> Arc<S> {
        self.cell.current()
    }

    /// Version of the latest published state.
    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    /// Observe the current state now and every new state after it.
    ///
    /// Observers run on the driver task between events; keep them short.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: FnMut(&Arc<S>) + Send + 'static,
    {
        self.cell.subscribe(observer)
    }

    /// Stop the driver once the events queued so far have been applied.
    pub fn shutdown(&self) {
        if !self.dispatcher.request_shutdown() {
            tracing::trace!(driver = %self.name, "shutdown requested after stop");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_cancelled()
    }

    /// Resolves once the driver has stopped.
    pub async fn stopped(&self) {
        self.stopped.cancelled().await;
    }

    /// A bare dispatcher, for producers that never read state.
    pub fn dispatcher(&self) -> Dispatcher<E> {
        self.dispatcher.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Overlap;
    use crate::event::EventSummary;
    use crate::log::{EventLogConfig, EventLoggerMiddleware};
    use crate::reducer::Transition;
    use crate::store::StoreWithMiddleware;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct State {
        count: i32,
        submitting: bool,
        receipt: Option<u32>,
        error: Option<String>,
        loaded: Option<u32>,
        loads: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestEvent {
        Add(i32),
        Noop,
        Submit(Outcome),
        Paid(u32),
        PayFailed(String),
        Load { delay_ms: u64, value: u32 },
        Loaded(u32),
        Echo(i32),
        Hang,
    }

    impl Event for TestEvent {
        fn name(&self) -> &'static str {
            match self {
                TestEvent::Add(_) => "Add",
                TestEvent::Noop => "Noop",
                TestEvent::Submit(_) => "Submit",
                TestEvent::Paid(_) => "Paid",
                TestEvent::PayFailed(_) => "PayFailed",
                TestEvent::Load { .. } => "Load",
                TestEvent::Loaded(_) => "Loaded",
                TestEvent::Echo(_) => "Echo",
                TestEvent::Hang => "Hang",
            }
        }
    }

    impl EventSummary for TestEvent {}

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Outcome {
        Approve,
        Decline,
        Panic,
    }

    #[derive(Debug)]
    enum TestEffect {
        Charge(Outcome),
        Load { delay_ms: u64, value: u32 },
        Echo(i32),
        Hang,
    }

    fn reducer(state: &State, event: TestEvent) -> Transition<State, TestEffect> {
        match event {
            TestEvent::Add(n) => Transition::to(State {
                count: state.count + n,
                ..state.clone()
            }),
            TestEvent::Noop => Transition::unchanged(),
            TestEvent::Submit(outcome) => {
                if state.submitting {
                    return Transition::unchanged();
                }
                Transition::to_with(
                    State {
                        submitting: true,
                        error: None,
                        ..state.clone()
                    },
                    TestEffect::Charge(outcome),
                )
            }
            TestEvent::Paid(receipt) => Transition::to(State {
                submitting: false,
                receipt: Some(receipt),
                ..state.clone()
            }),
            TestEvent::PayFailed(error) => Transition::to(State {
                submitting: false,
                error: Some(error),
                ..state.clone()
            }),
            TestEvent::Load { delay_ms, value } => {
                Transition::effect(TestEffect::Load { delay_ms, value })
            }
            TestEvent::Loaded(value) => Transition::to(State {
                loaded: Some(value),
                loads: state.loads + 1,
                ..state.clone()
            }),
            TestEvent::Echo(n) => Transition::effect(TestEffect::Echo(n)),
            TestEvent::Hang => Transition::effect(TestEffect::Hang),
        }
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn effect_handler(
        charges: Arc<AtomicUsize>,
        hung: Arc<AtomicBool>,
    ) -> impl FnMut(TestEffect, &mut EffectContext<'_, TestEvent>) + Send + 'static {
        move |effect: TestEffect, ctx: &mut EffectContext<'_, TestEvent>| match effect {
            TestEffect::Charge(outcome) => {
                charges.fetch_add(1, Ordering::SeqCst);
                let _ = ctx.effects().attempt(
                    "charge",
                    Overlap::Suppress,
                    async move {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        match outcome {
                            Outcome::Approve => Ok(TestEvent::Paid(42)),
                            Outcome::Decline => Err("card declined".to_string()),
                            Outcome::Panic => panic!("gateway exploded"),
                        }
                    },
                    |failure| TestEvent::PayFailed(failure.to_string()),
                );
            }
            TestEffect::Load { delay_ms, value } => {
                ctx.effects().spawn("load", async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    TestEvent::Loaded(value)
                });
            }
            TestEffect::Echo(n) => ctx.emit(TestEvent::Add(n)),
            TestEffect::Hang => {
                let flag = DropFlag(Arc::clone(&hung));
                ctx.effects().spawn("hang", async move {
                    let _flag = flag;
                    std::future::pending::<TestEvent>().await
                });
            }
        }
    }

    fn spawn_driver() -> (
        DriverHandle<State, TestEvent>,
        JoinHandle<Arc<State>>,
        Arc<AtomicUsize>,
        Arc<AtomicBool>,
    ) {
        let charges = Arc::new(AtomicUsize::new(0));
        let hung = Arc::new(AtomicBool::new(false));
        let driver = Driver::new(State::default(), reducer)
            .with_config(DriverConfig::named("test").with_event_logging(Default::default()));
        let (handle, task) = driver.spawn(effect_handler(Arc::clone(&charges), Arc::clone(&hung)));
        (handle, task, charges, hung)
    }

    async fn wait_for<P>(handle: &DriverHandle<State, TestEvent>, predicate: P) -> Arc<State>
    where
        P: Fn(&State) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let state = handle.current_state();
                if predicate(&state) {
                    return state;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition not reached in time")
    }

    #[tokio::test]
    async fn test_events_applied_in_order() {
        let (handle, task, _, _) = spawn_driver();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = handle.subscribe(move |state: &Arc<State>| {
            sink.lock().unwrap().push(state.count);
        });

        for n in 1..=20 {
            handle.dispatch(TestEvent::Add(n));
        }
        handle.shutdown();
        let final_state = task.await.unwrap();

        assert_eq!(final_state.count, 210);
        let expected: Vec<i32> = (0..=20).map(|n| n * (n + 1) / 2).collect();
        assert_eq!(*seen.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_concurrent_producers_are_serialized() {
        let (handle, task, _, _) = spawn_driver();

        let producers: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                tokio::spawn(async move {
                    for _ in 0..50 {
                        handle.dispatch(TestEvent::Add(1));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }

        handle.shutdown();
        let final_state = task.await.unwrap();
        assert_eq!(final_state.count, 400);
        assert_eq!(handle.version(), 400);
    }

    #[tokio::test]
    async fn test_subscribe_gets_current_state_first() {
        let (handle, task, _, _) = spawn_driver();
        handle.dispatch(TestEvent::Add(5));
        wait_for(&handle, |s| s.count == 5).await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = handle.subscribe(move |state: &Arc<State>| {
            sink.lock().unwrap().push(state.count);
        });
        assert_eq!(*seen.lock().unwrap(), vec![5]);

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_noop_does_not_notify() {
        let (handle, task, _, _) = spawn_driver();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = handle.subscribe(move |_: &Arc<State>| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let before = handle.current_state();
        handle.dispatch(TestEvent::Noop);
        handle.dispatch(TestEvent::Noop);
        handle.shutdown();
        let after = task.await.unwrap();

        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_notifications() {
        let (handle, task, _, _) = spawn_driver();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = handle.subscribe(move |state: &Arc<State>| {
            sink.lock().unwrap().push(state.count);
        });

        handle.dispatch(TestEvent::Add(1));
        wait_for(&handle, |s| s.count == 1).await;
        sub.unsubscribe();
        handle.dispatch(TestEvent::Add(1));
        handle.shutdown();
        task.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_double_submit_starts_one_effect() {
        let (handle, task, charges, _) = spawn_driver();
        handle.dispatch(TestEvent::Submit(Outcome::Approve));
        handle.dispatch(TestEvent::Submit(Outcome::Approve));

        let state = wait_for(&handle, |s| s.receipt.is_some()).await;
        assert_eq!(state.receipt, Some(42));
        assert!(!state.submitting);
        assert_eq!(charges.load(Ordering::SeqCst), 1);

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_effect_error_becomes_failure_event() {
        let (handle, task, _, _) = spawn_driver();
        handle.dispatch(TestEvent::Submit(Outcome::Decline));

        let state = wait_for(&handle, |s| s.error.is_some()).await;
        assert!(!state.submitting);
        assert_eq!(
            state.error.as_deref(),
            Some("effect `charge` failed: card declined")
        );

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_effect_panic_becomes_failure_event() {
        let (handle, task, _, _) = spawn_driver();
        handle.dispatch(TestEvent::Submit(Outcome::Panic));

        let state = wait_for(&handle, |s| s.error.is_some()).await;
        assert_eq!(
            state.error.as_deref(),
            Some("effect `charge` panicked: gateway exploded")
        );

        // The driver keeps serving events
        handle.dispatch(TestEvent::Add(1));
        wait_for(&handle, |s| s.count == 1).await;
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_replaced_effect_never_delivers() {
        let (handle, task, _, _) = spawn_driver();
        handle.dispatch(TestEvent::Load {
            delay_ms: 60,
            value: 1,
        });
        handle.dispatch(TestEvent::Load {
            delay_ms: 5,
            value: 2,
        });

        wait_for(&handle, |s| s.loaded.is_some()).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let state = handle.current_state();
        assert_eq!(state.loaded, Some(2));
        assert_eq!(state.loads, 1);

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_emit_from_effect_handler() {
        let (handle, task, _, _) = spawn_driver();
        handle.dispatch(TestEvent::Echo(3));
        wait_for(&handle, |s| s.count == 3).await;
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_applies_queued_then_rejects() {
        let driver: Driver<State, TestEvent, TestEffect> = Driver::new(State::default(), reducer);
        let handle = driver.handle();

        // Queued before the loop starts
        handle.dispatch(TestEvent::Add(1));
        handle.dispatch(TestEvent::Add(2));
        handle.shutdown();
        handle.dispatch(TestEvent::Add(100));

        let task = tokio::spawn(driver.run(|_effect, _ctx| {}));
        let final_state = task.await.unwrap();
        handle.stopped().await;

        assert_eq!(final_state.count, 3);
        assert!(handle.is_stopped());
        assert_eq!(handle.current_state().count, 3);

        handle.dispatch(TestEvent::Add(5));
        let err = handle.try_dispatch(TestEvent::Add(5)).unwrap_err();
        assert_eq!(err.into_event(), TestEvent::Add(5));
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_effects() {
        let (handle, task, _, hung) = spawn_driver();
        handle.dispatch(TestEvent::Hang);
        handle.dispatch(TestEvent::Add(1));
        wait_for(&handle, |s| s.count == 1).await;
        assert!(!hung.load(Ordering::SeqCst));

        handle.shutdown();
        task.await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while !hung.load(Ordering::SeqCst) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("effect was not cancelled");
    }

    #[tokio::test]
    async fn test_driver_with_middleware_store() {
        let middleware = EventLoggerMiddleware::with_log(EventLogConfig::default());
        let log = middleware.log_handle().unwrap();
        let store = StoreWithMiddleware::new(State::default(), reducer, middleware);

        let driver = Driver::from_store(store).with_config(DriverConfig::named("logged"));
        assert_eq!(driver.config().name, "logged");
        let (handle, task) = driver.spawn(|_effect, _ctx| {});
        assert_eq!(handle.name(), "logged");

        handle.dispatch(TestEvent::Add(1));
        handle.dispatch(TestEvent::Noop);
        handle.shutdown();
        task.await.unwrap();

        let log = log.lock();
        let marks: Vec<_> = log.entries().map(|e| (e.name, e.state_changed)).collect();
        assert_eq!(marks, vec![("Add", Some(true)), ("Noop", Some(false))]);
    }
}
