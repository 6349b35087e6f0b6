//! Long-lived event sources owned by the driver
//!
//! Effects are one-shot; subscriptions keep producing events until they are
//! cancelled or the driver stops: timers, polling intervals, external
//! streams. Every item goes through the driver queue like any other event.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//!
//! fn handle_effect(effect: Effect, ctx: &mut EffectContext<Event>) {
//!     match effect {
//!         Effect::StartPolling => {
//!             ctx.subscriptions()
//!                 .interval_immediate("poll", Duration::from_secs(5), || Event::PollDue);
//!         }
//!         Effect::StopPolling => {
//!             ctx.subscriptions().cancel(&"poll".into());
//!         }
//!         Effect::Listen(feed) => {
//!             ctx.subscriptions().stream("feed", feed.map(Event::FeedDidEmit));
//!         }
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};

use crate::dispatcher::Dispatcher;
use crate::event::Event;

/// Identifies a subscription for replacement and cancellation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubKey(String);

impl SubKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for SubKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SubKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Keyed set of running event sources.
///
/// Adding a source under a key that is already active replaces it. A source
/// stops on its own once the driver no longer accepts events.
pub struct Subscriptions<E> {
    handles: HashMap<SubKey, JoinHandle<()>>,
    dispatcher: Dispatcher<E>,
}

impl<E> Subscriptions<E>
where
    E: Event,
{
    pub fn new(dispatcher: Dispatcher<E>) -> Self {
        Self {
            handles: HashMap::new(),
            dispatcher,
        }
    }

    /// Emit `make_event()` every `period`, starting one period from now.
    ///
    /// A zero `period` is refused with a warning and nothing is installed;
    /// any subscription already under `key` keeps running.
    pub fn interval<F>(
        &mut self,
        key: impl Into<SubKey>,
        period: Duration,
        make_event: F,
    ) -> &mut Self
    where
        F: Fn() -> E + Send + 'static,
    {
        self.ticker(key.into(), period, true, make_event)
    }

    /// Emit `make_event()` right away, then every `period`.
    ///
    /// A zero `period` is refused like in [`interval`](Self::interval).
    pub fn interval_immediate<F>(
        &mut self,
        key: impl Into<SubKey>,
        period: Duration,
        make_event: F,
    ) -> &mut Self
    where
        F: Fn() -> E + Send + 'static,
    {
        self.ticker(key.into(), period, false, make_event)
    }

    /// Forward every item of `stream` as an event.
    pub fn stream<S>(&mut self, key: impl Into<SubKey>, stream: S) -> &mut Self
    where
        S: Stream<Item = E> + Send + 'static,
    {
        let dispatcher = self.dispatcher.clone();
        self.install(key.into(), async move {
            forward(stream, &dispatcher).await;
        })
    }

    /// Like [`stream`](Self::stream), for streams that need async setup
    /// such as opening a connection.
    pub fn stream_async<F, S>(&mut self, key: impl Into<SubKey>, connect: F) -> &mut Self
    where
        F: Future<Output = S> + Send + 'static,
        S: Stream<Item = E> + Send + 'static,
    {
        let dispatcher = self.dispatcher.clone();
        self.install(key.into(), async move {
            let stream = connect.await;
            forward(stream, &dispatcher).await;
        })
    }

    /// Stop a subscription. No-op for unknown keys.
    pub fn cancel(&mut self, key: &SubKey) -> bool {
        match self.handles.remove(key) {
            Some(handle) => {
                handle.abort();
                tracing::trace!(key = key.name(), "subscription cancelled");
                true
            }
            None => false,
        }
    }

    /// Stop every subscription.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }

    /// Whether a subscription is registered under `key` and still running.
    pub fn is_active(&self, key: &SubKey) -> bool {
        self.handles
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn active_keys(&self) -> impl Iterator<Item = &SubKey> {
        self.handles.keys()
    }

    fn ticker<F>(
        &mut self,
        key: SubKey,
        period: Duration,
        skip_first: bool,
        make_event: F,
    ) -> &mut Self
    where
        F: Fn() -> E + Send + 'static,
    {
        if period.is_zero() {
            tracing::warn!(key = key.name(), "refusing interval with a zero period");
            return self;
        }

        let dispatcher = self.dispatcher.clone();
        self.install(key, async move {
            let mut interval = tokio::time::interval(period);
            if skip_first {
                interval.tick().await;
            }
            loop {
                interval.tick().await;
                if dispatcher.try_dispatch(make_event()).is_err() {
                    break;
                }
            }
        })
    }

    fn install<Fut>(&mut self, key: SubKey, task: Fut) -> &mut Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel(&key);
        tracing::trace!(key = key.name(), "subscription started");
        self.handles.insert(key, tokio::spawn(task));
        self
    }
}

async fn forward<E: Event, S>(stream: S, dispatcher: &Dispatcher<E>)
where
    S: Stream<Item = E>,
{
    tokio::pin!(stream);
    while let Some(event) = stream.next().await {
        if dispatcher.try_dispatch(event).is_err() {
            break;
        }
    }
}

impl<E> Drop for Subscriptions<E> {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}
