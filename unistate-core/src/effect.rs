//! Effect manager for async work started by reducers
//!
//! Provides lifecycle management for effects with support for:
//! - Per-key overlap policy: cancel-and-replace or suppress
//! - Generation tokens that mark every start of the same logical operation
//! - Debounced execution
//! - Idempotent cancellation
//! - Capturing errors and panics as failure events
//!
//! Completed effects do not dispatch directly. They report a [`Completion`]
//! which has to pass [`EffectManager::settle`] first; completions from a
//! cancelled or superseded start never make it back to the reducer.
//!
//! # Example
//!
//! ```ignore
//! use unistate::effect::{EffectManager, Overlap};
//! use std::time::Duration;
//!
//! let (completion_tx, mut completion_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut effects = EffectManager::new(completion_tx);
//!
//! // Replace: a newer start cancels the one in flight
//! effects.spawn("profile", async { Event::ProfileDidLoad(load().await) });
//!
//! // Suppress: a second submit while one is running is dropped
//! effects.spawn_exclusive("submit", async { Event::SubmitDidFinish });
//!
//! // Debounced: waits, and resets if started again before the delay elapses
//! effects.debounce("search", Duration::from_millis(200), async move {
//!     Event::SearchDidLoad(search(&query).await)
//! });
//!
//! // Errors and panics become events
//! effects.attempt("charge", Overlap::Suppress, gateway.charge(amount), |failure| {
//!     Event::PaymentDidFail(failure.message().to_string())
//! });
//!
//! while let Some(completion) = completion_rx.recv().await {
//!     if let Some(event) = effects.settle(completion) {
//!         store.dispatch(event);
//!     }
//! }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinError};

use crate::event::Event;

/// Identifies a logical operation for cancellation and replacement.
///
/// At most one effect per key is in flight at any time.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EffectKey(String);

impl EffectKey {
    /// Create a new effect key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EffectKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EffectKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marks one start of a logical operation.
///
/// Generations only grow. A result tagged with an older generation than the
/// latest start is stale.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    /// The generation before any start.
    pub const INITIAL: Self = Self(0);

    /// Wrap a raw counter value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What to do when an effect starts while another with the same key is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlap {
    /// Cancel the running effect and start the new one.
    #[default]
    Replace,
    /// Keep the running effect and drop the new one.
    Suppress,
}

/// Outcome of starting an effect.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Launch {
    /// The effect is running under this generation.
    Started(Generation),
    /// An effect with the same key was already running and the policy was
    /// [`Overlap::Suppress`]. Carries the generation that keeps running.
    Suppressed(Generation),
}

impl Launch {
    /// Whether a new effect was started.
    pub fn is_started(&self) -> bool {
        matches!(self, Launch::Started(_))
    }

    /// Generation of the effect now in flight for the key.
    pub fn generation(&self) -> Generation {
        match *self {
            Launch::Started(generation) | Launch::Suppressed(generation) => generation,
        }
    }
}

/// Report sent by a finished effect.
///
/// `event` is `None` when the effect panicked and no failure mapping was
/// given; the completion still clears the in-flight slot.
#[derive(Debug)]
pub struct Completion<E> {
    /// Key the effect was started under.
    pub key: EffectKey,
    /// Generation the effect was started with.
    pub generation: Generation,
    /// Event to feed back to the reducer.
    pub event: Option<E>,
}

/// Classified effect failure handed to failure mappings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectFailure {
    /// The effect returned an error.
    #[error("effect `{key}` failed: {message}")]
    Failed {
        /// Key of the failed effect
        key: EffectKey,
        /// Rendered error
        message: String,
    },
    /// The effect panicked.
    #[error("effect `{key}` panicked: {message}")]
    Panicked {
        /// Key of the failed effect
        key: EffectKey,
        /// Panic payload, if it was a string
        message: String,
    },
}

impl EffectFailure {
    /// Key of the failed effect.
    pub fn key(&self) -> &EffectKey {
        match self {
            EffectFailure::Failed { key, .. } | EffectFailure::Panicked { key, .. } => key,
        }
    }

    /// The error rendering, without the key prefix.
    pub fn message(&self) -> &str {
        match self {
            EffectFailure::Failed { message, .. } | EffectFailure::Panicked { message, .. } => {
                message
            }
        }
    }

    /// Whether the effect panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self, EffectFailure::Panicked { .. })
    }
}

struct InFlight {
    generation: Generation,
    abort: AbortHandle,
}

/// Manages effect lifecycle with per-key exclusivity.
///
/// # Type Parameters
///
/// - `E`: The event type that effects produce
pub struct EffectManager<E> {
    in_flight: HashMap<EffectKey, InFlight>,
    // One counter for every key, so finished keys leave nothing behind and
    // a generation is never handed out twice.
    last_issued: Generation,
    completion_tx: mpsc::UnboundedSender<Completion<E>>,
}

impl<E> EffectManager<E>
where
    E: Event,
{
    /// Create a new effect manager.
    ///
    /// Finished effects report on `completion_tx`; pass each report through
    /// [`settle`](Self::settle) before dispatching.
    pub fn new(completion_tx: mpsc::UnboundedSender<Completion<E>>) -> Self {
        Self {
            in_flight: HashMap::new(),
            last_issued: Generation::INITIAL,
            completion_tx,
        }
    }

    /// Start an effect, cancelling any running effect with the same key.
    ///
    /// # Example
    ///
    /// ```ignore
    /// effects.spawn("weather", async move {
    ///     match api::fetch_weather(lat, lon).await {
    ///         Ok(data) => Event::WeatherDidLoad(data),
    ///         Err(e) => Event::WeatherDidFail(e.to_string()),
    ///     }
    /// });
    /// ```
    pub fn spawn<Fut>(&mut self, key: impl Into<EffectKey>, future: Fut) -> Generation
    where
        Fut: Future<Output = E> + Send + 'static,
    {
        let key = key.into();
        let generation = self.replace(&key);
        self.track(key, generation, future, report_unmapped);
        generation
    }

    /// Start an effect unless one with the same key is already running.
    pub fn spawn_exclusive<Fut>(&mut self, key: impl Into<EffectKey>, future: Fut) -> Launch
    where
        Fut: Future<Output = E> + Send + 'static,
    {
        self.spawn_with(key, Overlap::Suppress, future)
    }

    /// Start an effect with an explicit overlap policy.
    pub fn spawn_with<Fut>(
        &mut self,
        key: impl Into<EffectKey>,
        overlap: Overlap,
        future: Fut,
    ) -> Launch
    where
        Fut: Future<Output = E> + Send + 'static,
    {
        let key = key.into();
        let generation = match self.admit(&key, overlap) {
            Ok(generation) => generation,
            Err(running) => return Launch::Suppressed(running),
        };
        self.track(key, generation, future, report_unmapped);
        Launch::Started(generation)
    }

    /// Start an effect after a delay.
    ///
    /// Starting again with the same key before the delay elapses cancels the
    /// pending one and restarts the timer. Useful for search-as-you-type.
    pub fn debounce<Fut>(
        &mut self,
        key: impl Into<EffectKey>,
        delay: Duration,
        future: Fut,
    ) -> Generation
    where
        Fut: Future<Output = E> + Send + 'static,
    {
        self.spawn(key, async move {
            tokio::time::sleep(delay).await;
            future.await
        })
    }

    /// Start a fallible effect whose errors and panics become events.
    ///
    /// `on_failure` receives [`EffectFailure::Failed`] with the error's
    /// `Display` rendering, or [`EffectFailure::Panicked`] if the effect
    /// panicked. Either way the reducer gets an event.
    ///
    /// # Example
    ///
    /// ```ignore
    /// effects.attempt(
    ///     "charge",
    ///     Overlap::Suppress,
    ///     async move { gateway.charge(cents).await.map(Event::PaymentDidSucceed) },
    ///     |failure| Event::PaymentDidFail(failure.message().to_string()),
    /// );
    /// ```
    pub fn attempt<Fut, X, M>(
        &mut self,
        key: impl Into<EffectKey>,
        overlap: Overlap,
        future: Fut,
        on_failure: M,
    ) -> Launch
    where
        Fut: Future<Output = Result<E, X>> + Send + 'static,
        X: fmt::Display + Send + 'static,
        M: FnOnce(EffectFailure) -> E + Send + 'static,
    {
        let key = key.into();
        let generation = match self.admit(&key, overlap) {
            Ok(generation) => generation,
            Err(running) => return Launch::Suppressed(running),
        };
        let failed_key = key.clone();
        self.track(key, generation, future, move |outcome| {
            let event = match outcome {
                Ok(Ok(event)) => event,
                Ok(Err(err)) => on_failure(EffectFailure::Failed {
                    key: failed_key,
                    message: err.to_string(),
                }),
                Err(failure) => on_failure(failure),
            };
            Some(event)
        });
        Launch::Started(generation)
    }

    /// Cancel an effect by key.
    ///
    /// Returns whether an effect was running. Calling it again, or for a key
    /// that never ran, is a no-op.
    pub fn cancel(&mut self, key: &EffectKey) -> bool {
        match self.in_flight.remove(key) {
            Some(running) => {
                running.abort.abort();
                tracing::trace!(key = %key, generation = %running.generation, "effect cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel all running effects.
    pub fn cancel_all(&mut self) {
        for (_, running) in self.in_flight.drain() {
            running.abort.abort();
        }
    }

    /// Accept a completion if it belongs to the live start of its key.
    ///
    /// Returns the event to dispatch. Completions from cancelled or
    /// superseded starts return `None` and leave the in-flight effect alone.
    pub fn settle(&mut self, completion: Completion<E>) -> Option<E> {
        let Completion {
            key,
            generation,
            event,
        } = completion;

        let is_live = self
            .in_flight
            .get(&key)
            .is_some_and(|running| running.generation == generation);

        if !is_live {
            tracing::debug!(key = %key, generation = %generation, "discarding stale effect result");
            return None;
        }

        self.in_flight.remove(&key);
        event
    }

    /// Check if an effect with the given key is currently running.
    pub fn is_running(&self, key: &EffectKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Generation of the effect running under `key`, if any.
    pub fn generation(&self, key: &EffectKey) -> Option<Generation> {
        self.in_flight.get(key).map(|running| running.generation)
    }

    /// Get the number of running effects.
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Check if there are no running effects.
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Get the keys of all running effects.
    pub fn running_keys(&self) -> impl Iterator<Item = &EffectKey> {
        self.in_flight.keys()
    }

    fn replace(&mut self, key: &EffectKey) -> Generation {
        self.cancel(key);
        self.issue()
    }

    fn admit(&mut self, key: &EffectKey, overlap: Overlap) -> Result<Generation, Generation> {
        if let (Overlap::Suppress, Some(running)) = (overlap, self.in_flight.get(key)) {
            tracing::debug!(key = %key, running = %running.generation, "effect suppressed");
            return Err(running.generation);
        }
        Ok(self.replace(key))
    }

    fn issue(&mut self) -> Generation {
        self.last_issued = self.last_issued.next();
        self.last_issued
    }

    /// Run `future` as its own task and report through a watcher task.
    ///
    /// Only the work task is aborted on cancel; the watcher then sees a
    /// cancelled join and reports nothing.
    fn track<Fut, R>(&mut self, key: EffectKey, generation: Generation, future: Fut, resolve: R)
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
        R: FnOnce(Result<Fut::Output, EffectFailure>) -> Option<E> + Send + 'static,
    {
        let work = tokio::spawn(future);
        let abort = work.abort_handle();
        let tx = self.completion_tx.clone();
        let report_key = key.clone();

        tokio::spawn(async move {
            let outcome = match work.await {
                Ok(output) => Ok(output),
                Err(err) if err.is_cancelled() => return,
                Err(err) => Err(EffectFailure::Panicked {
                    key: report_key.clone(),
                    message: panic_message(err),
                }),
            };
            let event = resolve(outcome);
            let _ = tx.send(Completion {
                key: report_key,
                generation,
                event,
            });
        });

        tracing::trace!(key = %key, generation = %generation, "effect started");
        self.in_flight.insert(key, InFlight { generation, abort });
    }
}

impl<E> Drop for EffectManager<E> {
    fn drop(&mut self) {
        for (_, running) in self.in_flight.drain() {
            running.abort.abort();
        }
    }
}

fn report_unmapped<E>(outcome: Result<E, EffectFailure>) -> Option<E> {
    match outcome {
        Ok(event) => Some(event),
        Err(failure) => {
            tracing::error!(%failure, "effect panicked without a failure mapping");
            None
        }
    }
}

fn panic_message(err: JoinError) -> String {
    let payload: Box<dyn Any + Send> = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
