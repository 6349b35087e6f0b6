//! Published state snapshots and push-based observers
//!
//! The driver task owns the store; everyone else reads through a
//! [`StateCell`]. Each published snapshot carries the store version, and
//! observers see versions in strictly increasing order.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// Callback invoked with each published state.
pub type Observer<S> = Box<dyn FnMut(&Arc<S>) + Send>;

struct Entry<S> {
    active: Arc<AtomicBool>,
    observer: Observer<S>,
}

struct Registry<S> {
    entries: Vec<Entry<S>>,
    // Flags of the entries taken out by a publish that is still running
    delivering: Vec<Arc<AtomicBool>>,
}

fn live(flags: impl IntoIterator<Item = impl AsRef<AtomicBool>>) -> usize {
    flags
        .into_iter()
        .filter(|active| active.as_ref().load(Ordering::Acquire))
        .count()
}

/// Shared slot holding the latest published state.
///
/// Reads never wait on observers: the snapshot sits behind its own lock and
/// observers are called after it has been released. No lock is held while
/// observers run, so they may subscribe, unsubscribe or read the cell.
pub struct StateCell<S> {
    snapshot: RwLock<(Arc<S>, u64)>,
    // Snapshot writes and registrations both happen under this lock, so a new
    // observer cannot miss or repeat a version.
    registry: Mutex<Registry<S>>,
    publishing: Mutex<()>,
}

impl<S> StateCell<S> {
    /// Create a cell holding the initial state at `version`.
    pub fn new(state: Arc<S>, version: u64) -> Self {
        Self {
            snapshot: RwLock::new((state, version)),
            registry: Mutex::new(Registry {
                entries: Vec::new(),
                delivering: Vec::new(),
            }),
            publishing: Mutex::new(()),
        }
    }

    /// The latest published state.
    pub fn current(&self) -> Arc<S> {
        Arc::clone(&self.snapshot.read().0)
    }

    /// Version of the latest published state.
    pub fn version(&self) -> u64 {
        self.snapshot.read().1
    }

    fn latest(&self) -> (Arc<S>, u64) {
        let snapshot = self.snapshot.read();
        (Arc::clone(&snapshot.0), snapshot.1)
    }

    /// Register an observer.
    ///
    /// The observer is called right away with the current state, then with
    /// every state published afterwards. It runs on the publishing task, so
    /// it must not block.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: FnMut(&Arc<S>) + Send + 'static,
    {
        let mut observer: Observer<S> = Box::new(observer);
        let (state, mut seen) = self.latest();
        observer(&state);

        loop {
            let mut registry = self.registry.lock();
            let (state, version) = self.latest();
            if version == seen {
                let active = Arc::new(AtomicBool::new(true));
                registry.entries.push(Entry {
                    active: Arc::clone(&active),
                    observer,
                });
                return Subscription { active };
            }

            // Published while the first call ran; catch up outside the lock
            drop(registry);
            observer(&state);
            seen = version;
        }
    }

    /// Store a new snapshot and notify observers.
    ///
    /// Versions that are not newer than the current one are ignored and
    /// `false` is returned. Publishes are serialized; publishing from inside
    /// an observer deadlocks.
    pub fn publish(&self, state: Arc<S>, version: u64) -> bool {
        let _publishing = self.publishing.lock();

        let mut round = {
            let mut registry = self.registry.lock();
            {
                let mut snapshot = self.snapshot.write();
                if version <= snapshot.1 {
                    tracing::trace!(version, current = snapshot.1, "ignoring outdated publish");
                    return false;
                }
                *snapshot = (Arc::clone(&state), version);
            }

            let mut round = std::mem::take(&mut registry.entries);
            round.retain(|entry| entry.active.load(Ordering::Acquire));
            registry.delivering = round.iter().map(|entry| Arc::clone(&entry.active)).collect();
            round
        };

        for entry in round.iter_mut() {
            // Unsubscribed by an earlier observer in this same round
            if entry.active.load(Ordering::Acquire) {
                (entry.observer)(&state);
            }
        }

        let mut registry = self.registry.lock();
        registry.delivering.clear();
        // Observers that subscribed during the round go after the existing ones
        round.append(&mut registry.entries);
        registry.entries = round;
        true
    }

    /// Number of observers still subscribed.
    pub fn observer_count(&self) -> usize {
        let registry = self.registry.lock();
        live(registry.entries.iter().map(|entry| &entry.active)) + live(&registry.delivering)
    }
}

impl<S: fmt::Debug> fmt::Debug for StateCell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot.read();
        f.debug_struct("StateCell")
            .field("state", &snapshot.0)
            .field("version", &snapshot.1)
            .finish_non_exhaustive()
    }
}

/// Handle to a registered observer.
///
/// Dropping the handle unsubscribes. Use [`detach`](Self::detach) to keep the
/// observer for the lifetime of the cell.
#[must_use = "dropping a Subscription unsubscribes the observer"]
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Stop receiving states. Idempotent.
    ///
    /// Takes effect before the next publish, including one already running.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Whether the observer is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Keep the observer registered without holding the handle.
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
