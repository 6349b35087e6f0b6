//! Reducer-level guard against duplicate and stale operations
//!
//! [`Operation`] is a small state machine kept inside application state:
//!
//! ```text
//! Idle ──begin──▶ Running(g) ──succeed(g)──▶ Succeeded
//!   ▲                 │      ──fail(g)─────▶ Failed
//!   │                 │                          │
//!   └────cancel───────┘◀──────acknowledge────────┘
//! ```
//!
//! Every method returns the next value instead of mutating, and `None` for an
//! illegal move. Reducers map `None` to `Transition::unchanged()`:
//!
//! ```
//! use unistate_core::guard::Operation;
//!
//! let idle: Operation<u32> = Operation::new();
//! let (running, generation) = idle.begin().unwrap();
//!
//! // A second start while running is rejected
//! assert!(running.begin().is_none());
//!
//! let done = running.succeed(generation, 7).unwrap();
//! assert_eq!(done.value(), Some(&7));
//! assert!(done.acknowledge().unwrap().is_idle());
//! ```

use crate::effect::Generation;

/// Where an operation currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase<T, X> {
    /// Nothing running, nothing to report.
    #[default]
    Idle,
    /// Work in flight.
    Running,
    /// Finished with a value that has not been acknowledged yet.
    Succeeded(T),
    /// Finished with an error that has not been acknowledged yet.
    Failed(X),
}

/// One logical operation tracked by the reducer.
///
/// Carries the generation of the latest start so completions from an older
/// start can be recognized and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation<T, X = String> {
    generation: Generation,
    phase: Phase<T, X>,
}

impl<T, X> Default for Operation<T, X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, X> Operation<T, X> {
    /// An idle operation that has never run.
    pub fn new() -> Self {
        Self {
            generation: Generation::INITIAL,
            phase: Phase::Idle,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &Phase<T, X> {
        &self.phase
    }

    /// Generation of the latest start.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running)
    }

    /// Whether the operation finished and awaits acknowledgement.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Succeeded(_) | Phase::Failed(_))
    }

    /// Success value, if the operation succeeded.
    pub fn value(&self) -> Option<&T> {
        match &self.phase {
            Phase::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// Error, if the operation failed.
    pub fn error(&self) -> Option<&X> {
        match &self.phase {
            Phase::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Whether a completion tagged with `generation` belongs to the live run.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.is_running() && self.generation == generation
    }

    /// Start from `Idle`.
    ///
    /// Returns the running operation and its new generation, or `None` if the
    /// operation is not idle.
    pub fn begin(&self) -> Option<(Self, Generation)> {
        if !self.is_idle() {
            return None;
        }
        Some(self.restart())
    }

    /// Start from any phase, superseding a running start.
    ///
    /// The previous run's completions become stale.
    pub fn restart(&self) -> (Self, Generation) {
        let generation = self.generation.next();
        let next = Self {
            generation,
            phase: Phase::Running,
        };
        (next, generation)
    }

    /// Record success for the live run.
    pub fn succeed(&self, generation: Generation, value: T) -> Option<Self> {
        if !self.is_current(generation) {
            return None;
        }
        Some(Self {
            generation,
            phase: Phase::Succeeded(value),
        })
    }

    /// Record failure for the live run.
    pub fn fail(&self, generation: Generation, error: X) -> Option<Self> {
        if !self.is_current(generation) {
            return None;
        }
        Some(Self {
            generation,
            phase: Phase::Failed(error),
        })
    }

    /// Return a settled operation to `Idle`.
    pub fn acknowledge(&self) -> Option<Self> {
        if !self.is_settled() {
            return None;
        }
        Some(self.reset())
    }

    /// Abandon a running start. Its completion will be stale.
    pub fn cancel(&self) -> Option<Self> {
        if !self.is_running() {
            return None;
        }
        Some(self.reset())
    }

    fn reset(&self) -> Self {
        Self {
            generation: self.generation,
            phase: Phase::Idle,
        }
    }
}
