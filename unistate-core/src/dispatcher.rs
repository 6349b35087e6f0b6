//! Sending side of the driver's event queue

use tokio::sync::mpsc;

use crate::event::Event;

/// Message consumed by the driver loop.
#[derive(Debug)]
pub(crate) enum Command<E> {
    Dispatch(E),
    Shutdown,
}

/// Error returned by [`Dispatcher::try_dispatch`] once the driver has stopped.
///
/// Carries the rejected event back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError<E> {
    /// The driver is no longer accepting events.
    #[error("driver stopped; event was not delivered")]
    Stopped(E),
}

impl<E> DispatchError<E> {
    /// Recover the rejected event.
    pub fn into_event(self) -> E {
        match self {
            DispatchError::Stopped(event) => event,
        }
    }
}

/// Cloneable handle for feeding events into a driver.
///
/// Events from every clone land on the same queue and are applied in the
/// order they arrive.
pub struct Dispatcher<E> {
    tx: mpsc::UnboundedSender<Command<E>>,
}

impl<E> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E> std::fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<E: Event> Dispatcher<E> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command<E>>) -> Self {
        Self { tx }
    }

    /// Enqueue an event. Fire-and-forget.
    ///
    /// After the driver stopped the event is dropped and logged at debug level.
    pub fn dispatch(&self, event: E) {
        if let Err(DispatchError::Stopped(event)) = self.try_dispatch(event) {
            tracing::debug!(event = event.name(), "driver stopped; dropping event");
        }
    }

    /// Enqueue an event, handing it back if the driver stopped.
    pub fn try_dispatch(&self, event: E) -> Result<(), DispatchError<E>> {
        match self.tx.send(Command::Dispatch(event)) {
            Err(mpsc::error::SendError(Command::Dispatch(event))) => {
                Err(DispatchError::Stopped(event))
            }
            _ => Ok(()),
        }
    }

    /// Whether the driver has stopped accepting events.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Ask the driver to stop after the events already queued.
    pub(crate) fn request_shutdown(&self) -> bool {
        self.tx.send(Command::Shutdown).is_ok()
    }
}

/// Create a dispatcher and the receiving end of its queue.
pub(crate) fn channel<E: Event>() -> (Dispatcher<E>, mpsc::UnboundedReceiver<Command<E>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Dispatcher::new(tx), rx)
}
