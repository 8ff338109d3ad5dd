//! Single-slot debouncer
//!
//! Every call supersedes the previous one: the pending timer is cancelled and
//! a new one is armed with the latest arguments. The action runs once the
//! calls have been quiet for the whole window.

use crate::{DebounceError, Pending, Result};
use lull_scheduler::Scheduler;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, trace};

/// Wrap `action` so it only runs after `delay` of silence
///
/// Shorthand for [`Debounced::new`].
pub fn make_debounced<A, F>(
    action: F,
    delay: Duration,
    scheduler: Arc<dyn Scheduler>,
) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced::new(action, delay, scheduler)
}

/// A debounced action
///
/// Clones share the same pending slot. Dropping the last clone cancels the
/// pending invocation.
pub struct Debounced<A: Send + 'static> {
    shared: Arc<Shared<A>>,
}

struct Shared<A> {
    /// Wrapped action
    action: Box<dyn Fn(A) + Send + Sync>,
    /// Quiet window
    delay: Duration,
    /// Timer source
    scheduler: Arc<dyn Scheduler>,
    /// Replace-and-cancel state; every transition happens under this lock
    slot: Mutex<Slot<A>>,
}

struct Slot<A> {
    /// At most one outstanding invocation
    pending: Option<Pending<A>>,
    /// Last generation handed out
    generation: u64,
    /// Set by `close`
    closed: bool,
}

impl<A: Send + 'static> Debounced<A> {
    /// Create a debouncer
    pub fn new<F>(action: F, delay: Duration, scheduler: Arc<dyn Scheduler>) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                action: Box::new(action),
                delay,
                scheduler,
                slot: Mutex::new(Slot {
                    pending: None,
                    generation: 0,
                    closed: false,
                }),
            }),
        }
    }

    /// Request an invocation with `args`
    ///
    /// Cancels the pending invocation (if any) and arms a new one that runs
    /// the action with these arguments after the quiet window. Never blocks on
    /// the action.
    ///
    /// On a scheduling failure the previous invocation stays cancelled and
    /// nothing is pending.
    pub fn call(&self, args: A) -> Result<()> {
        let shared = &self.shared;
        let mut slot = shared.slot.lock();
        if slot.closed {
            return Err(DebounceError::Closed);
        }

        if let Some(prev) = slot.pending.take() {
            shared.scheduler.cancel(prev.task);
            trace!(
                task = %prev.task,
                generation = prev.generation,
                "superseded pending invocation"
            );
        }

        slot.generation += 1;
        let generation = slot.generation;
        let weak = Arc::downgrade(shared);
        let task = shared
            .scheduler
            .schedule_after(shared.delay, Box::new(move || fire(&weak, generation)))
            .map_err(|e| {
                debug!(error = %e, "failed to arm debounce timer");
                DebounceError::Schedule(e)
            })?;

        slot.pending = Some(Pending {
            generation,
            task,
            args,
        });
        Ok(())
    }

    /// Cancel the pending invocation
    ///
    /// Returns whether one was pending. The debouncer stays usable.
    pub fn cancel(&self) -> bool {
        let mut slot = self.shared.slot.lock();
        self.shared.disarm(&mut slot).is_some()
    }

    /// Run the pending invocation now, on the calling thread
    ///
    /// Returns whether there was one to run.
    pub fn flush(&self) -> bool {
        let args = {
            let mut slot = self.shared.slot.lock();
            self.shared.disarm(&mut slot)
        };

        match args {
            Some(args) => {
                trace!("flushing pending invocation");
                (self.shared.action)(args);
                true
            }
            None => false,
        }
    }

    /// Cancel the pending invocation and refuse all further calls
    pub fn close(&self) {
        let mut slot = self.shared.slot.lock();
        slot.closed = true;
        self.shared.disarm(&mut slot);
    }

    /// Whether `close` has run
    pub fn is_closed(&self) -> bool {
        self.shared.slot.lock().closed
    }

    /// Whether an invocation is waiting for its window to elapse
    pub fn is_pending(&self) -> bool {
        self.shared.slot.lock().pending.is_some()
    }

    /// Quiet window
    pub fn delay(&self) -> Duration {
        self.shared.delay
    }
}

impl<A> Shared<A> {
    /// Drop the pending invocation and its timer, handing back its arguments
    fn disarm(&self, slot: &mut Slot<A>) -> Option<A> {
        let pending = slot.pending.take()?;
        self.scheduler.cancel(pending.task);
        Some(pending.args)
    }
}

/// Timer callback: run the action if `generation` is still the armed one
fn fire<A>(weak: &Weak<Shared<A>>, generation: u64) {
    let Some(shared) = weak.upgrade() else {
        return;
    };

    let args = {
        let mut slot = shared.slot.lock();
        let current = slot
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);
        if !current {
            trace!(generation, "stale debounce timer ignored");
            return;
        }
        slot.pending.take().map(|pending| pending.args)
    };

    if let Some(args) = args {
        trace!(generation, "running debounced action");
        (shared.action)(args);
    }
}

impl<A> Drop for Shared<A> {
    fn drop(&mut self) {
        if let Some(pending) = self.slot.get_mut().pending.take() {
            self.scheduler.cancel(pending.task);
        }
    }
}

impl<A: Send + 'static> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: Send + 'static> fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.shared.slot.lock();
        f.debug_struct("Debounced")
            .field("delay", &self.shared.delay)
            .field("pending", &slot.pending.is_some())
            .field("closed", &slot.closed)
            .finish()
    }
}
