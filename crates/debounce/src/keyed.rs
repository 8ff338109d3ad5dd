//! Per-key debouncing
//!
//! Keeps one independent debounce slot per key, e.g. one per watched path or
//! per UI element. A burst on one key never supersedes another key.

use crate::{DebounceError, Pending, Result};
use ahash::AHashMap;
use lull_scheduler::Scheduler;
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::trace;

/// Debouncer with an independent slot per key
///
/// The action receives the key alongside the arguments of the last call for
/// that key. Clones share state; dropping the last clone cancels every
/// pending invocation.
pub struct KeyedDebouncer<K, A>
where
    K: Eq + Hash + Clone + Send + 'static,
    A: Send + 'static,
{
    shared: Arc<Shared<K, A>>,
}

struct Shared<K, A> {
    action: Box<dyn Fn(K, A) + Send + Sync>,
    delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    slots: Mutex<Slots<K, A>>,
}

struct Slots<K, A> {
    pending: AHashMap<K, Pending<A>>,
    generation: u64,
    closed: bool,
}

impl<K, A> KeyedDebouncer<K, A>
where
    K: Eq + Hash + Clone + Send + 'static,
    A: Send + 'static,
{
    /// Create a keyed debouncer
    pub fn new<F>(action: F, delay: Duration, scheduler: Arc<dyn Scheduler>) -> Self
    where
        F: Fn(K, A) + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                action: Box::new(action),
                delay,
                scheduler,
                slots: Mutex::new(Slots {
                    pending: AHashMap::new(),
                    generation: 0,
                    closed: false,
                }),
            }),
        }
    }

    /// Request an invocation for `key`
    pub fn call(&self, key: K, args: A) -> Result<()> {
        let shared = &self.shared;
        let mut slots = shared.slots.lock();
        if slots.closed {
            return Err(DebounceError::Closed);
        }

        if let Some(prev) = slots.pending.remove(&key) {
            shared.scheduler.cancel(prev.task);
        }

        slots.generation += 1;
        let generation = slots.generation;
        let weak = Arc::downgrade(shared);
        let fire_key = key.clone();
        let task = shared.scheduler.schedule_after(
            shared.delay,
            Box::new(move || fire(&weak, fire_key, generation)),
        )?;

        slots.pending.insert(
            key,
            Pending {
                generation,
                task,
                args,
            },
        );
        Ok(())
    }

    /// Cancel the pending invocation for `key`
    pub fn cancel(&self, key: &K) -> bool {
        let mut slots = self.shared.slots.lock();
        match slots.pending.remove(key) {
            Some(pending) => {
                self.shared.scheduler.cancel(pending.task);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending invocation
    ///
    /// Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let mut slots = self.shared.slots.lock();
        self.shared.disarm_all(&mut slots)
    }

    /// Cancel everything and refuse further calls
    pub fn close(&self) {
        let mut slots = self.shared.slots.lock();
        slots.closed = true;
        self.shared.disarm_all(&mut slots);
    }

    /// Whether `key` has an invocation waiting
    pub fn is_pending(&self, key: &K) -> bool {
        self.shared.slots.lock().pending.contains_key(key)
    }

    /// Keys with an invocation waiting, in no particular order
    pub fn pending_keys(&self) -> Vec<K> {
        self.shared.slots.lock().pending.keys().cloned().collect()
    }

    /// Quiet window
    pub fn delay(&self) -> Duration {
        self.shared.delay
    }
}

impl<K, A> Shared<K, A> {
    fn disarm_all(&self, slots: &mut Slots<K, A>) -> usize {
        let count = slots.pending.len();
        for (_, pending) in slots.pending.drain() {
            self.scheduler.cancel(pending.task);
        }
        count
    }
}

fn fire<K: Eq + Hash, A>(weak: &Weak<Shared<K, A>>, key: K, generation: u64) {
    let Some(shared) = weak.upgrade() else {
        return;
    };

    let args = {
        let mut slots = shared.slots.lock();
        let current = slots
            .pending
            .get(&key)
            .is_some_and(|pending| pending.generation == generation);
        if !current {
            return;
        }
        slots.pending.remove(&key).map(|pending| pending.args)
    };

    if let Some(args) = args {
        trace!(generation, "running keyed debounced action");
        (shared.action)(key, args);
    }
}

impl<K, A> Drop for Shared<K, A> {
    fn drop(&mut self) {
        let slots = self.slots.get_mut();
        for (_, pending) in slots.pending.drain() {
            self.scheduler.cancel(pending.task);
        }
    }
}

impl<K, A> Clone for KeyedDebouncer<K, A>
where
    K: Eq + Hash + Clone + Send + 'static,
    A: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}
