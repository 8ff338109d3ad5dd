//! Tokio-backed real-time scheduler
//!
//! Each scheduled task is a spawned tokio task that sleeps until its deadline.
//! Fire and cancel race on removal from a shared registry, so exactly one of
//! them wins for any given task.

use crate::{ScheduleError, Scheduler, Task, TaskId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Registry of outstanding tasks
///
/// The abort handle is filled in right after spawning; a `None` slot is a task
/// whose spawn has not returned yet.
type Registry = DashMap<TaskId, Option<AbortHandle>>;

/// Scheduler running tasks on a tokio runtime
///
/// Dropping the scheduler cancels everything it still owns.
pub struct TokioScheduler {
    /// Runtime the timers run on
    handle: Handle,
    /// Outstanding tasks
    tasks: Arc<Registry>,
    /// Reserved task slots; counts registry entries plus in-flight inserts
    reserved: Arc<AtomicUsize>,
    /// Next raw task id
    next_id: AtomicU64,
    /// Set once `shutdown` ran
    shut_down: AtomicBool,
    /// Maximum outstanding tasks
    capacity: Option<usize>,
}

impl TokioScheduler {
    /// Create a scheduler on the given runtime
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            tasks: Arc::new(DashMap::new()),
            reserved: Arc::new(AtomicUsize::new(0)),
            next_id: AtomicU64::new(0),
            shut_down: AtomicBool::new(false),
            capacity: None,
        }
    }

    /// Create a scheduler on the runtime of the calling context
    ///
    /// Fails with [`ScheduleError::NoRuntime`] outside a tokio runtime.
    pub fn current() -> Result<Self, ScheduleError> {
        let handle =
            Handle::try_current().map_err(|e| ScheduleError::NoRuntime(e.to_string()))?;
        Ok(Self::new(handle))
    }

    /// Refuse to hold more than `limit` outstanding tasks
    ///
    /// The limit holds under concurrent scheduling.
    pub fn with_capacity_limit(mut self, limit: usize) -> Self {
        self.capacity = Some(limit);
        self
    }

    /// Number of outstanding tasks
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel every outstanding task and reject further scheduling
    ///
    /// Returns the number of tasks cancelled.
    pub fn shutdown(&self) -> usize {
        self.shut_down.store(true, Ordering::Release);

        let ids: Vec<TaskId> = self.tasks.iter().map(|entry| *entry.key()).collect();
        let cancelled = ids.into_iter().filter(|id| self.cancel(*id)).count();

        debug!(cancelled, "tokio scheduler shut down");
        cancelled
    }

    /// Whether `shutdown` has run
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) -> Result<TaskId, ScheduleError> {
        if self.is_shut_down() {
            return Err(ScheduleError::ShutDown);
        }
        self.reserve()?;

        let id = TaskId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let deadline = Instant::now().checked_add(delay);
        self.tasks.insert(id, None);

        let (tasks, reserved) = (Arc::clone(&self.tasks), Arc::clone(&self.reserved));
        let join = self.handle.spawn(async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                // Beyond `Instant`'s range; tokio clamps this to its far future
                None => tokio::time::sleep(delay).await,
            }
            // Losing this race to `cancel` means the task must not run
            if tasks.remove(&id).is_some() {
                reserved.fetch_sub(1, Ordering::AcqRel);
                trace!(task = %id, "firing task");
                task();
            }
        });

        if let Some(mut slot) = self.tasks.get_mut(&id) {
            *slot = Some(join.abort_handle());
        }

        trace!(task = %id, ?delay, "scheduled task");
        Ok(id)
    }

    fn cancel(&self, id: TaskId) -> bool {
        match self.tasks.remove(&id) {
            Some((_, slot)) => {
                self.reserved.fetch_sub(1, Ordering::AcqRel);
                if let Some(abort) = slot {
                    abort.abort();
                }
                trace!(task = %id, "cancelled task");
                true
            }
            None => false,
        }
    }
}

impl TokioScheduler {
    /// Claim one task slot, respecting the capacity limit
    fn reserve(&self) -> Result<(), ScheduleError> {
        match self.capacity {
            Some(limit) => self
                .reserved
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < limit).then_some(n + 1)
                })
                .map(|_| ())
                .map_err(|_| ScheduleError::CapacityExhausted { limit }),
            None => {
                self.reserved.fetch_add(1, Ordering::AcqRel);
                Ok(())
            }
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            self.shutdown();
        }
    }
}
