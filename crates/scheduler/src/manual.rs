//! Virtual-clock scheduler
//!
//! Time only moves when the owner calls [`ManualScheduler::advance`] (or one of
//! its siblings), which makes timing behavior reproducible in tests and trace
//! replays.

use crate::{ScheduleError, Scheduler, Task, TaskId};
use queue::DeadlineQueue;
use parking_lot::Mutex;
use std::time::Duration;
use tracing::trace;

/// Scheduler driven by an explicit virtual clock
///
/// The clock starts at zero. Due tasks run in deadline order (ties in
/// scheduling order); while a task runs, [`ManualScheduler::now`] reads that
/// task's deadline.
pub struct ManualScheduler {
    state: Mutex<State>,
}

struct State {
    /// Current virtual time
    now: Duration,
    /// Next raw task id
    next_id: u64,
    /// Outstanding tasks
    queue: DeadlineQueue,
    /// Set once `shutdown` ran
    shut_down: bool,
    /// Maximum outstanding tasks
    capacity: Option<usize>,
}

impl ManualScheduler {
    /// Create a scheduler with the clock at zero
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                now: Duration::ZERO,
                next_id: 0,
                queue: DeadlineQueue::default(),
                shut_down: false,
                capacity: None,
            }),
        }
    }

    /// Refuse to hold more than `limit` outstanding tasks
    pub fn with_capacity_limit(self, limit: usize) -> Self {
        self.state.lock().capacity = Some(limit);
        self
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of outstanding tasks
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Deadline of the earliest outstanding task
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.lock().queue.first_deadline()
    }

    /// Move the clock forward by `by`, running every task that falls due
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        self.advance_to(target)
    }

    /// Move the clock to `target`, running every task that falls due
    ///
    /// Tasks scheduled by a running task also run if their deadline is within
    /// `target`. Moving backwards is a no-op.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(Some(target)) {
            task();
            ran += 1;
        }

        let mut state = self.state.lock();
        if state.now < target {
            state.now = target;
        }
        ran
    }

    /// Run tasks until none are left, moving the clock to each deadline
    ///
    /// A task that always reschedules itself keeps this from returning.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(None) {
            task();
            ran += 1;
        }
        ran
    }

    /// Cancel every outstanding task and reject further scheduling
    ///
    /// Returns the number of tasks cancelled.
    pub fn shutdown(&self) -> usize {
        let mut state = self.state.lock();
        state.shut_down = true;
        let cancelled = state.queue.clear();
        trace!(cancelled, "manual scheduler shut down");
        cancelled
    }

    /// Whether `shutdown` has run
    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shut_down
    }

    /// Pop the earliest task due at or before `limit` (any task when `None`)
    ///
    /// The lock is released before the caller runs the task.
    fn pop_due(&self, limit: Option<Duration>) -> Option<Task> {
        let mut state = self.state.lock();
        let deadline = state.queue.first_deadline()?;
        if limit.is_some_and(|limit| deadline > limit) {
            return None;
        }

        let (deadline, id, task) = state.queue.pop_first()?;
        if state.now < deadline {
            state.now = deadline;
        }
        trace!(task = %id, at = ?deadline, "firing virtual task");
        Some(task)
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) -> Result<TaskId, ScheduleError> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(ScheduleError::ShutDown);
        }
        if let Some(limit) = state.capacity {
            if state.queue.len() >= limit {
                return Err(ScheduleError::CapacityExhausted { limit });
            }
        }

        let id = TaskId::from_raw(state.next_id);
        state.next_id += 1;
        // Deadlines past the clock's range park at the end of time
        let deadline = state.now.saturating_add(delay);
        state.queue.insert(deadline, id, task);

        trace!(task = %id, at = ?deadline, "scheduled virtual task");
        Ok(id)
    }

    fn cancel(&self, id: TaskId) -> bool {
        self.state.lock().queue.remove(id)
    }
}

/// Deadline-ordered task storage with removal by id
mod queue {
    use crate::{Task, TaskId};
    use ahash::AHashMap;
    use std::collections::BTreeMap;
    use std::time::Duration;

    #[derive(Default)]
    pub(super) struct DeadlineQueue {
        /// (deadline, id) -> task; ids are monotonic so ties keep scheduling order
        by_deadline: BTreeMap<(Duration, TaskId), Task>,
        /// id -> deadline
        deadlines: AHashMap<TaskId, Duration>,
    }

    impl DeadlineQueue {
        pub fn len(&self) -> usize {
            self.by_deadline.len()
        }

        pub fn first_deadline(&self) -> Option<Duration> {
            self.by_deadline.keys().next().map(|(deadline, _)| *deadline)
        }

        pub fn insert(&mut self, deadline: Duration, id: TaskId, task: Task) {
            self.deadlines.insert(id, deadline);
            self.by_deadline.insert((deadline, id), task);
        }

        pub fn pop_first(&mut self) -> Option<(Duration, TaskId, Task)> {
            let ((deadline, id), task) = self.by_deadline.pop_first()?;
            self.deadlines.remove(&id);
            Some((deadline, id, task))
        }

        pub fn remove(&mut self, id: TaskId) -> bool {
            match self.deadlines.remove(&id) {
                Some(deadline) => self.by_deadline.remove(&(deadline, id)).is_some(),
                None => false,
            }
        }

        pub fn clear(&mut self) -> usize {
            let count = self.by_deadline.len();
            self.by_deadline.clear();
            self.deadlines.clear();
            count
        }
    }
}
