//! Delayed-task scheduling for Lull
//!
//! This crate provides the timer capability that debouncers are built on:
//! - "Run this after N unless cancelled first" ([`Scheduler::schedule_after`])
//! - "Cancel a previously scheduled run by handle" ([`Scheduler::cancel`])
//! - A tokio-backed real-time scheduler ([`TokioScheduler`])
//! - A virtual-clock scheduler for deterministic tests and replays ([`ManualScheduler`])

pub mod manual;
pub mod realtime;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// Re-exports
pub use manual::ManualScheduler;
pub use realtime::TokioScheduler;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled task
///
/// Ids are unique per scheduler instance and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Build an id from a raw sequence number
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw sequence number
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Scheduling errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The scheduler was shut down and accepts no new work
    #[error("scheduler has been shut down")]
    ShutDown,

    /// No async runtime to drive timers
    #[error("no async runtime available: {0}")]
    NoRuntime(String),

    /// Too many tasks outstanding
    #[error("scheduler capacity exhausted ({limit} pending tasks)")]
    CapacityExhausted { limit: usize },
}

/// Timer capability
///
/// Implementations must guarantee that once [`Scheduler::cancel`] returns
/// `true` the task never runs, and that tasks are never run while an
/// implementation lock is held (a task may schedule or cancel).
pub trait Scheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed, unless cancelled first
    fn schedule_after(&self, delay: Duration, task: Task) -> Result<TaskId, ScheduleError>;

    /// Cancel a scheduled task
    ///
    /// Returns `false` if the id is unknown, already fired or already cancelled.
    fn cancel(&self, id: TaskId) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule_after(&self, delay: Duration, task: Task) -> Result<TaskId, ScheduleError> {
        (**self).schedule_after(delay, task)
    }

    fn cancel(&self, id: TaskId) -> bool {
        (**self).cancel(id)
    }
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    fn schedule_after(&self, delay: Duration, task: Task) -> Result<TaskId, ScheduleError> {
        (**self).schedule_after(delay, task)
    }

    fn cancel(&self, id: TaskId) -> bool {
        (**self).cancel(id)
    }
}
