//! Debouncing for Lull
//!
//! This crate provides:
//! - [`Debounced`]: delays an action until calls have been quiet for a window,
//!   then runs it once with the arguments of the last call
//! - [`KeyedDebouncer`]: the same contract tracked independently per key
//!
//! Timers come from an injected [`Scheduler`]; nothing here owns a global clock.

pub mod debounced;
pub mod keyed;

use lull_scheduler::TaskId;

// Re-exports
pub use debounced::{make_debounced, Debounced};
pub use keyed::KeyedDebouncer;
pub use lull_scheduler::{ScheduleError, Scheduler};

/// Default window for window-resize handlers
pub const DEFAULT_RESIZE_DELAY: std::time::Duration = std::time::Duration::from_millis(250);

/// Errors returned when requesting an invocation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebounceError {
    /// The debouncer was closed and accepts no further calls
    #[error("debouncer is closed")]
    Closed,

    /// The scheduler refused the timer
    #[error("failed to schedule invocation: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Result type for debounce operations
pub type Result<T> = std::result::Result<T, DebounceError>;

/// The single outstanding invocation of a debounce slot
struct Pending<A> {
    /// Generation the timer was armed for
    generation: u64,
    /// Scheduler handle of the timer
    task: TaskId,
    /// Arguments of the call that armed it
    args: A,
}
