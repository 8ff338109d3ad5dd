//! Lull CLI library
//!
//! The `lull` binary is a thin layer over these modules so the replay and
//! simulation logic can be exercised without spawning a process.

pub mod replay;
pub mod simulate;
pub mod trace;
pub mod util;

pub use replay::{replay, replay_realtime, TimedEffect};
pub use simulate::{simulate, Firing};
pub use trace::{TimedEvent, Trace};
