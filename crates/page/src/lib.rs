//! Headless page behavior for Lull
//!
//! Models the enhancements a static page wires onto its DOM:
//! - Mobile navigation menu (toggle, close on link/Escape/wide resize)
//! - Keyboard activation of links and buttons (Enter/Space)
//! - Smooth scrolling for in-page anchors
//! - Press feedback on external links
//! - Debounced window-resize handling
//!
//! Events go in, [`Effect`]s come out; deferred effects are produced by the
//! injected scheduler.

pub mod config;
pub mod document;
pub mod event;
pub mod menu;
pub mod page;

// Re-exports
pub use config::{ConfigError, LullConfig};
pub use document::{Document, Link};
pub use event::{Effect, Key, MenuReason, PageEvent, ScrollBehavior, ScrollBlock};
pub use menu::NavMenu;
pub use page::Page;

use lull_debounce::DebounceError;
use lull_scheduler::ScheduleError;

/// Errors from dispatching page events
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The resize debouncer refused the call
    #[error(transparent)]
    Debounce(#[from] DebounceError),

    /// A deferred effect could not be scheduled
    #[error("failed to schedule deferred effect: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Result type for page operations
pub type Result<T> = std::result::Result<T, PageError>;
