//! Recorded page-event traces
//!
//! A trace is the document description plus a list of timestamped events,
//! stored as TOML or JSON (picked by file extension).

use anyhow::{Context, Result};
use lull_page::{Document, PageEvent};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A recorded session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    pub document: Document,
    pub events: Vec<TimedEvent>,
}

/// An event and the millisecond offset it happened at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: PageEvent,
}

impl Trace {
    /// Load a trace file
    ///
    /// `.json` files are parsed as JSON, everything else as TOML. Events are
    /// ordered by timestamp; events sharing a timestamp keep file order.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut trace: Trace = if is_json {
            serde_json::from_str(&text).context("Failed to parse JSON trace")?
        } else {
            toml::from_str(&text).context("Failed to parse TOML trace")?
        };

        trace.events.sort_by_key(|event| event.at_ms);
        Ok(trace)
    }
}
