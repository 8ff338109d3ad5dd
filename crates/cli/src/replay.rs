//! Trace replay
//!
//! Drives a [`Page`] through a recorded trace, either on a virtual clock
//! (instant, deterministic) or on the tokio clock in real time.

use crate::trace::Trace;
use anyhow::{Context, Result};
use lull_page::{Effect, LullConfig, Page};
use lull_scheduler::{ManualScheduler, TokioScheduler};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Poll interval for collecting deferred effects in real-time replays
const REALTIME_TICK: Duration = Duration::from_millis(5);

/// An effect and when it happened, relative to the start of the trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedEffect {
    pub at_ms: u64,
    #[serde(flatten)]
    pub effect: Effect,
}

impl TimedEffect {
    pub fn at(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

/// Replay `trace` on a virtual clock
///
/// Timers due at or before an event's timestamp fire before the event is
/// dispatched. After the last event, the clock runs until nothing is pending.
pub fn replay(trace: &Trace, config: LullConfig) -> Result<Vec<TimedEffect>> {
    let sched = Arc::new(ManualScheduler::new());
    let page = Page::new(trace.document.clone(), config, sched.clone());
    let mut out = Vec::new();

    for timed in &trace.events {
        let at = Duration::from_millis(timed.at_ms);
        fire_timers_until(&sched, &page, Some(at), &mut out);
        sched.advance_to(at);

        page.handle(&timed.event)
            .with_context(|| format!("Failed to dispatch event at {}ms", timed.at_ms))?;
        collect(&page, at, &mut out);
    }

    fire_timers_until(&sched, &page, None, &mut out);
    page.close();

    debug!(events = trace.events.len(), effects = out.len(), "replay finished");
    Ok(out)
}

/// Replay `trace` in real time on the current tokio runtime
///
/// Timestamps are measured, so they can trail the trace by a few ticks.
pub async fn replay_realtime(trace: &Trace, config: LullConfig) -> Result<Vec<TimedEffect>> {
    let sched = Arc::new(TokioScheduler::current().context("Real-time replay needs a runtime")?);
    let page = Page::new(trace.document.clone(), config, sched.clone());
    let start = tokio::time::Instant::now();
    let mut out = Vec::new();

    for timed in &trace.events {
        let due = start + Duration::from_millis(timed.at_ms);
        while tokio::time::Instant::now() < due {
            let tick = (tokio::time::Instant::now() + REALTIME_TICK).min(due);
            tokio::time::sleep_until(tick).await;
            collect(&page, start.elapsed(), &mut out);
        }

        page.handle(&timed.event)
            .with_context(|| format!("Failed to dispatch event at {}ms", timed.at_ms))?;
        collect(&page, start.elapsed(), &mut out);
    }

    while sched.pending() > 0 {
        tokio::time::sleep(REALTIME_TICK).await;
        collect(&page, start.elapsed(), &mut out);
    }
    page.close();

    Ok(out)
}

/// Run virtual timers one deadline at a time so each effect gets its own timestamp
fn fire_timers_until(
    sched: &ManualScheduler,
    page: &Page,
    limit: Option<Duration>,
    out: &mut Vec<TimedEffect>,
) {
    while let Some(deadline) = sched.next_deadline() {
        if limit.is_some_and(|limit| deadline > limit) {
            break;
        }
        sched.advance_to(deadline);
        collect(page, deadline, out);
    }
}

fn collect(page: &Page, at: Duration, out: &mut Vec<TimedEffect>) {
    let at_ms = u64::try_from(at.as_millis()).unwrap_or(u64::MAX);
    out.extend(
        page.drain_effects()
            .into_iter()
            .map(|effect| TimedEffect { at_ms, effect }),
    );
}
