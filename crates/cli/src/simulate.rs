//! Debounce burst simulation on a virtual clock

use anyhow::{bail, Result};
use lull_debounce::make_debounced;
use lull_scheduler::ManualScheduler;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// One run of the debounced action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Firing {
    /// Virtual time of the run
    pub at_ms: u64,
    /// Index (into the call list) of the call whose arguments were used
    pub call: usize,
}

/// Call a debounced action at each offset in `calls_ms` and report every run
///
/// Offsets must be non-decreasing.
pub fn simulate(delay: Duration, calls_ms: &[u64]) -> Result<Vec<Firing>> {
    if let Some(pair) = calls_ms.windows(2).find(|pair| pair[1] < pair[0]) {
        bail!("Call offsets must be non-decreasing ({}ms after {}ms)", pair[1], pair[0]);
    }

    let sched = Arc::new(ManualScheduler::new());
    let firings = Arc::new(Mutex::new(Vec::new()));

    let (clock, sink) = (Arc::clone(&sched), Arc::clone(&firings));
    let debounced = make_debounced(
        move |call: usize| {
            let at_ms = u64::try_from(clock.now().as_millis()).unwrap_or(u64::MAX);
            sink.lock().push(Firing { at_ms, call });
        },
        delay,
        sched.clone(),
    );

    for (index, at_ms) in calls_ms.iter().enumerate() {
        sched.advance_to(Duration::from_millis(*at_ms));
        debounced.call(index)?;
    }
    sched.run_until_idle();

    let result = firings.lock().clone();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_fires_last_call_once() {
        let firings = simulate(ms(250), &[0, 100, 200]).unwrap();
        assert_eq!(firings, vec![Firing { at_ms: 450, call: 2 }]);
    }

    #[test]
    fn test_single_call() {
        let firings = simulate(ms(250), &[0]).unwrap();
        assert_eq!(firings, vec![Firing { at_ms: 250, call: 0 }]);
    }

    #[test]
    fn test_two_bursts() {
        let firings = simulate(ms(250), &[0, 10, 600, 700]).unwrap();
        assert_eq!(
            firings,
            vec![Firing { at_ms: 260, call: 1 }, Firing { at_ms: 950, call: 3 }]
        );
    }

    #[test]
    fn test_gap_equal_to_window_splits_burst() {
        let firings = simulate(ms(250), &[0, 250]).unwrap();
        assert_eq!(
            firings,
            vec![Firing { at_ms: 250, call: 0 }, Firing { at_ms: 500, call: 1 }]
        );
    }

    #[test]
    fn test_unordered_calls_rejected() {
        assert!(simulate(ms(250), &[100, 50]).is_err());
    }

    #[test]
    fn test_no_calls() {
        assert!(simulate(ms(250), &[]).unwrap().is_empty());
    }
}
