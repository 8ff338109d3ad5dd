//! `lull simulate` - show how a burst of calls is debounced

use anyhow::Result;
use lull_cli::simulate;
use lull_cli::util::load_config;
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

pub async fn run(
    delay_ms: Option<u64>,
    calls_ms: &[u64],
    config_path: Option<&Path>,
) -> Result<()> {
    let delay = match delay_ms {
        Some(ms) => Duration::from_millis(ms),
        None => load_config(config_path)?.resize_delay(),
    };

    let firings = simulate(delay, calls_ms)?;

    println!(
        "{} {} calls, {}ms window",
        "Simulate".bold(),
        calls_ms.len(),
        delay.as_millis()
    );
    for (index, at_ms) in calls_ms.iter().enumerate() {
        println!("  {:>7}  call #{}", format!("+{at_ms}ms").dimmed(), index);
    }

    if firings.is_empty() {
        println!("{}", "No firings".yellow());
    }
    for firing in &firings {
        println!(
            "  {:>7}  {} with args of call #{}",
            format!("+{}ms", firing.at_ms).dimmed(),
            "fired".green(),
            firing.call
        );
    }

    Ok(())
}
