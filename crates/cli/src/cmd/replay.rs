//! `lull replay` - run a recorded trace through the page behaviors

use anyhow::Result;
use lull_cli::util::{format_offset, load_config};
use lull_cli::{replay, replay_realtime, TimedEffect, Trace};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(
    trace_path: &Path,
    config_path: Option<&Path>,
    realtime: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let trace = Trace::load(trace_path)?;

    let effects = if realtime {
        replay_realtime(&trace, config).await?
    } else {
        replay(&trace, config)?
    };

    if json {
        for timed in &effects {
            println!("{}", serde_json::to_string(timed)?);
        }
        return Ok(());
    }

    print_effects(&effects, trace.events.len());
    Ok(())
}

fn print_effects(effects: &[TimedEffect], event_count: usize) {
    println!(
        "{} {} events, {} effects",
        "Replay".bold(),
        event_count,
        effects.len()
    );

    for timed in effects {
        println!(
            "  {:>9}  {}",
            format_offset(timed.at()).dimmed(),
            timed.effect
        );
    }
}
