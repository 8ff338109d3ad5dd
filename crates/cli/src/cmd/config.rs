//! `lull config` - inspect the effective configuration

use anyhow::Result;
use lull_cli::util::load_config;
use lull_page::config::KEYS;
use lull_page::LullConfig;
use owo_colors::OwoColorize;
use std::path::Path;

/// List all configuration values
pub async fn run_list(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("{}", "Configuration".bold());
    match config_path {
        Some(path) => println!("{}: {}\n", "Location".dimmed(), path.display().dimmed()),
        None => println!("{}\n", "(built-in defaults)".dimmed()),
    }

    println!("{}", "[debounce]".yellow());
    println!(
        "  {} = {} {}",
        "resize_delay_ms".cyan(),
        config.debounce.resize_delay_ms,
        format!("({:?})", config.resize_delay()).dimmed()
    );

    println!("\n{}", "[menu]".yellow());
    println!("  {} = {}", "breakpoint_px".cyan(), config.menu.breakpoint_px);
    println!("  {} = {:?}", "open_label".cyan(), config.menu.open_label);
    println!("  {} = {:?}", "close_label".cyan(), config.menu.close_label);

    println!("\n{}", "[feedback]".yellow());
    println!("  {} = {}", "press_scale".cyan(), config.feedback.press_scale);
    println!(
        "  {} = {} {}",
        "restore_after_ms".cyan(),
        config.feedback.restore_after_ms,
        format!("({:?})", config.restore_after()).dimmed()
    );

    println!("\n{}", "Valid Ranges:".bold());
    println!("  resize_delay_ms: 1-10,000");
    println!("  breakpoint_px: 1-100,000");
    println!("  press_scale: (0, 1]");
    println!("  restore_after_ms: 1-10,000");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    match config.get(key) {
        Some(value) => println!("{}", value),
        None => anyhow::bail!(
            "Unknown config key: {}. Valid keys: {}",
            key,
            KEYS.join(", ")
        ),
    }
    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", LullConfig::default().to_toml_string());
    Ok(())
}
