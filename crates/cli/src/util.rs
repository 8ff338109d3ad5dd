//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use lull_page::LullConfig;
use std::path::Path;
use std::time::Duration;

/// Load the config file if one was given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<LullConfig> {
    match path {
        Some(path) => LullConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(LullConfig::default()),
    }
}

/// Format a virtual timestamp as `+1234ms`
pub fn format_offset(at: Duration) -> String {
    format!("+{}ms", at.as_millis())
}
