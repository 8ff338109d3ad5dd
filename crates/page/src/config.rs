//! Page behavior configuration
//!
//! Loaded from TOML. Every field is optional and defaults to the values the
//! page script has always used (250ms resize window, 768px breakpoint).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LullConfig {
    pub debounce: DebounceSection,
    pub menu: MenuSection,
    pub feedback: FeedbackSection,
}

/// `[debounce]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebounceSection {
    /// Quiet window for the resize handler (default: 250)
    pub resize_delay_ms: u64,
}

/// `[menu]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuSection {
    /// Widths above this are "desktop" and close the mobile menu (default: 768)
    pub breakpoint_px: u32,
    /// Toggle label while the menu is closed
    pub open_label: String,
    /// Toggle label while the menu is open
    pub close_label: String,
}

/// `[feedback]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackSection {
    /// Scale applied while an external link is pressed (default: 0.95)
    pub press_scale: f64,
    /// Delay before the scale is restored (default: 100)
    pub restore_after_ms: u64,
}

impl Default for DebounceSection {
    fn default() -> Self {
        Self {
            resize_delay_ms: lull_debounce::DEFAULT_RESIZE_DELAY.as_millis() as u64,
        }
    }
}

impl Default for MenuSection {
    fn default() -> Self {
        Self {
            breakpoint_px: 768,
            open_label: "Open menu".to_string(),
            close_label: "Close menu".to_string(),
        }
    }
}

impl Default for FeedbackSection {
    fn default() -> Self {
        Self {
            press_scale: 0.95,
            restore_after_ms: 100,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LullConfig {
    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is within its supported range
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("debounce.resize_delay_ms", self.debounce.resize_delay_ms, 1, 10_000)?;
        check_range("menu.breakpoint_px", u64::from(self.menu.breakpoint_px), 1, 100_000)?;
        check_range("feedback.restore_after_ms", self.feedback.restore_after_ms, 1, 10_000)?;

        let scale = self.feedback.press_scale;
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(ConfigError::Invalid {
                key: "feedback.press_scale",
                reason: format!("{scale} is outside (0, 1]"),
            });
        }

        for (key, label) in [
            ("menu.open_label", &self.menu.open_label),
            ("menu.close_label", &self.menu.close_label),
        ] {
            if label.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "label must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Look up a value by dotted key, rendered as text
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "debounce.resize_delay_ms" => self.debounce.resize_delay_ms.to_string(),
            "menu.breakpoint_px" => self.menu.breakpoint_px.to_string(),
            "menu.open_label" => self.menu.open_label.clone(),
            "menu.close_label" => self.menu.close_label.clone(),
            "feedback.press_scale" => self.feedback.press_scale.to_string(),
            "feedback.restore_after_ms" => self.feedback.restore_after_ms.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> String {
        // Only plain scalars and strings; serialization cannot fail
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Resize debounce window
    pub fn resize_delay(&self) -> Duration {
        Duration::from_millis(self.debounce.resize_delay_ms)
    }

    /// External link press-feedback duration
    pub fn restore_after(&self) -> Duration {
        Duration::from_millis(self.feedback.restore_after_ms)
    }
}

/// Every key `get` understands
pub const KEYS: &[&str] = &[
    "debounce.resize_delay_ms",
    "menu.breakpoint_px",
    "menu.open_label",
    "menu.close_label",
    "feedback.press_scale",
    "feedback.restore_after_ms",
];

fn check_range(key: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("{value} is outside {min}-{max}"),
        })
    }
}
