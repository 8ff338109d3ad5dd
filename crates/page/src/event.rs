//! Page events and the effects they produce

use serde::{Deserialize, Serialize};
use std::fmt;

/// An input event delivered to the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEvent {
    /// Pointer (or synthesized) click on an element
    Click { target: String },
    /// Key press, optionally on a focused element
    KeyDown {
        #[serde(default)]
        target: Option<String>,
        key: Key,
    },
    /// Window resized to `width` CSS pixels
    Resize { width: u32 },
}

/// Keyboard key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other(String),
}

impl Key {
    /// Keys that activate a focused link or button
    pub fn activates(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Enter" => Key::Enter,
            " " | "Space" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other(name),
        }
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        match key {
            Key::Enter => "Enter".to_string(),
            Key::Space => "Space".to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Other(name) => name,
        }
    }
}

/// Why the menu changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuReason {
    Toggle,
    LinkClicked,
    Escape,
    Resize,
    DebouncedResize,
}

/// How `ScrollIntoView` animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
}

/// Vertical alignment for `ScrollIntoView`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBlock {
    Start,
}

/// An observable change the page made in response to events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Menu list toggled; toggle gets `aria-expanded = active` and `aria_label`
    MenuChanged {
        active: bool,
        aria_label: String,
        reason: MenuReason,
    },
    /// Focus moved to an element
    Focus { target: String },
    /// Keyboard activation re-dispatched as a click
    Click { target: String },
    /// Default navigation suppressed
    PreventDefault { target: String },
    /// Element scrolled into view
    ScrollIntoView {
        target: String,
        behavior: ScrollBehavior,
        block: ScrollBlock,
    },
    /// Element `transform: scale(..)` set
    SetScale { target: String, scale: f64 },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::MenuChanged {
                active,
                aria_label,
                reason,
            } => write!(
                f,
                "menu {} ({:?}) aria-expanded={} aria-label=\"{}\"",
                if *active { "opened" } else { "closed" },
                reason,
                active,
                aria_label
            ),
            Effect::Focus { target } => write!(f, "focus #{target}"),
            Effect::Click { target } => write!(f, "click #{target}"),
            Effect::PreventDefault { target } => write!(f, "prevent default on #{target}"),
            Effect::ScrollIntoView { target, .. } => {
                write!(f, "scroll #{target} into view (smooth, start)")
            }
            Effect::SetScale { target, scale } => write!(f, "#{target} transform: scale({scale})"),
        }
    }
}
