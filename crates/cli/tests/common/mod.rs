//! Common utilities for integration tests

pub mod cli;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Navigation page with a menu, two sections and an external link
pub const NAV_TRACE: &str = r##"
[document]
ids = ["about", "contact"]
menu = true

[[document.links]]
id = "nav-about"
href = "#about"
in_menu = true

[[document.links]]
id = "repo"
href = "https://example.org"
external = true

[[events]]
at_ms = 0
kind = "click"
target = "menu-toggle"

[[events]]
at_ms = 40
kind = "click"
target = "nav-about"

[[events]]
at_ms = 60
kind = "key_down"
target = "repo"
key = "Enter"

[[events]]
at_ms = 200
kind = "click"
target = "menu-toggle"

[[events]]
at_ms = 220
kind = "resize"
width = 1280

[[events]]
at_ms = 300
kind = "click"
target = "menu-toggle"
"##;

/// Scratch directory holding trace and config files
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the workspace
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }
}
