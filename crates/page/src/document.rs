//! Static description of the page's elements

use serde::{Deserialize, Serialize};

/// Id of the mobile menu toggle button
pub const MENU_TOGGLE_ID: &str = "menu-toggle";

/// Elements the page behavior cares about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Document {
    /// Ids of scroll targets (sections, headings)
    pub ids: Vec<String>,
    /// Every link on the page
    pub links: Vec<Link>,
    /// Ids of buttons other than the menu toggle
    pub buttons: Vec<String>,
    /// Whether the page has both the menu toggle and the menu list
    pub menu: bool,
}

/// An `<a>` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub id: String,
    pub href: String,
    /// Opens in a new tab (`target="_blank"`)
    #[serde(default)]
    pub external: bool,
    /// Lives inside the navigation bar
    #[serde(default)]
    pub in_menu: bool,
}

impl Link {
    /// Fragment id for in-page anchors (`#about` -> `about`)
    pub fn anchor(&self) -> Option<&str> {
        self.href.strip_prefix('#')
    }
}

impl Document {
    /// Find a link by id
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.id == id)
    }

    /// Whether an element with this id exists
    pub fn has_id(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
            || self.links.iter().any(|link| link.id == id)
            || self.buttons.iter().any(|button| button == id)
            || (self.menu && id == MENU_TOGGLE_ID)
    }

    /// Whether `id` is a link or button (keyboard-activatable)
    pub fn is_activatable(&self, id: &str) -> bool {
        self.link(id).is_some()
            || self.buttons.iter().any(|button| button == id)
            || (self.menu && id == MENU_TOGGLE_ID)
    }
}
