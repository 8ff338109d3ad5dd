//! Mobile navigation menu state

use crate::config::MenuSection;
use crate::event::{Effect, MenuReason};

/// Open/closed state of the mobile menu and its toggle's ARIA attributes
#[derive(Debug, Clone)]
pub struct NavMenu {
    active: bool,
    open_label: String,
    close_label: String,
}

impl NavMenu {
    /// Closed menu with the configured labels
    pub fn new(config: &MenuSection) -> Self {
        Self {
            active: false,
            open_label: config.open_label.clone(),
            close_label: config.close_label.clone(),
        }
    }

    /// Whether the menu list is shown
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `aria-expanded` of the toggle
    pub fn aria_expanded(&self) -> bool {
        self.active
    }

    /// `aria-label` of the toggle: what pressing it would do
    pub fn aria_label(&self) -> &str {
        if self.active {
            &self.close_label
        } else {
            &self.open_label
        }
    }

    /// Flip the menu
    pub fn toggle(&mut self) -> Effect {
        self.active = !self.active;
        self.changed(MenuReason::Toggle)
    }

    /// Close the menu; `None` when it was already closed
    pub fn close(&mut self, reason: MenuReason) -> Option<Effect> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.changed(reason))
    }

    fn changed(&self, reason: MenuReason) -> Effect {
        Effect::MenuChanged {
            active: self.active,
            aria_label: self.aria_label().to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_updates_aria() {
        let mut menu = NavMenu::new(&MenuSection::default());
        assert!(!menu.aria_expanded());
        assert_eq!(menu.aria_label(), "Open menu");

        let effect = menu.toggle();
        assert!(menu.is_active());
        assert_eq!(menu.aria_label(), "Close menu");
        assert_eq!(
            effect,
            Effect::MenuChanged {
                active: true,
                aria_label: "Close menu".to_string(),
                reason: MenuReason::Toggle,
            }
        );

        menu.toggle();
        assert!(!menu.is_active());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut menu = NavMenu::new(&MenuSection::default());
        assert_eq!(menu.close(MenuReason::Escape), None);

        menu.toggle();
        assert!(menu.close(MenuReason::Escape).is_some());
        assert_eq!(menu.close(MenuReason::Escape), None);
        assert_eq!(menu.aria_label(), "Open menu");
    }
}
