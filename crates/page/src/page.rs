//! Event dispatch for a page
//!
//! Listener order per event matches the order the page script registers them:
//! menu handlers first, then keyboard activation, smooth scrolling and link
//! feedback.

use crate::config::LullConfig;
use crate::document::{Document, MENU_TOGGLE_ID};
use crate::event::{Effect, Key, MenuReason, PageEvent, ScrollBehavior, ScrollBlock};
use crate::menu::NavMenu;
use crate::Result;
use lull_debounce::{make_debounced, Debounced};
use lull_scheduler::{Scheduler, TaskId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

type EffectLog = Arc<Mutex<Vec<Effect>>>;

/// A page with its behaviors installed
pub struct Page {
    config: LullConfig,
    document: Document,
    /// Present only when the document has the toggle and the list
    menu: Option<Arc<Mutex<NavMenu>>>,
    /// Debounced resize listener, argument is the window width
    resize: Debounced<u32>,
    scheduler: Arc<dyn Scheduler>,
    /// Every effect, synchronous and deferred, in the order produced
    log: EffectLog,
    /// Outstanding press-feedback restores, by sequence number
    restores: Arc<Mutex<BTreeMap<u64, TaskId>>>,
    next_restore: AtomicU64,
}

impl Page {
    /// Install the page behaviors on `document`
    pub fn new(document: Document, config: LullConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let log: EffectLog = Arc::new(Mutex::new(Vec::new()));
        let menu = document
            .menu
            .then(|| Arc::new(Mutex::new(NavMenu::new(&config.menu))));

        let resize = {
            let menu = menu.clone();
            let log = Arc::clone(&log);
            let breakpoint = config.menu.breakpoint_px;
            make_debounced(
                move |width: u32| {
                    if width <= breakpoint {
                        return;
                    }
                    let Some(menu) = &menu else {
                        return;
                    };
                    let closed = menu.lock().close(MenuReason::DebouncedResize);
                    if let Some(effect) = closed {
                        debug!(width, "debounced resize closed the menu");
                        log.lock().push(effect);
                    }
                },
                config.resize_delay(),
                Arc::clone(&scheduler),
            )
        };

        info!(menu = menu.is_some(), "page script loaded");

        Self {
            config,
            document,
            menu,
            resize,
            scheduler,
            log,
            restores: Arc::new(Mutex::new(BTreeMap::new())),
            next_restore: AtomicU64::new(0),
        }
    }

    /// Dispatch one event
    ///
    /// Returns the effects produced synchronously. They are also appended to
    /// the effect log, where deferred effects land when their timers fire.
    pub fn handle(&self, event: &PageEvent) -> Result<Vec<Effect>> {
        let mut effects = Vec::new();
        let outcome = self.dispatch(event, &mut effects);

        // Effects already applied stay applied even if a later listener failed
        self.log.lock().extend(effects.iter().cloned());
        outcome.map(|()| effects)
    }

    /// Take every effect logged so far
    pub fn drain_effects(&self) -> Vec<Effect> {
        std::mem::take(&mut *self.log.lock())
    }

    /// Menu state, `None` when the page has no menu
    pub fn menu_active(&self) -> Option<bool> {
        self.menu.as_ref().map(|menu| menu.lock().is_active())
    }

    /// Whether a debounced resize is waiting to run
    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// Tear the page down: nothing scheduled by it runs afterwards
    pub fn close(&self) {
        self.resize.close();

        let restores = std::mem::take(&mut *self.restores.lock());
        let cancelled = restores
            .into_values()
            .filter(|task| self.scheduler.cancel(*task))
            .count();
        debug!(cancelled, "page closed");
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &LullConfig {
        &self.config
    }

    fn dispatch(&self, event: &PageEvent, effects: &mut Vec<Effect>) -> Result<()> {
        match event {
            PageEvent::Click { target } => self.on_click(target, effects),
            PageEvent::KeyDown { target, key } => self.on_key_down(target.as_deref(), key, effects),
            PageEvent::Resize { width } => self.on_resize(*width, effects),
        }
    }

    fn on_click(&self, target: &str, effects: &mut Vec<Effect>) -> Result<()> {
        if let Some(menu) = &self.menu {
            if target == MENU_TOGGLE_ID {
                effects.push(menu.lock().toggle());
            }
        }

        let Some(link) = self.document.link(target) else {
            if !self.document.has_id(target) {
                warn!(target, "click on unknown element");
            }
            return Ok(());
        };

        if link.in_menu {
            if let Some(menu) = &self.menu {
                effects.extend(menu.lock().close(MenuReason::LinkClicked));
            }
        }

        if let Some(anchor) = link.anchor() {
            effects.push(Effect::PreventDefault {
                target: link.id.clone(),
            });
            if self.document.has_id(anchor) {
                effects.push(Effect::ScrollIntoView {
                    target: anchor.to_string(),
                    behavior: ScrollBehavior::Smooth,
                    block: ScrollBlock::Start,
                });
            } else {
                warn!(link = %link.id, anchor, "anchor target not found");
            }
        }

        if link.external {
            self.press_feedback(&link.id, effects)?;
        }

        Ok(())
    }

    fn on_key_down(
        &self,
        target: Option<&str>,
        key: &Key,
        effects: &mut Vec<Effect>,
    ) -> Result<()> {
        if let Some(target) = target {
            if key.activates() && self.document.is_activatable(target) {
                effects.push(Effect::Click {
                    target: target.to_string(),
                });
                self.on_click(target, effects)?;
            }
        }

        if *key == Key::Escape {
            if let Some(menu) = &self.menu {
                let closed = menu.lock().close(MenuReason::Escape);
                if let Some(effect) = closed {
                    effects.push(effect);
                    effects.push(Effect::Focus {
                        target: MENU_TOGGLE_ID.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn on_resize(&self, width: u32, effects: &mut Vec<Effect>) -> Result<()> {
        if width > self.config.menu.breakpoint_px {
            if let Some(menu) = &self.menu {
                effects.extend(menu.lock().close(MenuReason::Resize));
            }
        }

        self.resize.call(width)?;
        Ok(())
    }

    /// Shrink an external link now and restore it after the feedback delay
    fn press_feedback(&self, target: &str, effects: &mut Vec<Effect>) -> Result<()> {
        effects.push(Effect::SetScale {
            target: target.to_string(),
            scale: self.config.feedback.press_scale,
        });

        let seq = self.next_restore.fetch_add(1, Ordering::Relaxed);
        let log = Arc::clone(&self.log);
        let restores = Arc::clone(&self.restores);
        let target = target.to_string();

        // Held until the entry is recorded, so a restore firing on another
        // thread always finds its own entry to remove
        let mut outstanding = self.restores.lock();
        let task = self.scheduler.schedule_after(
            self.config.restore_after(),
            Box::new(move || {
                restores.lock().remove(&seq);
                log.lock().push(Effect::SetScale { target, scale: 1.0 });
            }),
        )?;
        outstanding.insert(seq, task);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Link;
    use crate::PageError;
    use lull_debounce::DebounceError;
    use lull_scheduler::{ManualScheduler, ScheduleError};
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn document() -> Document {
        Document {
            ids: vec!["about".into(), "contact".into()],
            links: vec![
                Link {
                    id: "nav-about".into(),
                    href: "#about".into(),
                    external: false,
                    in_menu: true,
                },
                Link {
                    id: "nav-missing".into(),
                    href: "#missing".into(),
                    external: false,
                    in_menu: true,
                },
                Link {
                    id: "repo".into(),
                    href: "https://example.org".into(),
                    external: true,
                    in_menu: false,
                },
            ],
            buttons: vec![],
            menu: true,
        }
    }

    fn page() -> (Arc<ManualScheduler>, Page) {
        let sched = Arc::new(ManualScheduler::new());
        let page = Page::new(document(), LullConfig::default(), sched.clone());
        (sched, page)
    }

    fn click(target: &str) -> PageEvent {
        PageEvent::Click {
            target: target.to_string(),
        }
    }

    fn key(target: Option<&str>, key: Key) -> PageEvent {
        PageEvent::KeyDown {
            target: target.map(str::to_string),
            key,
        }
    }

    fn menu_changed(active: bool, reason: MenuReason) -> Effect {
        Effect::MenuChanged {
            active,
            aria_label: if active { "Close menu" } else { "Open menu" }.to_string(),
            reason,
        }
    }

    #[test]
    fn test_toggle_and_escape() {
        let (_sched, page) = page();

        let effects = page.handle(&click(MENU_TOGGLE_ID)).unwrap();
        assert_eq!(effects, vec![menu_changed(true, MenuReason::Toggle)]);
        assert_eq!(page.menu_active(), Some(true));

        let effects = page.handle(&key(None, Key::Escape)).unwrap();
        assert_eq!(
            effects,
            vec![
                menu_changed(false, MenuReason::Escape),
                Effect::Focus {
                    target: MENU_TOGGLE_ID.to_string()
                },
            ]
        );

        // Escape with the menu closed does nothing
        assert!(page.handle(&key(None, Key::Escape)).unwrap().is_empty());
    }

    #[test]
    fn test_menu_link_closes_and_scrolls() {
        let (_sched, page) = page();
        page.handle(&click(MENU_TOGGLE_ID)).unwrap();

        let effects = page.handle(&click("nav-about")).unwrap();
        assert_eq!(
            effects,
            vec![
                menu_changed(false, MenuReason::LinkClicked),
                Effect::PreventDefault {
                    target: "nav-about".into()
                },
                Effect::ScrollIntoView {
                    target: "about".into(),
                    behavior: ScrollBehavior::Smooth,
                    block: ScrollBlock::Start,
                },
            ]
        );
    }

    #[test]
    fn test_missing_anchor_only_prevents_default() {
        let (_sched, page) = page();
        let effects = page.handle(&click("nav-missing")).unwrap();
        assert_eq!(
            effects,
            vec![Effect::PreventDefault {
                target: "nav-missing".into()
            }]
        );
    }

    #[test]
    fn test_external_link_feedback() {
        let (sched, page) = page();

        let effects = page.handle(&click("repo")).unwrap();
        assert_eq!(
            effects,
            vec![Effect::SetScale {
                target: "repo".into(),
                scale: 0.95
            }]
        );
        page.drain_effects();

        sched.advance(ms(99));
        assert!(page.drain_effects().is_empty());
        sched.advance(ms(1));
        assert_eq!(
            page.drain_effects(),
            vec![Effect::SetScale {
                target: "repo".into(),
                scale: 1.0
            }]
        );
    }

    #[test]
    fn test_keyboard_activation() {
        let (_sched, page) = page();

        let effects = page.handle(&key(Some(MENU_TOGGLE_ID), Key::Space)).unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::Click {
                    target: MENU_TOGGLE_ID.into()
                },
                menu_changed(true, MenuReason::Toggle),
            ]
        );

        let effects = page.handle(&key(Some("nav-about"), Key::Enter)).unwrap();
        assert_eq!(effects[0], Effect::Click { target: "nav-about".into() });
        assert_eq!(effects[1], menu_changed(false, MenuReason::LinkClicked));

        // Sections are not activatable
        assert!(page.handle(&key(Some("about"), Key::Enter)).unwrap().is_empty());
        // Other keys do nothing
        assert!(page
            .handle(&key(Some("repo"), Key::Other("a".into())))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_wide_resize_closes_immediately_and_debounced() {
        let (sched, page) = page();
        page.handle(&click(MENU_TOGGLE_ID)).unwrap();

        let effects = page.handle(&PageEvent::Resize { width: 1024 }).unwrap();
        assert_eq!(effects, vec![menu_changed(false, MenuReason::Resize)]);
        assert!(page.resize_pending());

        // Reopened inside the window: the debounced handler closes it again
        sched.advance_to(ms(100));
        page.handle(&click(MENU_TOGGLE_ID)).unwrap();
        page.drain_effects();

        sched.advance_to(ms(249));
        assert!(page.drain_effects().is_empty());
        sched.advance_to(ms(250));
        assert_eq!(
            page.drain_effects(),
            vec![menu_changed(false, MenuReason::DebouncedResize)]
        );
        assert_eq!(page.menu_active(), Some(false));
    }

    #[test]
    fn test_resize_burst_uses_last_width() {
        let (sched, page) = page();
        page.handle(&click(MENU_TOGGLE_ID)).unwrap();

        page.handle(&PageEvent::Resize { width: 900 }).unwrap();
        page.handle(&click(MENU_TOGGLE_ID)).unwrap();
        sched.advance_to(ms(100));
        // Last width is narrow, so the debounced handler leaves the menu open
        page.handle(&PageEvent::Resize { width: 400 }).unwrap();
        sched.run_until_idle();

        assert_eq!(sched.now(), ms(350));
        assert_eq!(page.menu_active(), Some(true));
    }

    #[test]
    fn test_page_without_menu() {
        let sched = Arc::new(ManualScheduler::new());
        let mut doc = document();
        doc.menu = false;
        let page = Page::new(doc, LullConfig::default(), sched.clone());

        assert!(page.handle(&click(MENU_TOGGLE_ID)).unwrap().is_empty());
        assert!(page.handle(&PageEvent::Resize { width: 2000 }).unwrap().is_empty());
        sched.run_until_idle();
        assert!(page.drain_effects().is_empty());
        assert_eq!(page.menu_active(), None);
    }

    #[test]
    fn test_close_cancels_deferred_work() {
        let (sched, page) = page();
        page.handle(&click(MENU_TOGGLE_ID)).unwrap();
        page.handle(&PageEvent::Resize { width: 500 }).unwrap();
        page.handle(&click("repo")).unwrap();
        assert_eq!(sched.pending(), 2);

        page.close();
        assert_eq!(sched.pending(), 0);
        assert_eq!(
            page.handle(&PageEvent::Resize { width: 500 }),
            Err(PageError::Debounce(DebounceError::Closed))
        );
    }

    #[test]
    fn test_schedule_failure_surfaces() {
        let (sched, page) = page();
        sched.shutdown();

        assert_eq!(
            page.handle(&PageEvent::Resize { width: 500 }),
            Err(PageError::Debounce(DebounceError::Schedule(ScheduleError::ShutDown)))
        );
        assert_eq!(
            page.handle(&click("repo")),
            Err(PageError::Schedule(ScheduleError::ShutDown))
        );
        // The press effect was still applied
        assert!(page.drain_effects().contains(&Effect::SetScale {
            target: "repo".into(),
            scale: 0.95
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_restores_leave_no_entries() {
        let sched = Arc::new(lull_scheduler::TokioScheduler::current().unwrap());
        let page = Page::new(document(), LullConfig::default(), sched.clone());

        page.handle(&click("repo")).unwrap();
        page.handle(&click("repo")).unwrap();
        assert_eq!(page.restores.lock().len(), 2);

        tokio::time::sleep(ms(150)).await;
        assert!(page.restores.lock().is_empty());
        assert_eq!(sched.pending(), 0);

        let restored = page
            .drain_effects()
            .into_iter()
            .filter(|effect| matches!(effect, Effect::SetScale { scale, .. } if *scale == 1.0))
            .count();
        assert_eq!(restored, 2);
    }
}
