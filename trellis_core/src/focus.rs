// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus management.
//!
//! Focus is a single app-wide slot index. Moving focus resolves the
//! *effective* target by following `focus_delegation` links: each link is
//! taken only while the current widget can hold focus (alive, in the
//! current tree, visible, enabled), and resolution stops at a widget with
//! no further delegation. A successful change fires `FocusLost` on the old
//! target, then `FocusGained` on the new one.
//!
//! When a widget is hidden, disabled, or destroyed while the focus target
//! sits inside its subtree, focus re-targets automatically: the engine
//! walks upward from the point of removal and focuses the first ancestor
//! that resolves to a focusable target, falling back to no focus at all.
//! The same rescue runs after every build pass, because a rebuild can drop
//! the focused widget out of the tree entirely.

use crate::app::App;
use crate::event::Event;
use crate::widget::{INVALID, WidgetId};

impl App {
    /// The currently focused widget, if any.
    #[must_use]
    pub fn focused(&self) -> Option<WidgetId> {
        (self.focused != INVALID && self.arena.slot_live(self.focused))
            .then(|| self.arena.id_at(self.focused))
    }

    /// Moves focus to `id`, following its delegation chain.
    ///
    /// Returns `false` when `id` is stale or no widget along the chain can
    /// currently hold focus; the previous focus target keeps focus in that
    /// case.
    pub fn set_focused(&mut self, id: WidgetId) -> bool {
        if !self.arena.is_alive(id) {
            return false;
        }
        match self.resolve_focus_target(id.idx) {
            None => false,
            Some(target) => {
                self.change_focus(target);
                true
            }
        }
    }

    /// Clears focus entirely, firing `FocusLost` on the old target.
    pub fn clear_focus(&mut self) {
        if self.focused == INVALID {
            return;
        }
        let old = self.focused;
        self.focused = INVALID;
        if self.arena.slot_live(old) {
            self.fire_event(old, &Event::FocusLost);
        }
    }

    /// Whether the widget at `idx` can be the effective focus target right
    /// now.
    pub(crate) fn can_have_focus(&mut self, idx: u32) -> bool {
        self.arena.slot_live(idx)
            && self.arena.built_at(idx) == self.build_count
            && self.arena.visible_at(idx)
            && self.arena.enabled_at(idx)
    }

    /// Follows delegation links from `idx` to the effective target.
    ///
    /// # Panics
    ///
    /// Panics on a delegation cycle (a widget implementation bug).
    pub(crate) fn resolve_focus_target(&mut self, idx: u32) -> Option<u32> {
        let mut cur = idx;
        let mut hops: u32 = 0;
        loop {
            if !self.can_have_focus(cur) {
                return None;
            }
            let next = self.arena.focus_delegation_at(cur);
            if next == INVALID {
                return Some(cur);
            }
            hops += 1;
            assert!(hops <= self.arena.slot_count(), "focus delegation cycle");
            cur = next;
        }
    }

    fn change_focus(&mut self, new_idx: u32) {
        if self.focused == new_idx {
            return;
        }
        let old = self.focused;
        self.focused = new_idx;
        if old != INVALID && self.arena.slot_live(old) {
            self.fire_event(old, &Event::FocusLost);
        }
        self.fire_event(new_idx, &Event::FocusGained);
    }

    /// Moves focus out of the subtree rooted at `idx` (called when that
    /// subtree is hidden, disabled, or destroyed).
    pub(crate) fn blur_subtree(&mut self, idx: u32) {
        if self.focused == INVALID || !self.arena.slot_live(self.focused) {
            return;
        }
        if !self.arena.in_subtree(self.focused, idx) {
            return;
        }
        let mut ancestor = self.arena.parent_idx(idx);
        while ancestor != INVALID {
            if let Some(target) = self.resolve_focus_target(ancestor) {
                self.change_focus(target);
                return;
            }
            ancestor = self.arena.parent_idx(ancestor);
        }
        self.clear_focus();
    }

    /// Re-targets focus after a build pass if the focused widget fell out
    /// of the tree or can no longer hold focus.
    pub(crate) fn rescue_focus(&mut self) {
        if self.focused == INVALID {
            return;
        }
        if !self.arena.slot_live(self.focused) {
            self.focused = INVALID;
            return;
        }
        if self.can_have_focus(self.focused) {
            return;
        }
        self.blur_subtree(self.focused);
        // The old target may itself be the walk origin; if no ancestor took
        // focus the slot is already cleared.
        if self.focused != INVALID && !self.can_have_focus(self.focused) {
            self.clear_focus();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use alloc::rc::Rc;

    use crate::app::App;
    use crate::context::Context;
    use crate::event::EventKind;
    use crate::testutil::{HookWidget, app_with_root, env, pump, set_root_widget};
    use crate::widget::WidgetId;

    /// root -> panel -> field; `panel` delegates focus to `field`.
    fn delegation_fixture() -> (App, WidgetId, WidgetId) {
        let mut app = app_with_root(HookWidget::new());
        let field = app.arena_mut().insert(Box::new(HookWidget::new()));
        let panel = app.arena_mut().insert(Box::new(
            HookWidget::new().on_build(move |cx, children| {
                children.add(field);
                cx.delegate_focus(field);
            }),
        ));
        let root_widget = HookWidget::new().on_build(move |_, children| {
            children.add(panel);
        });
        set_root_widget(&mut app, root_widget);
        pump(&mut app, &env());
        (app, panel, field)
    }

    #[test]
    fn focusing_a_delegating_widget_focuses_the_target() {
        let (mut app, panel, field) = delegation_fixture();
        assert!(app.set_focused(panel));
        assert_eq!(app.focused(), Some(field));
    }

    #[test]
    fn disabling_the_target_retargets_to_the_nearest_focusable_ancestor() {
        let (mut app, panel, field) = delegation_fixture();
        assert!(app.set_focused(panel));
        assert_eq!(app.focused(), Some(field));

        let node = app.root().index();
        let root = app.root();
        let mut cx = Context {
            app: &mut app,
            node,
        };
        cx.disable(field);
        // `panel` resolves through its delegation to the disabled field, so
        // the walk continues upward and lands on the root.
        assert_eq!(cx.focused(), Some(root));
    }

    #[test]
    fn hiding_an_ancestor_blurs_focused_descendants() {
        let (mut app, panel, field) = delegation_fixture();
        assert!(app.set_focused(field));

        let node = app.root().index();
        let root = app.root();
        let mut cx = Context {
            app: &mut app,
            node,
        };
        cx.hide(panel);
        assert_eq!(cx.focused(), Some(root));
        assert!(!cx.is_visible(field), "descendant of hidden is hidden");
    }

    #[test]
    fn focus_changes_fire_lost_then_gained() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let mut app = app_with_root(HookWidget::new());

        let mut leaf = |name: &'static str, log: Rc<RefCell<Vec<String>>>| {
            app.arena_mut().insert(Box::new(HookWidget::new().on_build(
                move |cx, _| {
                    let id = cx.current();
                    let l = log.clone();
                    cx.set_event_handler(
                        id,
                        EventKind::FocusGained,
                        Box::new(move |_| l.borrow_mut().push(alloc::format!("gained:{name}"))),
                    );
                    let l = log.clone();
                    cx.set_event_handler(
                        id,
                        EventKind::FocusLost,
                        Box::new(move |_| l.borrow_mut().push(alloc::format!("lost:{name}"))),
                    );
                },
            )))
        };
        let a = leaf("a", seen.clone());
        let b = leaf("b", seen.clone());

        let root_widget = HookWidget::new().on_build(move |_, children| {
            children.add(a);
            children.add(b);
        });
        set_root_widget(&mut app, root_widget);
        pump(&mut app, &env());

        assert!(app.set_focused(a));
        seen.borrow_mut().clear();
        assert!(app.set_focused(b));
        assert_eq!(
            seen.borrow().as_slice(),
            ["lost:a", "gained:b"],
            "old target loses focus before the new one gains it"
        );
    }

    #[test]
    fn stale_focus_target_is_rescued_after_a_rebuild() {
        let keep = Rc::new(core::cell::Cell::new(true));
        let mut app = app_with_root(HookWidget::new());
        let leaf = app.arena_mut().insert(Box::new(HookWidget::new()));

        let k = keep.clone();
        let root_widget = HookWidget::new().on_build(move |_, children| {
            if k.get() {
                children.add(leaf);
            }
        });
        set_root_widget(&mut app, root_widget);
        pump(&mut app, &env());

        assert!(app.set_focused(leaf));
        keep.set(false);
        pump(&mut app, &env());
        assert_ne!(app.focused(), Some(leaf), "stale widget cannot keep focus");
        // The next frame's driver falls back to the root.
        pump(&mut app, &env());
        assert_eq!(app.focused(), Some(app.root()));
    }

    #[test]
    fn set_focused_on_a_stale_handle_is_a_no_op() {
        let (mut app, _panel, field) = delegation_fixture();
        let probe = app.arena_mut().insert(Box::new(HookWidget::new()));
        app.arena_mut().destroy(probe);

        assert!(app.set_focused(field));
        assert!(!app.set_focused(probe), "stale handle never steals focus");
        assert_eq!(app.focused(), Some(field));
    }

    #[test]
    #[should_panic(expected = "focus delegation cycle")]
    fn delegation_cycles_panic() {
        let mut app = app_with_root(HookWidget::new());
        let a = app.arena_mut().insert(Box::new(HookWidget::new()));
        let b = app.arena_mut().insert(Box::new(HookWidget::new()));
        let root_widget = HookWidget::new().on_build(move |_, children| {
            children.add(a);
            children.add(b);
        });
        set_root_widget(&mut app, root_widget);
        pump(&mut app, &env());
        // Wire a -> b -> a directly through the arena.
        app.arena_mut().set_focus_delegation(a.index(), b.index());
        app.arena_mut().set_focus_delegation(b.index(), a.index());
        app.set_focused(a);
    }
}
