// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing and input dispatch.
//!
//! Two independent input categories exist: **pointing** (location-based)
//! and **button** (focus-based). Each is dispatched once per pass: the
//! distinct-z list from the layout pass is iterated highest first, and for
//! each z value the tree is walked visiting children in reverse declaration
//! order and recursing before testing the current widget — so the
//! last-declared (topmost-rendered) leaf on the highest layer is offered
//! the input first, and ancestors only see what their subtree declined.
//!
//! A widget flagged `pass_through`, `hidden`, or `disabled` is pruned
//! together with its whole subtree. For the button category a widget is
//! additionally skipped unless it or an ancestor holds focus. The first
//! widget that claims the input or aborts propagation stops the entire
//! search; a claim also marks the widget as having dispatched an event,
//! which forces a rebuild.
//!
//! Separately, a z-descending **hit-candidate cache** answers "is this
//! widget the one under the cursor" in O(candidates). The cache holds every
//! widget whose screen rectangle contains the cursor, regardless of
//! visibility or pass-through; visibility is checked at query time, when a
//! strictly-higher-z candidate that is visible and hit-testable implies the
//! cursor belongs to another widget. The cache is recomputed only when the
//! cursor moved, a layout pass ran, or a z delta was mutated outside
//! layout.

use alloc::vec::Vec;

use crate::app::App;
use crate::context::Context;
use crate::host::CursorShape;
use crate::trace::PhaseKind;
use crate::widget::INVALID;

/// What a widget's input handler did with the offered input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputResult {
    /// Not interested; keep searching.
    #[default]
    None,
    /// The widget consumed the input. Stops the search and forces a
    /// rebuild.
    Claimed,
    /// The widget wants no one to receive this input. Stops the search.
    Aborted,
}

/// The two dispatch categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputCategory {
    Pointing,
    Button,
}

/// One entry of the hit-candidate cache.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HitCandidate {
    pub(crate) idx: u32,
    pub(crate) z: u32,
}

impl App {
    /// Dispatches one input category through the z-ordered tree walk.
    pub(crate) fn dispatch_input(&mut self, category: InputCategory) {
        self.phase = Some(PhaseKind::Input);
        let root = self.root_idx();
        for pos in (0..self.z_values.len()).rev() {
            let z = self.z_values[pos];
            if self.dispatch_walk(root, z, category) {
                return;
            }
        }
    }

    /// Walks the subtree at `idx` restricted to widgets whose resolved z is
    /// `z`, children (reverse order) before self. Returns `true` when the
    /// search is over.
    fn dispatch_walk(&mut self, idx: u32, z: u32, category: InputCategory) -> bool {
        let flags = self.arena.flags_at(idx);
        if flags.hidden || flags.disabled || flags.pass_through {
            return false;
        }

        let children: Vec<u32> = self.arena.children_at(idx).to_vec();
        for &child in children.iter().rev() {
            if !self.arena.slot_live(child) {
                continue;
            }
            if self.dispatch_walk(child, z, category) {
                return true;
            }
        }

        if self.arena.z_at(idx) != z {
            return false;
        }
        if category == InputCategory::Button && !self.node_or_ancestor_focused(idx) {
            return false;
        }

        let bounds = self.arena.screen_bounds_at(idx);
        let mut widget = self.arena.take_widget(idx);
        let result = {
            let mut cx = Context {
                app: &mut *self,
                node: idx,
            };
            match category {
                InputCategory::Pointing => widget.handle_pointing_input(&mut cx, bounds),
                InputCategory::Button => widget.handle_button_input(&mut cx, bounds),
            }
        };
        self.arena.put_widget(idx, widget);

        match result {
            InputResult::None => false,
            InputResult::Claimed => {
                self.arena.set_event_dispatched(idx, true);
                self.input_claimed = true;
                true
            }
            InputResult::Aborted => true,
        }
    }

    fn node_or_ancestor_focused(&self, idx: u32) -> bool {
        if self.focused == INVALID {
            return false;
        }
        let mut cur = idx;
        loop {
            if cur == self.focused {
                return true;
            }
            match self.arena.parent_idx(cur) {
                INVALID => return false,
                p => cur = p,
            }
        }
    }

    /// Rebuilds the hit-candidate cache if it is stale.
    pub(crate) fn refresh_hit_cache(&mut self) {
        if self.hit_cache_valid {
            return;
        }
        self.hit_candidates.clear();
        if let Some(cursor) = self.cursor {
            // Reverse pre-order, so the stable sort below leaves topmost-
            // rendered widgets first within each z value.
            for pos in (0..self.traversal.len()).rev() {
                let idx = self.traversal[pos];
                if self.arena.screen_bounds_at(idx).contains(cursor) {
                    let z = self.arena.z_at(idx);
                    self.hit_candidates.push(HitCandidate { idx, z });
                }
            }
            self.hit_candidates.sort_by(|a, b| b.z.cmp(&a.z));
        }
        self.hit_cache_valid = true;
    }

    /// Whether the widget at `idx` is the one under the cursor: it must be
    /// a candidate, and no strictly-higher-z visible, hit-testable
    /// candidate may sit above it.
    pub(crate) fn is_widget_hit(&mut self, idx: u32) -> bool {
        self.refresh_hit_cache();
        let queried_z = self.arena.z_at(idx);
        for pos in 0..self.hit_candidates.len() {
            let candidate = self.hit_candidates[pos];
            if candidate.idx == idx {
                return true;
            }
            if candidate.z > queried_z
                && !self.arena.flags_at(candidate.idx).pass_through
                && self.arena.visible_at(candidate.idx)
            {
                return false;
            }
        }
        false
    }

    /// Resolves the cursor affordance of the topmost interactive widget
    /// under the cursor.
    pub(crate) fn resolve_cursor_shape(&mut self) -> CursorShape {
        if !self.config.resolve_cursor_shape {
            return CursorShape::Default;
        }
        self.refresh_hit_cache();
        for pos in 0..self.hit_candidates.len() {
            let candidate = self.hit_candidates[pos];
            let idx = candidate.idx;
            if self.arena.flags_at(idx).pass_through
                || !self.arena.visible_at(idx)
                || !self.arena.enabled_at(idx)
            {
                continue;
            }
            let bounds = self.arena.screen_bounds_at(idx);
            let widget = self.arena.take_widget(idx);
            let shape = {
                let mut cx = Context {
                    app: &mut *self,
                    node: idx,
                };
                widget.cursor_shape(&mut cx, bounds)
            };
            self.arena.put_widget(idx, widget);
            if let Some(shape) = shape {
                return shape;
            }
        }
        CursorShape::Default
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use kurbo::Point;

    use super::InputResult;
    use crate::app::App;
    use crate::context::Context;
    use crate::testutil::{
        HookWidget, Log, app_with_root, env, env_with_cursor, log, note, pump, set_root_widget,
        settle, taken,
    };
    use crate::widget::WidgetId;

    /// Root with two full-screen overlapping children; `b` is declared
    /// after `a`, so it renders on top within the same layer.
    fn overlap_fixture(claim_when_hit: bool) -> (App, WidgetId, WidgetId, Log) {
        let events = log();
        let mut app = app_with_root(HookWidget::new());

        let mut child = |name: &'static str| {
            let l = events.clone();
            app.arena_mut().insert(Box::new(
                HookWidget::new().on_pointing(move |cx, bounds| {
                    note(&l, format!("offer:{name}"));
                    if claim_when_hit && cx.cursor_position().is_some_and(|p| bounds.contains(p)) {
                        note(&l, format!("claim:{name}"));
                        return InputResult::Claimed;
                    }
                    InputResult::None
                }),
            ))
        };
        let a = child("a");
        let b = child("b");

        let root_widget = HookWidget::new()
            .on_build(move |_, children| {
                children.add(a);
                children.add(b);
            })
            .on_layout(move |_, bounds, layouter| {
                let full = bounds.with_origin(Point::ZERO);
                layouter.place(a, full);
                layouter.place(b, full);
            });
        set_root_widget(&mut app, root_widget);
        (app, a, b, events)
    }

    fn raise(app: &mut App, id: WidgetId, z_delta: u32) {
        let node = app.root().index();
        let mut cx = Context { app, node };
        cx.set_z_delta(id, z_delta);
    }

    #[test]
    fn higher_z_sibling_claims_first() {
        let (mut app, _a, b, events) = overlap_fixture(true);
        raise(&mut app, b, 1);
        pump(&mut app, &env_with_cursor(50.0, 50.0));
        let seen = taken(&events);
        let first_claim = seen.iter().find(|e| e.starts_with("claim:"));
        assert_eq!(first_claim.map(String::as_str), Some("claim:b"));
        assert!(
            !seen.contains(&String::from("claim:a")),
            "the lower layer must never see the claimed input"
        );
    }

    #[test]
    fn pass_through_forwards_to_the_layer_below() {
        let (mut app, _a, b, events) = overlap_fixture(true);
        raise(&mut app, b, 1);
        {
            let node = app.root().index();
            let mut cx = Context {
                app: &mut app,
                node,
            };
            cx.set_pass_through(b, true);
        }
        pump(&mut app, &env_with_cursor(50.0, 50.0));
        let seen = taken(&events);
        assert!(seen.contains(&String::from("claim:a")));
        assert!(
            !seen.iter().any(|e| e.ends_with(":b")),
            "a pass-through widget receives no input at all"
        );
    }

    #[test]
    fn last_declared_sibling_is_offered_first() {
        let (mut app, _a, _b, events) = overlap_fixture(false);
        pump(&mut app, &env_with_cursor(50.0, 50.0));
        let seen = taken(&events);
        let offers: Vec<&str> = seen.iter().map(String::as_str).take(2).collect();
        assert_eq!(offers, ["offer:b", "offer:a"], "reverse declaration order");
    }

    #[test]
    fn hidden_subtree_is_pruned_from_dispatch() {
        let (mut app, a, _b, events) = overlap_fixture(true);
        {
            let node = app.root().index();
            let mut cx = Context {
                app: &mut app,
                node,
            };
            cx.hide(a);
        }
        pump(&mut app, &env_with_cursor(50.0, 50.0));
        let seen = taken(&events);
        assert!(!seen.iter().any(|e| e.ends_with(":a")));
    }

    #[test]
    fn button_input_stays_inside_the_focused_subtree() {
        let events = log();
        let mut app = app_with_root(HookWidget::new());

        let mut field = |name: &'static str| {
            let l = events.clone();
            app.arena_mut().insert(Box::new(
                HookWidget::new().on_button(move |_, _| {
                    note(&l, format!("button:{name}"));
                    InputResult::Claimed
                }),
            ))
        };
        let f1 = field("f1");
        let f2 = field("f2");

        let root_widget = HookWidget::new().on_build(move |_, children| {
            children.add(f1);
            children.add(f2);
        });
        set_root_widget(&mut app, root_widget);

        // With the root focused, the whole tree is eligible and the
        // last-declared leaf wins.
        pump(&mut app, &env());
        assert_eq!(taken(&events).first().map(String::as_str), Some("button:f2"));

        // Focusing f1 gates out its sibling entirely.
        assert!(app.set_focused(f1));
        pump(&mut app, &env());
        let seen = taken(&events);
        assert!(seen.contains(&String::from("button:f1")));
        assert!(
            !seen.contains(&String::from("button:f2")),
            "button input must skip widgets outside the focus chain"
        );
    }

    #[test]
    fn is_hit_respects_layering_among_candidates() {
        let (mut app, a, b, _events) = overlap_fixture(false);
        pump(&mut app, &env_with_cursor(50.0, 50.0));

        // Same layer: neither occludes the other for the cache query.
        let node = app.root().index();
        let mut cx = Context {
            app: &mut app,
            node,
        };
        assert!(cx.is_hit(a));
        assert!(cx.is_hit(b));
    }

    #[test]
    fn z_delta_mutation_outside_layout_refreshes_the_hit_cache() {
        let (mut app, a, b, _events) = overlap_fixture(false);
        pump(&mut app, &env_with_cursor(50.0, 50.0));

        let node = app.root().index();
        let mut cx = Context {
            app: &mut app,
            node,
        };
        assert!(cx.is_hit(a), "warm the candidate cache first");

        // No layout pass runs between the mutation and the query.
        cx.set_z_delta(b, 1);
        assert!(
            !cx.is_hit(a),
            "the raised sibling must occlude without waiting for a layout pass"
        );
        assert!(cx.is_hit(b));
    }

    #[test]
    fn cursor_outside_every_widget_hits_nothing() {
        let (mut app, a, _b, _events) = overlap_fixture(false);
        pump(&mut app, &env());

        let node = app.root().index();
        let mut cx = Context {
            app: &mut app,
            node,
        };
        assert!(!cx.is_hit(a), "no cursor, no hit");
    }

    #[test]
    fn aborted_input_stops_the_search_without_claiming() {
        let events = log();
        let mut app = app_with_root(HookWidget::new());

        let l = events.clone();
        let veto = app.arena_mut().insert(Box::new(
            HookWidget::new().on_pointing(move |_, _| {
                note(&l, "veto");
                InputResult::Aborted
            }),
        ));
        let l = events.clone();
        let below = app.arena_mut().insert(Box::new(
            HookWidget::new().on_pointing(move |_, _| {
                note(&l, "below");
                InputResult::Claimed
            }),
        ));
        let root_widget = HookWidget::new()
            .on_build(move |_, children| {
                children.add(below);
                children.add(veto);
            })
            .on_layout(move |_, bounds, layouter| {
                let full = bounds.with_origin(Point::ZERO);
                layouter.place(below, full);
                layouter.place(veto, full);
            });
        set_root_widget(&mut app, root_widget);
        settle(&mut app, &env());
        let _ = taken(&events);

        let report = pump(&mut app, &env_with_cursor(50.0, 50.0));
        let seen = taken(&events);
        assert!(seen.contains(&String::from("veto")));
        assert!(!seen.contains(&String::from("below")));
        assert_eq!(report.passes, 0, "an abort alone does not force a rebuild");
    }
}
