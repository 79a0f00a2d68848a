// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The build, layout, and tick passes.
//!
//! **Build** visits the tree pre-order. For each widget it clears the
//! handler slots, the focus delegation, the derived caches, and the
//! children list, then runs the widget's `build` callback against a
//! [`ChildAdder`] and applies the recorded children in declaration order
//! (parent back-reference plus the current build stamp). The app's build
//! count increments exactly once per pass, which is what makes widgets
//! from the previous tree detectable as stale. A widget that was moved
//! between parents is stolen from its old (previous-frame) link; a widget
//! recorded under two parents in one pass panics.
//!
//! **Layout** visits pre-order as well: each widget's `layout` callback
//! receives its own already-assigned bounds and records its children's
//! rectangles through a [`ChildLayouter`], which the engine writes back
//! (parent before child, so children lay out against settled bounds).
//! Afterwards the distinct resolved z values present in the tree are
//! collected into an ascending list — the draw order, and reversed, the
//! input-priority order.
//!
//! **Tick** runs every widget's `tick` callback pre-order, once per frame,
//! after all input dispatch.

use kurbo::{Point, Rect};

use crate::app::App;
use crate::context::{ChildAdder, ChildLayouter, Context};
use crate::error::FrameError;
use crate::trace::PhaseKind;
use crate::widget::INVALID;

impl App {
    pub(crate) fn run_build(&mut self) -> Result<(), FrameError> {
        self.phase = Some(PhaseKind::Build);
        self.build_count += 1;
        let root = self.root_idx();
        self.arena.stamp(root, self.build_count);
        self.build_widget(root)?;

        let mut order = core::mem::take(&mut self.traversal);
        order.clear();
        self.arena.collect_preorder(root, &mut order);
        self.traversal = order;

        self.rescue_focus();
        self.hit_cache_valid = false;
        Ok(())
    }

    fn build_widget(&mut self, idx: u32) -> Result<(), FrameError> {
        self.arena.clear_handlers(idx);
        self.arena.set_focus_delegation(idx, INVALID);
        self.arena.invalidate_node(idx);
        self.arena.set_event_dispatched(idx, false);
        let old_children = self.arena.clear_children(idx);

        let mut widget = self.arena.take_widget(idx);
        let mut adder = ChildAdder::default();
        let result = {
            let mut cx = Context {
                app: &mut *self,
                node: idx,
            };
            widget.build(&mut cx, &mut adder)
        };
        self.arena.put_widget(idx, widget);
        result?;

        for child in adder.recorded {
            assert!(
                self.arena.is_alive(child),
                "stale widget handle {child:?} added as child"
            );
            assert!(
                self.arena.built_at(child.idx) != self.build_count,
                "widget {child:?} added twice in one build pass"
            );
            // Steal from a previous-frame parent link, if any.
            self.arena.unlink(child.idx);
            self.arena.attach(idx, child.idx, self.build_count);
        }

        if old_children.as_slice() != self.arena.children_at(idx) {
            self.arena.mark_topology(idx);
        }

        for pos in 0..self.arena.children_at(idx).len() {
            let child = self.arena.children_at(idx)[pos];
            self.build_widget(child)?;
        }
        Ok(())
    }

    pub(crate) fn run_layout(&mut self) {
        self.phase = Some(PhaseKind::Layout);
        let root = self.root_idx();
        self.arena
            .set_bounds(root, Rect::from_origin_size(Point::ZERO, self.screen));
        self.layout_widget(root);

        let mut zs = core::mem::take(&mut self.z_values);
        zs.clear();
        for pos in 0..self.traversal.len() {
            let idx = self.traversal[pos];
            zs.push(self.arena.z_at(idx));
        }
        zs.sort_unstable();
        zs.dedup();
        self.z_values = zs;

        self.layout_ran = true;
        self.hit_cache_valid = false;
    }

    fn layout_widget(&mut self, idx: u32) {
        let bounds = self.arena.bounds_at(idx);
        let mut widget = self.arena.take_widget(idx);
        let mut layouter = ChildLayouter::default();
        {
            let mut cx = Context {
                app: &mut *self,
                node: idx,
            };
            widget.layout(&mut cx, bounds, &mut layouter);
        }
        self.arena.put_widget(idx, widget);

        for (child, rect) in layouter.placed {
            self.arena.validate(child);
            assert!(
                self.arena.parent_idx(child.idx) == idx,
                "layouter may only place direct children, got {child:?}"
            );
            self.arena.set_bounds(child.idx, rect);
        }

        for pos in 0..self.arena.children_at(idx).len() {
            let child = self.arena.children_at(idx)[pos];
            self.layout_widget(child);
        }
    }

    pub(crate) fn run_tick(&mut self) -> Result<(), FrameError> {
        self.phase = Some(PhaseKind::Tick);
        for pos in 0..self.traversal.len() {
            let idx = self.traversal[pos];
            if !self.arena.slot_live(idx) || self.arena.built_at(idx) != self.build_count {
                continue;
            }
            let bounds = self.arena.screen_bounds_at(idx);
            let mut widget = self.arena.take_widget(idx);
            let result = {
                let mut cx = Context {
                    app: &mut *self,
                    node: idx,
                };
                widget.tick(&mut cx, bounds)
            };
            self.arena.put_widget(idx, widget);
            result?;
        }
        Ok(())
    }
}
