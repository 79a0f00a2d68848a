// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived-value caches.
//!
//! Four values are derived through the parent chain and queried constantly:
//! effective visibility, effective enabled state, resolved z, and
//! screen-space visible bounds. Each is memoized per widget with a validity
//! bit. Queries recompute lazily (parent before child, so one query warms
//! the whole ancestor path); the property setters in
//! [`WidgetArena`](super::WidgetArena) clear the bits for the affected
//! subtree.
//!
//! Visible-bounds rules:
//!
//! - Default: the widget's screen rectangle intersected with its parent's
//!   visible bounds.
//! - A widget with nonzero z delta renders on its own layer and is not
//!   clipped by any ancestor.
//! - A `float` widget clips against the nearest ancestor flagged
//!   `container` (not necessarily its direct parent); with no such
//!   ancestor it is unclipped.
//!
//! Visibility and enabled state are pure flag inheritance and deliberately
//! independent of geometry: a hidden widget still has well-defined visible
//! bounds, which is what the damage tracker unions when the widget
//! disappears.

use kurbo::{Point, Rect};

use super::arena::WidgetArena;
use super::id::{INVALID, WidgetId};
use crate::damage::rect_intersect;

impl WidgetArena {
    /// Returns whether the widget is effectively visible (its own `hidden`
    /// flag and every ancestor's are clear).
    #[must_use]
    pub fn is_visible(&mut self, id: WidgetId) -> bool {
        self.validate(id);
        self.visible_at(id.idx)
    }

    pub(crate) fn visible_at(&mut self, idx: u32) -> bool {
        let i = idx as usize;
        if self.visible_valid[i] {
            return self.visible[i];
        }
        let v = if self.flags_at(idx).hidden {
            false
        } else {
            match self.parent_idx(idx) {
                INVALID => true,
                p => self.visible_at(p),
            }
        };
        self.visible[i] = v;
        self.visible_valid[i] = true;
        v
    }

    /// Returns whether the widget is effectively enabled (its own
    /// `disabled` flag and every ancestor's are clear).
    #[must_use]
    pub fn is_enabled(&mut self, id: WidgetId) -> bool {
        self.validate(id);
        self.enabled_at(id.idx)
    }

    pub(crate) fn enabled_at(&mut self, idx: u32) -> bool {
        let i = idx as usize;
        if self.enabled_valid[i] {
            return self.enabled[i];
        }
        let v = if self.flags_at(idx).disabled {
            false
        } else {
            match self.parent_idx(idx) {
                INVALID => true,
                p => self.enabled_at(p),
            }
        };
        self.enabled[i] = v;
        self.enabled_valid[i] = true;
        v
    }

    /// Returns the widget's resolved z: the sum of z deltas along the
    /// ancestor path (a parentless widget's z is its own delta).
    #[must_use]
    pub fn z(&mut self, id: WidgetId) -> u32 {
        self.validate(id);
        self.z_at(id.idx)
    }

    pub(crate) fn z_at(&mut self, idx: u32) -> u32 {
        let i = idx as usize;
        if self.z_valid[i] {
            return self.z[i];
        }
        let v = match self.parent_idx(idx) {
            INVALID => self.z_delta_at(idx),
            p => self.z_at(p) + self.z_delta_at(idx),
        };
        self.z[i] = v;
        self.z_valid[i] = true;
        v
    }

    /// Returns the widget's screen-space origin (bounds are stored in
    /// parent coordinates).
    pub(crate) fn screen_origin_at(&mut self, idx: u32) -> Point {
        self.refresh_geometry(idx);
        self.screen_origin[idx as usize]
    }

    /// Returns the widget's full rectangle in screen coordinates.
    pub(crate) fn screen_bounds_at(&mut self, idx: u32) -> Rect {
        let origin = self.screen_origin_at(idx);
        Rect::from_origin_size(origin, self.bounds_at(idx).size())
    }

    /// Returns the widget's visible bounds in screen coordinates: the part
    /// of its rectangle that survives ancestor clipping.
    #[must_use]
    pub fn visible_bounds(&mut self, id: WidgetId) -> Rect {
        self.validate(id);
        self.visible_bounds_at(id.idx)
    }

    pub(crate) fn visible_bounds_at(&mut self, idx: u32) -> Rect {
        self.refresh_geometry(idx);
        self.visible_bounds[idx as usize]
    }

    fn refresh_geometry(&mut self, idx: u32) {
        let i = idx as usize;
        if self.visible_bounds_valid[i] {
            return;
        }

        let local = self.bounds_at(idx);
        let parent = self.parent_idx(idx);
        let origin = match parent {
            INVALID => local.origin(),
            p => self.screen_origin_at(p) + local.origin().to_vec2(),
        };
        let screen = Rect::from_origin_size(origin, local.size());

        let vb = if self.z_delta_at(idx) > 0 || parent == INVALID {
            screen
        } else if self.flags_at(idx).float {
            match self.nearest_container_ancestor(idx) {
                INVALID => screen,
                c => rect_intersect(screen, self.visible_bounds_at(c)),
            }
        } else {
            rect_intersect(screen, self.visible_bounds_at(parent))
        };

        let i = idx as usize;
        self.screen_origin[i] = origin;
        self.visible_bounds[i] = vb;
        self.visible_bounds_valid[i] = true;
    }

    fn nearest_container_ancestor(&self, idx: u32) -> u32 {
        let mut cur = self.parent_idx(idx);
        while cur != INVALID {
            if self.flags_at(cur).container {
                return cur;
            }
            cur = self.parent_idx(cur);
        }
        INVALID
    }

    // -- Invalidation --

    /// Clears every derived cache of one widget (used by the build pass as
    /// it visits each node).
    pub(crate) fn invalidate_node(&mut self, idx: u32) {
        let i = idx as usize;
        self.visible_valid[i] = false;
        self.enabled_valid[i] = false;
        self.z_valid[i] = false;
        self.visible_bounds_valid[i] = false;
    }

    pub(crate) fn invalidate_visible_subtree(&mut self, idx: u32) {
        self.clear_bits_subtree(idx, |arena, i| arena.visible_valid[i] = false);
    }

    pub(crate) fn invalidate_enabled_subtree(&mut self, idx: u32) {
        self.clear_bits_subtree(idx, |arena, i| arena.enabled_valid[i] = false);
    }

    pub(crate) fn invalidate_z_subtree(&mut self, idx: u32) {
        self.clear_bits_subtree(idx, |arena, i| arena.z_valid[i] = false);
    }

    pub(crate) fn invalidate_bounds_subtree(&mut self, idx: u32) {
        self.clear_bits_subtree(idx, |arena, i| arena.visible_bounds_valid[i] = false);
    }

    fn clear_bits_subtree(&mut self, idx: u32, clear: fn(&mut Self, usize)) {
        let mut stack = alloc::vec![idx];
        while let Some(i) = stack.pop() {
            clear(self, i as usize);
            stack.extend_from_slice(self.children_at(i));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Widget;
    use alloc::boxed::Box;
    use alloc::vec::Vec;

    struct Nothing;
    impl Widget for Nothing {}

    fn tree() -> (WidgetArena, Vec<WidgetId>) {
        // root -> a -> b
        let mut arena = WidgetArena::new();
        let ids: Vec<_> = (0..3).map(|_| arena.insert(Box::new(Nothing))).collect();
        arena.attach(ids[0].idx, ids[1].idx, 1);
        arena.attach(ids[1].idx, ids[2].idx, 1);
        arena.set_bounds(ids[0].idx, Rect::new(0.0, 0.0, 100.0, 100.0));
        arena.set_bounds(ids[1].idx, Rect::new(10.0, 10.0, 60.0, 60.0));
        arena.set_bounds(ids[2].idx, Rect::new(20.0, 20.0, 80.0, 80.0));
        (arena, ids)
    }

    #[test]
    fn z_accumulates_along_the_ancestor_path() {
        let (mut arena, ids) = tree();
        arena.set_z_delta(ids[0].idx, 2);
        arena.set_z_delta(ids[2].idx, 3);
        assert_eq!(arena.z(ids[0]), 2);
        assert_eq!(arena.z(ids[1]), 2);
        assert_eq!(arena.z(ids[2]), 5);
    }

    #[test]
    fn ancestor_z_change_invalidates_descendant_z() {
        let (mut arena, ids) = tree();
        assert_eq!(arena.z(ids[2]), 0);
        arena.set_z_delta(ids[0].idx, 4);
        assert_eq!(arena.z(ids[2]), 4, "cached z must be recomputed");
    }

    #[test]
    fn hidden_ancestor_hides_descendants() {
        let (mut arena, ids) = tree();
        assert!(arena.is_visible(ids[2]));
        arena.set_hidden(ids[1].idx, true);
        assert!(arena.is_visible(ids[0]));
        assert!(!arena.is_visible(ids[1]));
        assert!(!arena.is_visible(ids[2]), "descendant of hidden is hidden");
    }

    #[test]
    fn disabled_ancestor_disables_descendants() {
        let (mut arena, ids) = tree();
        arena.set_disabled(ids[0].idx, true);
        assert!(!arena.is_enabled(ids[2]));
        arena.set_disabled(ids[0].idx, false);
        assert!(arena.is_enabled(ids[2]));
    }

    #[test]
    fn visible_bounds_nest_and_clip() {
        let (mut arena, ids) = tree();
        // a is at (10,10)-(60,60) on screen; b local (20,20)-(80,80) lands
        // at (30,30)-(90,90) and clips to a.
        assert_eq!(arena.visible_bounds(ids[1]), Rect::new(10.0, 10.0, 60.0, 60.0));
        assert_eq!(arena.visible_bounds(ids[2]), Rect::new(30.0, 30.0, 60.0, 60.0));
    }

    #[test]
    fn nonzero_z_delta_escapes_clipping() {
        let (mut arena, ids) = tree();
        arena.set_z_delta(ids[2].idx, 1);
        assert_eq!(
            arena.visible_bounds(ids[2]),
            Rect::new(30.0, 30.0, 90.0, 90.0),
            "layered widget must not clip against ancestors"
        );
    }

    #[test]
    fn float_clips_against_nearest_container() {
        let (mut arena, ids) = tree();
        arena.set_container(ids[0].idx, true);
        arena.set_float(ids[2].idx, true);
        // b skips a's clip and clips against root instead.
        assert_eq!(arena.visible_bounds(ids[2]), Rect::new(30.0, 30.0, 90.0, 90.0));

        arena.set_container(ids[0].idx, false);
        assert_eq!(
            arena.visible_bounds(ids[2]),
            Rect::new(30.0, 30.0, 90.0, 90.0),
            "float with no container ancestor is unclipped"
        );
    }

    #[test]
    fn bounds_change_invalidates_descendant_geometry() {
        let (mut arena, ids) = tree();
        let _ = arena.visible_bounds(ids[2]);
        arena.set_bounds(ids[1].idx, Rect::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(
            arena.visible_bounds(ids[2]),
            Rect::new(20.0, 20.0, 40.0, 40.0),
            "moved parent must shift and re-clip the child"
        );
    }
}
