// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays widget storage with allocation, topology, and property
//! management.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Point, Rect, Size};

use understory_dirty::{Channel, CycleHandling, DirtyTracker, EagerPolicy};

use super::Widget;
use super::id::{INVALID, NEVER_BUILT, WidgetId};
use super::traverse::Children;
use crate::dirty;
use crate::event::{EventHandler, EventKind, HandlerSet};
use crate::host::{BlendMode, Surface};

/// Per-widget boolean flags.
///
/// `hidden` and `disabled` are inherited: setting either suppresses the
/// whole subtree's visibility or interactivity. `pass_through` affects hit
/// testing only, not rendering. `container` marks a clip boundary for
/// floating descendants; `float` exempts the widget from its parent's
/// clipping (it clips against the nearest `container` ancestor instead).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WidgetFlags {
    /// The widget (and its subtree) is not rendered and receives no input.
    pub hidden: bool,
    /// The widget (and its subtree) receives no input and cannot hold focus.
    pub disabled: bool,
    /// Invisible to hit testing, still rendered.
    pub pass_through: bool,
    /// Clip boundary for floating descendants.
    pub container: bool,
    /// Exempt from parent clipping.
    pub float: bool,
}

/// One entry of a widget's previous-frame children snapshot.
///
/// The damage diff compares these records against the current children to
/// detect structural change: identity plus everything that affects where
/// and whether a child paints.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildRecord {
    /// The child's handle at snapshot time.
    pub id: WidgetId,
    /// Screen-space visible bounds at snapshot time.
    pub visible_bounds: Rect,
    /// Whether the child floated.
    pub float: bool,
    /// The child's local z offset.
    pub z_delta: u32,
    /// Whether the child was effectively visible.
    pub visible: bool,
    /// Whether the child was pass-through.
    pub pass_through: bool,
}

/// A lazily-allocated backing surface for composited rendering.
pub(crate) struct Backing {
    pub(crate) size: Size,
    pub(crate) surface: Box<dyn Surface>,
}

impl core::fmt::Debug for Backing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Backing")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Struct-of-arrays storage for all widgets.
///
/// Widgets are addressed by [`WidgetId`] handles. Internally, each widget
/// occupies a slot in parallel arrays. Destroyed widgets are recycled via a
/// free list, and generation counters prevent stale handle access.
pub struct WidgetArena {
    // -- Behavior --
    widget: Vec<Option<Box<dyn Widget>>>,

    // -- Topology --
    parent: Vec<u32>,
    children: Vec<Vec<u32>>,

    // -- Local properties --
    bounds: Vec<Rect>,
    flags: Vec<WidgetFlags>,
    z_delta: Vec<u32>,
    transparency: Vec<f32>,
    blend: Vec<BlendMode>,
    focus_delegation: Vec<u32>,
    handlers: Vec<HandlerSet>,
    built_at: Vec<u64>,
    event_dispatched: Vec<bool>,

    // -- Derived caches (value + validity bit) --
    pub(super) visible: Vec<bool>,
    pub(super) visible_valid: Vec<bool>,
    pub(super) enabled: Vec<bool>,
    pub(super) enabled_valid: Vec<bool>,
    pub(super) z: Vec<u32>,
    pub(super) z_valid: Vec<bool>,
    pub(super) visible_bounds: Vec<Rect>,
    pub(super) visible_bounds_valid: Vec<bool>,
    pub(super) screen_origin: Vec<Point>,

    // -- Frame bookkeeping --
    prev: Vec<Vec<ChildRecord>>,
    backing: Vec<Option<Backing>>,

    // -- Allocation --
    generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,

    // -- Dirty tracking --
    dirty: DirtyTracker<u32>,
}

impl Default for WidgetArena {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for WidgetArena {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WidgetArena")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl WidgetArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            widget: Vec::new(),
            parent: Vec::new(),
            children: Vec::new(),
            bounds: Vec::new(),
            flags: Vec::new(),
            z_delta: Vec::new(),
            transparency: Vec::new(),
            blend: Vec::new(),
            focus_delegation: Vec::new(),
            handlers: Vec::new(),
            built_at: Vec::new(),
            event_dispatched: Vec::new(),
            visible: Vec::new(),
            visible_valid: Vec::new(),
            enabled: Vec::new(),
            enabled_valid: Vec::new(),
            z: Vec::new(),
            z_valid: Vec::new(),
            visible_bounds: Vec::new(),
            visible_bounds_valid: Vec::new(),
            screen_origin: Vec::new(),
            prev: Vec::new(),
            backing: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    // -- Allocation API --

    /// Inserts a widget and returns its handle.
    ///
    /// The widget starts detached: no parent, no children, zero bounds, and
    /// a never-built stamp, so it is not in the current tree until a build
    /// pass attaches it.
    pub fn insert(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.widget[i] = Some(widget);
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.bounds[i] = Rect::ZERO;
            self.flags[i] = WidgetFlags::default();
            self.z_delta[i] = 0;
            self.transparency[i] = 0.0;
            self.blend[i] = BlendMode::SourceOver;
            self.focus_delegation[i] = INVALID;
            self.handlers[i].clear();
            self.built_at[i] = NEVER_BUILT;
            self.event_dispatched[i] = false;
            self.visible_valid[i] = false;
            self.enabled_valid[i] = false;
            self.z_valid[i] = false;
            self.visible_bounds_valid[i] = false;
            self.prev[i].clear();
            self.backing[i] = None;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.widget.push(Some(widget));
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.bounds.push(Rect::ZERO);
            self.flags.push(WidgetFlags::default());
            self.z_delta.push(0);
            self.transparency.push(0.0);
            self.blend.push(BlendMode::SourceOver);
            self.focus_delegation.push(INVALID);
            self.handlers.push(HandlerSet::default());
            self.built_at.push(NEVER_BUILT);
            self.event_dispatched.push(false);
            self.visible.push(true);
            self.visible_valid.push(false);
            self.enabled.push(true);
            self.enabled_valid.push(false);
            self.z.push(0);
            self.z_valid.push(false);
            self.visible_bounds.push(Rect::ZERO);
            self.visible_bounds_valid.push(false);
            self.screen_origin.push(Point::ZERO);
            self.prev.push(Vec::new());
            self.backing.push(None);
            self.generation.push(0);
            idx
        };

        WidgetId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a widget, freeing its slot for reuse.
    ///
    /// The widget is unlinked from its parent; its children (if any are
    /// still linked) become detached. Old handles immediately fail
    /// validation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: WidgetId) {
        self.validate(id);
        let idx = id.idx;
        let i = idx as usize;

        if self.parent[i] != INVALID {
            self.unlink(idx);
        }
        for child in core::mem::take(&mut self.children[i]) {
            let _ = self
                .dirty
                .remove_dependency(child, idx, dirty::VISIBILITY);
            let _ = self.dirty.remove_dependency(child, idx, dirty::Z);
            self.parent[child as usize] = INVALID;
        }

        self.dirty.remove_key(idx);

        self.widget[i] = None;
        self.handlers[i].clear();
        self.backing[i] = None;
        self.prev[i].clear();

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live widget.
    #[must_use]
    pub fn is_alive(&self, id: WidgetId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns whether the widget is part of the current tree, i.e. the
    /// last build pass attached it.
    #[must_use]
    pub fn is_in_tree(&self, id: WidgetId, now: u64) -> bool {
        self.is_alive(id) && self.built_at[id.idx as usize] == now
    }

    /// Total slot count (live and freed).
    #[must_use]
    pub(crate) fn slot_count(&self) -> u32 {
        self.len
    }

    pub(crate) fn validate(&self, id: WidgetId) {
        assert!(self.is_alive(id), "stale widget handle {id:?}");
    }

    pub(crate) fn id_at(&self, idx: u32) -> WidgetId {
        WidgetId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn slot_live(&self, idx: u32) -> bool {
        idx < self.len && !self.free_list.contains(&idx)
    }

    // -- Behavior slots --

    /// Takes the behavior object out of its slot for a callback.
    ///
    /// # Panics
    ///
    /// Panics if the slot is empty, which would mean a callback re-entered
    /// the engine for the same widget.
    pub(crate) fn take_widget(&mut self, idx: u32) -> Box<dyn Widget> {
        self.widget[idx as usize]
            .take()
            .expect("widget callback re-entry")
    }

    pub(crate) fn put_widget(&mut self, idx: u32, widget: Box<dyn Widget>) {
        debug_assert!(self.widget[idx as usize].is_none());
        self.widget[idx as usize] = Some(widget);
    }

    // -- Topology API --

    /// Returns the parent of a widget, if any.
    #[must_use]
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    pub(crate) fn parent_idx(&self, idx: u32) -> u32 {
        self.parent[idx as usize]
    }

    /// Returns an iterator over the direct children of a widget.
    #[must_use]
    pub fn children(&self, id: WidgetId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    pub(crate) fn children_at(&self, idx: u32) -> &[u32] {
        &self.children[idx as usize]
    }

    /// Unlinks all children of `idx`, returning the old list for reuse.
    pub(crate) fn clear_children(&mut self, idx: u32) -> Vec<u32> {
        let old = core::mem::take(&mut self.children[idx as usize]);
        for &child in &old {
            let _ = self
                .dirty
                .remove_dependency(child, idx, dirty::VISIBILITY);
            let _ = self.dirty.remove_dependency(child, idx, dirty::Z);
            self.parent[child as usize] = INVALID;
        }
        old
    }

    /// Attaches `child` as the last child of `parent`, stamping it into the
    /// current tree.
    ///
    /// # Panics
    ///
    /// Panics if `child` is already attached (a duplicate add within the
    /// current build pass).
    pub(crate) fn attach(&mut self, parent: u32, child: u32, stamp: u64) {
        assert!(
            self.parent[child as usize] == INVALID,
            "widget {child} added twice during one build pass"
        );
        self.parent[child as usize] = parent;
        self.children[parent as usize].push(child);
        self.built_at[child as usize] = stamp;

        // Inherited-property edges: child depends on parent.
        let _ = self.dirty.add_dependency(child, parent, dirty::VISIBILITY);
        let _ = self.dirty.add_dependency(child, parent, dirty::Z);
    }

    /// Unlinks `child` from its current parent.
    pub(crate) fn unlink(&mut self, child: u32) {
        let p = self.parent[child as usize];
        if p == INVALID {
            return;
        }
        let _ = self.dirty.remove_dependency(child, p, dirty::VISIBILITY);
        let _ = self.dirty.remove_dependency(child, p, dirty::Z);
        self.children[p as usize].retain(|&c| c != child);
        self.parent[child as usize] = INVALID;
    }

    // -- Property getters --

    /// Returns the widget's bounds in its parent's coordinate space.
    #[must_use]
    pub fn bounds(&self, id: WidgetId) -> Rect {
        self.validate(id);
        self.bounds[id.idx as usize]
    }

    pub(crate) fn bounds_at(&self, idx: u32) -> Rect {
        self.bounds[idx as usize]
    }

    /// Returns the widget's flags.
    #[must_use]
    pub fn flags(&self, id: WidgetId) -> WidgetFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    pub(crate) fn flags_at(&self, idx: u32) -> WidgetFlags {
        self.flags[idx as usize]
    }

    /// Returns the widget's local z offset.
    #[must_use]
    pub fn z_delta(&self, id: WidgetId) -> u32 {
        self.validate(id);
        self.z_delta[id.idx as usize]
    }

    pub(crate) fn z_delta_at(&self, idx: u32) -> u32 {
        self.z_delta[idx as usize]
    }

    /// Returns the widget's transparency (0 = opaque, 1 = invisible).
    #[must_use]
    pub fn transparency(&self, id: WidgetId) -> f32 {
        self.validate(id);
        self.transparency[id.idx as usize]
    }

    pub(crate) fn transparency_at(&self, idx: u32) -> f32 {
        self.transparency[idx as usize]
    }

    /// Returns the widget's composite blend mode.
    #[must_use]
    pub fn blend(&self, id: WidgetId) -> BlendMode {
        self.validate(id);
        self.blend[id.idx as usize]
    }

    pub(crate) fn blend_at(&self, idx: u32) -> BlendMode {
        self.blend[idx as usize]
    }

    pub(crate) fn built_at(&self, idx: u32) -> u64 {
        self.built_at[idx as usize]
    }

    pub(crate) fn stamp(&mut self, idx: u32, now: u64) {
        self.built_at[idx as usize] = now;
    }

    pub(crate) fn focus_delegation_at(&self, idx: u32) -> u32 {
        self.focus_delegation[idx as usize]
    }

    pub(crate) fn set_focus_delegation(&mut self, idx: u32, target: u32) {
        self.focus_delegation[idx as usize] = target;
    }

    /// Whether the widget dispatched an event since its last build (claimed
    /// input or ran an event handler). A set flag forces a rebuild at the
    /// next opportunity.
    #[must_use]
    pub fn event_dispatched(&self, id: WidgetId) -> bool {
        self.validate(id);
        self.event_dispatched[id.idx as usize]
    }

    pub(crate) fn set_event_dispatched(&mut self, idx: u32, value: bool) {
        self.event_dispatched[idx as usize] = value;
    }

    // -- Mutation API (auto-invalidates caches, auto-marks dirty) --

    /// Sets the widget's bounds. Only the layout pass calls this.
    ///
    /// Marks GEOMETRY and invalidates the subtree's visible-bounds caches
    /// when the value actually changes.
    pub(crate) fn set_bounds(&mut self, idx: u32, bounds: Rect) {
        if self.bounds[idx as usize] == bounds {
            return;
        }
        self.bounds[idx as usize] = bounds;
        self.invalidate_bounds_subtree(idx);
        self.dirty.mark(idx, dirty::GEOMETRY);
    }

    /// Sets the hidden flag.
    ///
    /// Marks VISIBILITY with eager propagation to descendants and
    /// invalidates the subtree's visibility caches.
    pub(crate) fn set_hidden(&mut self, idx: u32, hidden: bool) {
        if self.flags[idx as usize].hidden == hidden {
            return;
        }
        self.flags[idx as usize].hidden = hidden;
        self.invalidate_visible_subtree(idx);
        self.dirty.mark_with(idx, dirty::VISIBILITY, &EagerPolicy);
    }

    /// Sets the disabled flag.
    ///
    /// Marks VISIBILITY with eager propagation and invalidates the
    /// subtree's enabled caches.
    pub(crate) fn set_disabled(&mut self, idx: u32, disabled: bool) {
        if self.flags[idx as usize].disabled == disabled {
            return;
        }
        self.flags[idx as usize].disabled = disabled;
        self.invalidate_enabled_subtree(idx);
        self.dirty.mark_with(idx, dirty::VISIBILITY, &EagerPolicy);
    }

    /// Sets the pass-through flag. Hit-test only; no repaint needed, so no
    /// channel is marked (the structural diff still records the change).
    pub(crate) fn set_pass_through(&mut self, idx: u32, pass_through: bool) {
        self.flags[idx as usize].pass_through = pass_through;
    }

    /// Sets the container flag (clip boundary for floating descendants).
    pub(crate) fn set_container(&mut self, idx: u32, container: bool) {
        if self.flags[idx as usize].container == container {
            return;
        }
        self.flags[idx as usize].container = container;
        self.invalidate_bounds_subtree(idx);
        self.dirty.mark(idx, dirty::GEOMETRY);
    }

    /// Sets the float flag (exempt from parent clipping).
    pub(crate) fn set_float(&mut self, idx: u32, float: bool) {
        if self.flags[idx as usize].float == float {
            return;
        }
        self.flags[idx as usize].float = float;
        self.invalidate_bounds_subtree(idx);
        self.dirty.mark(idx, dirty::GEOMETRY);
    }

    /// Sets the local z offset.
    ///
    /// Marks Z with eager propagation and invalidates the subtree's z and
    /// visible-bounds caches (a nonzero z delta also lifts the widget out
    /// of ancestor clipping).
    pub(crate) fn set_z_delta(&mut self, idx: u32, z_delta: u32) {
        if self.z_delta[idx as usize] == z_delta {
            return;
        }
        self.z_delta[idx as usize] = z_delta;
        self.invalidate_z_subtree(idx);
        self.invalidate_bounds_subtree(idx);
        self.dirty.mark_with(idx, dirty::Z, &EagerPolicy);
    }

    /// Sets the transparency (0 = opaque, 1 = invisible).
    pub(crate) fn set_transparency(&mut self, idx: u32, transparency: f32) {
        let clamped = transparency.clamp(0.0, 1.0);
        if self.transparency[idx as usize] == clamped {
            return;
        }
        self.transparency[idx as usize] = clamped;
        self.dirty.mark(idx, dirty::VISIBILITY);
    }

    /// Sets the composite blend mode.
    pub(crate) fn set_blend(&mut self, idx: u32, blend: BlendMode) {
        if self.blend[idx as usize] == blend {
            return;
        }
        self.blend[idx as usize] = blend;
        self.dirty.mark(idx, dirty::VISIBILITY);
    }

    /// Records an explicit redraw request.
    pub(crate) fn mark_redraw(&mut self, idx: u32) {
        self.dirty.mark(idx, dirty::REDRAW);
    }

    /// Records a children-list rewrite.
    pub(crate) fn mark_topology(&mut self, idx: u32) {
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    // -- Handlers --

    pub(crate) fn set_handler(&mut self, idx: u32, kind: EventKind, handler: EventHandler) {
        self.handlers[idx as usize].set(kind, handler);
    }

    pub(crate) fn clear_handlers(&mut self, idx: u32) {
        self.handlers[idx as usize].clear();
    }

    pub(crate) fn take_handlers(&mut self, idx: u32) -> HandlerSet {
        core::mem::take(&mut self.handlers[idx as usize])
    }

    pub(crate) fn put_handlers(&mut self, idx: u32, set: HandlerSet) {
        self.handlers[idx as usize] = set;
    }

    // -- Snapshots --

    pub(crate) fn prev_children(&self, idx: u32) -> &[ChildRecord] {
        &self.prev[idx as usize]
    }

    pub(crate) fn set_prev_children(&mut self, idx: u32, records: Vec<ChildRecord>) {
        self.prev[idx as usize] = records;
    }

    // -- Backing surfaces --

    pub(crate) fn take_backing(&mut self, idx: u32) -> Option<Backing> {
        self.backing[idx as usize].take()
    }

    pub(crate) fn put_backing(&mut self, idx: u32, backing: Backing) {
        self.backing[idx as usize] = Some(backing);
    }

    // -- Dirty drains --

    /// Drains a propagating channel, including eagerly-marked dependents.
    pub(crate) fn drain_propagating(&mut self, channel: Channel) -> Vec<u32> {
        self.dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .collect()
    }

    /// Drains a local-only channel.
    pub(crate) fn drain_local(&mut self, channel: Channel) -> Vec<u32> {
        self.dirty.drain(channel).deterministic().run().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;
    impl Widget for Nothing {}

    fn arena_with(n: usize) -> (WidgetArena, Vec<WidgetId>) {
        let mut arena = WidgetArena::new();
        let ids = (0..n).map(|_| arena.insert(Box::new(Nothing))).collect();
        (arena, ids)
    }

    #[test]
    fn inserted_widget_is_alive_but_not_in_tree() {
        let (arena, ids) = arena_with(1);
        assert!(arena.is_alive(ids[0]));
        assert!(!arena.is_in_tree(ids[0], 0));
    }

    #[test]
    fn destroy_invalidates_old_handles_and_recycles_slots() {
        let (mut arena, ids) = arena_with(2);
        arena.destroy(ids[0]);
        assert!(!arena.is_alive(ids[0]));

        let replacement = arena.insert(Box::new(Nothing));
        assert_eq!(replacement.index(), ids[0].index());
        assert!(!arena.is_alive(ids[0]), "old generation must stay stale");
        assert!(arena.is_alive(replacement));
    }

    #[test]
    fn attach_links_and_stamps() {
        let (mut arena, ids) = arena_with(2);
        arena.attach(ids[0].idx, ids[1].idx, 7);
        assert_eq!(arena.parent(ids[1]), Some(ids[0]));
        assert!(arena.is_in_tree(ids[1], 7));
        assert!(!arena.is_in_tree(ids[1], 8));
        let children: Vec<_> = arena.children(ids[0]).collect();
        assert_eq!(children, [ids[1]]);
    }

    #[test]
    #[should_panic(expected = "added twice")]
    fn duplicate_attach_panics() {
        let (mut arena, ids) = arena_with(2);
        arena.attach(ids[0].idx, ids[1].idx, 1);
        arena.attach(ids[0].idx, ids[1].idx, 1);
    }

    #[test]
    fn clear_children_detaches_in_bulk() {
        let (mut arena, ids) = arena_with(3);
        arena.attach(ids[0].idx, ids[1].idx, 1);
        arena.attach(ids[0].idx, ids[2].idx, 1);

        let old = arena.clear_children(ids[0].idx);
        assert_eq!(old, [ids[1].idx, ids[2].idx]);
        assert_eq!(arena.parent(ids[1]), None);
        assert_eq!(arena.children(ids[0]).count(), 0);
    }

    #[test]
    fn destroyed_parent_detaches_children() {
        let (mut arena, ids) = arena_with(2);
        arena.attach(ids[0].idx, ids[1].idx, 1);
        arena.destroy(ids[0]);
        assert_eq!(arena.parent(ids[1]), None);
        assert!(arena.is_alive(ids[1]));
    }

    #[test]
    fn unchanged_bounds_do_not_mark_geometry() {
        let (mut arena, ids) = arena_with(1);
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        arena.set_bounds(ids[0].idx, r);
        let _ = arena.drain_local(crate::dirty::GEOMETRY);

        arena.set_bounds(ids[0].idx, r);
        assert!(
            arena.drain_local(crate::dirty::GEOMETRY).is_empty(),
            "no-op bounds write must not dirty the channel"
        );
    }

    #[test]
    fn hidden_marks_subtree_through_dependency_edges() {
        let (mut arena, ids) = arena_with(3);
        arena.attach(ids[0].idx, ids[1].idx, 1);
        arena.attach(ids[1].idx, ids[2].idx, 1);
        let _ = arena.drain_propagating(crate::dirty::VISIBILITY);

        arena.set_hidden(ids[0].idx, true);
        let dirtied = arena.drain_propagating(crate::dirty::VISIBILITY);
        assert!(dirtied.contains(&ids[0].idx));
        assert!(dirtied.contains(&ids[1].idx));
        assert!(dirtied.contains(&ids[2].idx));
    }

    #[test]
    fn transparency_is_clamped() {
        let (mut arena, ids) = arena_with(1);
        arena.set_transparency(ids[0].idx, 2.5);
        assert_eq!(arena.transparency(ids[0]), 1.0);
        arena.set_transparency(ids[0].idx, -1.0);
        assert_eq!(arena.transparency(ids[0]), 0.0);
    }
}
