// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The facade widgets see.
//!
//! Every widget callback receives a [`Context`]: a phase-tagged view over
//! the [`App`] that exposes property setters and queries, focus operations,
//! event registration and dispatch, redraw requests, and the environment
//! snapshot (cursor, keys, scale, locale, color mode). All methods take the
//! target [`WidgetId`] explicitly, so a parent can operate on its children
//! (the common case: a container registering handlers on the widgets it
//! just added).
//!
//! Two buffer types accompany the build and layout callbacks:
//! [`ChildAdder`] records the children a widget declares, and
//! [`ChildLayouter`] records the rectangles a widget assigns. Both are
//! applied by the engine after the callback returns, which keeps the arena
//! unaliased while the widget's behavior object is detached from its slot.
//!
//! Misuse panics (it indicates a widget bug, not a runtime condition):
//! registering handlers or focus delegation outside the build pass,
//! querying focus during the build pass, or placing a widget that is not a
//! direct child of the one being laid out.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Point, Rect, Size};

use crate::app::App;
use crate::event::{Event, EventHandler, EventKind};
use crate::geometry::Constraints;
use crate::host::{BlendMode, ColorMode, KeyInput, PointerButtons};
use crate::trace::PhaseKind;
use crate::widget::{Widget, WidgetFlags, WidgetId};

/// The engine facade passed to every widget callback.
pub struct Context<'a> {
    pub(crate) app: &'a mut App,
    pub(crate) node: u32,
}

impl core::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl Context<'_> {
    /// The widget whose callback is currently running.
    #[must_use]
    pub fn current(&self) -> WidgetId {
        self.app.arena.id_at(self.node)
    }

    // -- Arena lifecycle --

    /// Inserts a widget into the arena. The widget joins the tree when a
    /// build callback adds it as a child.
    pub fn insert(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        self.app.arena.insert(widget)
    }

    /// Destroys a widget, moving focus away from its subtree first.
    pub fn destroy(&mut self, id: WidgetId) {
        self.app.arena.validate(id);
        self.app.blur_subtree(id.idx);
        self.app.arena.destroy(id);
    }

    // -- Queries --

    /// Whether `id` is part of the current tree.
    #[must_use]
    pub fn is_in_tree(&self, id: WidgetId) -> bool {
        self.app.arena.is_in_tree(id, self.app.build_count)
    }

    /// Effective visibility (own flag and all ancestors').
    #[must_use]
    pub fn is_visible(&mut self, id: WidgetId) -> bool {
        self.app.arena.is_visible(id)
    }

    /// Effective enabled state (own flag and all ancestors').
    #[must_use]
    pub fn is_enabled(&mut self, id: WidgetId) -> bool {
        self.app.arena.is_enabled(id)
    }

    /// Resolved z.
    #[must_use]
    pub fn z(&mut self, id: WidgetId) -> u32 {
        self.app.arena.z(id)
    }

    /// Screen-space visible bounds.
    #[must_use]
    pub fn visible_bounds(&mut self, id: WidgetId) -> Rect {
        self.app.arena.visible_bounds(id)
    }

    /// Parent-space bounds as assigned by the last layout pass.
    #[must_use]
    pub fn bounds(&self, id: WidgetId) -> Rect {
        self.app.arena.bounds(id)
    }

    /// The widget's flags.
    #[must_use]
    pub fn flags(&self, id: WidgetId) -> WidgetFlags {
        self.app.arena.flags(id)
    }

    // -- Property setters --

    /// Hides the widget and its subtree, moving focus away if needed.
    pub fn hide(&mut self, id: WidgetId) {
        self.app.arena.validate(id);
        self.app.arena.set_hidden(id.idx, true);
        self.app.blur_subtree(id.idx);
    }

    /// Unhides the widget.
    pub fn show(&mut self, id: WidgetId) {
        self.app.arena.validate(id);
        self.app.arena.set_hidden(id.idx, false);
    }

    /// Disables the widget and its subtree, moving focus away if needed.
    pub fn disable(&mut self, id: WidgetId) {
        self.app.arena.validate(id);
        self.app.arena.set_disabled(id.idx, true);
        self.app.blur_subtree(id.idx);
    }

    /// Enables the widget.
    pub fn enable(&mut self, id: WidgetId) {
        self.app.arena.validate(id);
        self.app.arena.set_disabled(id.idx, false);
    }

    /// Makes the widget invisible to hit testing (still rendered).
    pub fn set_pass_through(&mut self, id: WidgetId, pass_through: bool) {
        self.app.arena.validate(id);
        self.app.arena.set_pass_through(id.idx, pass_through);
    }

    /// Marks the widget as a clip boundary for floating descendants.
    pub fn set_container(&mut self, id: WidgetId, container: bool) {
        self.app.arena.validate(id);
        self.app.arena.set_container(id.idx, container);
    }

    /// Exempts the widget from its parent's clipping.
    pub fn set_float(&mut self, id: WidgetId, float: bool) {
        self.app.arena.validate(id);
        self.app.arena.set_float(id.idx, float);
    }

    /// Sets the widget's local z offset, lifting it (and its subtree) onto
    /// its own paint layer when nonzero.
    pub fn set_z_delta(&mut self, id: WidgetId, z_delta: u32) {
        self.app.arena.validate(id);
        self.app.arena.set_z_delta(id.idx, z_delta);
        // The z-ordered candidate list keys on resolved z.
        self.app.hit_cache_valid = false;
    }

    /// Sets transparency (0 = opaque, 1 = invisible). Nonzero transparency
    /// switches the widget to composited rendering through a backing
    /// surface.
    pub fn set_transparency(&mut self, id: WidgetId, transparency: f32) {
        self.app.arena.validate(id);
        self.app.arena.set_transparency(id.idx, transparency);
    }

    /// Sets the composite blend mode.
    pub fn set_blend(&mut self, id: WidgetId, blend: BlendMode) {
        self.app.arena.validate(id);
        self.app.arena.set_blend(id.idx, blend);
    }

    /// Requests a repaint of the widget's visible bounds this frame.
    pub fn request_redraw(&mut self, id: WidgetId) {
        self.app.arena.validate(id);
        self.app.arena.mark_redraw(id.idx);
    }

    // -- Focus --

    /// Moves focus to `id`, following its delegation chain. Returns `false`
    /// if no widget along the chain can currently hold focus.
    pub fn focus(&mut self, id: WidgetId) -> bool {
        self.app.set_focused(id)
    }

    /// Clears focus entirely.
    pub fn unfocus(&mut self) {
        self.app.clear_focus();
    }

    /// Whether `id` is the effective focus target.
    ///
    /// # Panics
    ///
    /// Panics when called during the build pass: focus is re-resolved after
    /// the pass, so mid-build answers would be stale.
    #[must_use]
    pub fn is_focused(&self, id: WidgetId) -> bool {
        self.assert_not_building("is_focused");
        self.app.arena.is_alive(id) && self.app.focused == id.idx
    }

    /// The currently focused widget.
    ///
    /// # Panics
    ///
    /// Panics when called during the build pass.
    #[must_use]
    pub fn focused(&self) -> Option<WidgetId> {
        self.assert_not_building("focused");
        self.app.focused()
    }

    /// Forwards focus from the current widget to `target`: focusing the
    /// current widget will focus `target` (or `target`'s own delegation)
    /// instead. Cleared on every build pass.
    ///
    /// # Panics
    ///
    /// Panics outside the build pass.
    pub fn delegate_focus(&mut self, target: WidgetId) {
        assert!(
            self.app.phase == Some(PhaseKind::Build),
            "focus delegation is registered during the build pass"
        );
        self.app.arena.validate(target);
        self.app.arena.set_focus_delegation(self.node, target.idx);
    }

    // -- Events --

    /// Registers the handler slot for `kind` on `id`, replacing any
    /// previous handler of the same kind. Cleared on every build pass.
    ///
    /// # Panics
    ///
    /// Panics outside the build pass.
    pub fn set_event_handler(&mut self, id: WidgetId, kind: EventKind, handler: EventHandler) {
        assert!(
            self.app.phase == Some(PhaseKind::Build),
            "event handlers are registered during the build pass"
        );
        self.app.arena.validate(id);
        self.app.arena.set_handler(id.idx, kind, handler);
    }

    /// Dispatches `event` to `id`'s handler slot (if registered) and marks
    /// the widget as having dispatched an event, which forces a rebuild.
    pub fn dispatch_event(&mut self, id: WidgetId, event: Event) {
        self.app.arena.validate(id);
        self.app.fire_event(id.idx, &event);
    }

    // -- Input environment --

    /// Whether `id` is the widget the cursor is over, accounting for
    /// overlapping widgets on higher layers. Served from the z-ordered
    /// candidate cache in O(candidates).
    #[must_use]
    pub fn is_hit(&mut self, id: WidgetId) -> bool {
        self.app.arena.validate(id);
        self.app.is_widget_hit(id.idx)
    }

    /// Cursor position in screen coordinates, if inside the screen.
    #[must_use]
    pub fn cursor_position(&self) -> Option<Point> {
        self.app.cursor
    }

    /// Pointer buttons currently held.
    #[must_use]
    pub fn buttons(&self) -> PointerButtons {
        self.app.buttons
    }

    /// Key transitions since the previous frame.
    #[must_use]
    pub fn key_inputs(&self) -> &[KeyInput] {
        &self.app.keys
    }

    // -- Host environment --

    /// Logical screen size.
    #[must_use]
    pub fn screen_size(&self) -> Size {
        self.app.screen
    }

    /// Device pixel scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.app.scale
    }

    /// BCP 47 language tag of the active locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.app.locale
    }

    /// The host's color scheme.
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.app.color_mode
    }

    // -- Measurement --

    /// Measures another widget under the given constraints (used by layout
    /// solvers for default-sized items).
    pub fn measure_widget(&mut self, id: WidgetId, constraints: Constraints) -> Size {
        self.app.arena.validate(id);
        let idx = id.idx;
        let mut widget = self.app.arena.take_widget(idx);
        let mut cx = Context {
            app: &mut *self.app,
            node: idx,
        };
        let size = widget.measure(&mut cx, constraints);
        self.app.arena.put_widget(idx, widget);
        size
    }

    fn assert_not_building(&self, what: &str) {
        assert!(
            self.app.phase != Some(PhaseKind::Build),
            "{what} may not be called during the build pass"
        );
    }
}

/// Records the children a widget declares during its build callback.
///
/// The engine applies the recorded list after the callback returns: each
/// child gets its parent back-reference and the current build stamp, in
/// declaration order. Children lists never contain duplicates; adding the
/// same widget twice panics when the list is applied.
#[derive(Debug, Default)]
pub struct ChildAdder {
    pub(crate) recorded: Vec<WidgetId>,
}

impl ChildAdder {
    /// Declares `child` as the next child of the widget being built.
    pub fn add(&mut self, child: WidgetId) {
        self.recorded.push(child);
    }
}

/// Records the rectangles a widget assigns during its layout callback.
///
/// Rectangles are relative to the laying-out widget; the engine writes them
/// into each child's state after the callback returns. Placing a widget
/// that is not a direct child panics.
#[derive(Debug, Default)]
pub struct ChildLayouter {
    pub(crate) placed: Vec<(WidgetId, Rect)>,
}

impl ChildLayouter {
    /// Assigns `bounds` (parent-relative) to `child`.
    pub fn place(&mut self, child: WidgetId, bounds: Rect) {
        self.placed.push((child, bounds));
    }
}
