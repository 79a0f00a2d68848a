// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget tree data model.
//!
//! A *widget* is a node in a retained UI tree. Behavior and state are split:
//!
//! - Behavior lives in a [`Widget`] trait object, stored in the arena
//!   alongside the node's state and taken out of its slot for the duration
//!   of each callback.
//! - State lives in [`WidgetArena`], a struct-of-arrays store keyed by
//!   generational [`WidgetId`] handles. `parent`, focus delegation, and the
//!   app-wide focus reference are all slot indices into the arena, so there
//!   are no ownership cycles and stale handles are detectable.
//!
//! Per-widget state divides into:
//!
//! - **Local properties** set by the widget or application: bounds (written
//!   only by the layout pass, in parent coordinates), [`WidgetFlags`],
//!   z delta, transparency, blend mode, event handlers, focus delegation.
//! - **Derived caches** computed lazily through the parent chain and
//!   invalidated by the relevant setters: effective visibility, effective
//!   enabled state, resolved z, and screen-space visible bounds.
//! - **Frame bookkeeping**: the build stamp that decides tree membership,
//!   the previous-frame children snapshot used by the damage diff, and the
//!   lazily-allocated backing surface for composited rendering.
//!
//! Children lists are rebuilt wholesale by every build pass; a widget is in
//! the current tree iff its build stamp equals the app's current build
//! count. Identity across frames is the [`WidgetId`]: application code that
//! re-adds the same handle keeps the same state.

mod arena;
mod caches;
mod id;
mod traverse;

pub use arena::{ChildRecord, WidgetArena, WidgetFlags};
pub use id::{INVALID, WidgetId};
pub use traverse::{Children, Flow};

pub(crate) use arena::Backing;

use kurbo::{Rect, Size};

use crate::context::{ChildAdder, ChildLayouter, Context};
use crate::error::FrameError;
use crate::geometry::Constraints;
use crate::host::{CursorShape, Surface};
use crate::input::InputResult;

/// The capability set every widget implements.
///
/// All methods have default no-op bodies, so a widget only implements the
/// capabilities it uses. Callbacks are never concurrent and never
/// re-entrant; each runs to completion before the pipeline continues.
///
/// `bounds` arguments are screen-space for input, tick, affordance, and
/// draw callbacks (comparable against the cursor), and parent-space for
/// `layout` (as assigned by the widget's own parent).
pub trait Widget {
    /// Reconstructs this widget's children and handler registrations.
    ///
    /// Runs at most twice per frame. The previous children list has already
    /// been cleared; add every current child through `children`, in
    /// declaration order. Returning an error aborts the frame.
    fn build(&mut self, cx: &mut Context<'_>, children: &mut ChildAdder) -> Result<(), FrameError> {
        _ = (cx, children);
        Ok(())
    }

    /// Assigns bounds to this widget's direct children.
    ///
    /// `bounds` is this widget's own rectangle in its parent's coordinate
    /// space; child rectangles are relative to this widget.
    fn layout(&mut self, cx: &mut Context<'_>, bounds: Rect, children: &mut ChildLayouter) {
        _ = (cx, bounds, children);
    }

    /// Offers this frame's pointing (location-based) input to the widget.
    fn handle_pointing_input(&mut self, cx: &mut Context<'_>, bounds: Rect) -> InputResult {
        _ = (cx, bounds);
        InputResult::None
    }

    /// Offers this frame's button (focus-based) input to the widget.
    fn handle_button_input(&mut self, cx: &mut Context<'_>, bounds: Rect) -> InputResult {
        _ = (cx, bounds);
        InputResult::None
    }

    /// Advances per-frame state (animations, timers). Runs once per frame
    /// after input dispatch. Returning an error aborts the frame.
    fn tick(&mut self, cx: &mut Context<'_>, bounds: Rect) -> Result<(), FrameError> {
        _ = (cx, bounds);
        Ok(())
    }

    /// The cursor affordance to show while this widget is the topmost hit.
    fn cursor_shape(&self, cx: &mut Context<'_>, bounds: Rect) -> Option<CursorShape> {
        _ = (cx, bounds);
        None
    }

    /// Paints the widget. `surface` is the screen target, or the widget's
    /// backing surface when composited rendering is in effect.
    fn draw(&mut self, cx: &mut Context<'_>, bounds: Rect, surface: &mut dyn Surface) {
        _ = (cx, bounds, surface);
    }

    /// Reports the widget's preferred size under the given constraints.
    fn measure(&mut self, cx: &mut Context<'_>, constraints: Constraints) -> Size {
        _ = cx;
        constraints.fallback_size()
    }
}
