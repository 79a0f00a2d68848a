// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame driver.
//!
//! [`App`] owns the widget arena and sequences the per-frame pipeline:
//!
//! ```text
//!   Host tick ──► App::update(FrameEnv)
//!                   │ 1. focus the root if nothing holds focus
//!                   │ 2. full damage on scale change
//!                   │ 3. build ► layout ► refresh hit candidates   ┐
//!                   │ 4. dispatch pointing, then button input      │ ≤ 2 passes
//!                   │ 5. drain dirty channels into damage ─────────┘
//!                   │ 7. tick every widget
//!                   │ 8. full damage on resize, else structural diff
//!                   │ 9. snapshot children for the next diff
//!                   │ 10. carry required phases to the next frame
//!                   ▼
//!               UpdateReport (damage + cursor shape)
//!   Host draw ──► App::draw(compositor, target)  — restricted to damage
//! ```
//!
//! The second build/layout pass (step 6) exists so that state mutated by
//! input handlers is reflected in geometry and visibility *before* ticking
//! and drawing, instead of showing stale layout for one frame. It is
//! bounded at compile time: reconciliation that does not converge in
//! [`MAX_PASSES_PER_FRAME`] passes waits for the next frame.
//!
//! A `build` or `tick` callback returning an error aborts the frame
//! immediately and propagates to the host; the previous frame's pixels
//! stay on screen.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Rect, Size};

use crate::context::Context;
use crate::damage::{Damage, rect_intersect, rect_is_empty};
use crate::dirty;
use crate::error::FrameError;
use crate::event::Event;
use crate::host::{
    BlendMode, ColorMode, Compositor, FrameEnv, KeyInput, PointerButtons, Surface, UpdateReport,
};
use crate::input::{HitCandidate, InputCategory};
use crate::trace::{
    FrameBeginEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer,
};
use crate::widget::{Backing, ChildRecord, INVALID, Widget, WidgetArena, WidgetId};

/// Upper bound on build/layout passes per frame.
pub const MAX_PASSES_PER_FRAME: u8 = 2;

/// Construction-time configuration, in the spirit of a platform preset.
#[derive(Clone, Copy, Debug)]
pub struct AppConfig {
    /// Resolve a cursor affordance each frame. Hosts without cursor
    /// control can skip the per-frame affordance walk.
    pub resolve_cursor_shape: bool,
    /// Local z offset applied to the root widget (the root's resolved z
    /// equals its own delta).
    pub root_z_delta: u32,
}

impl AppConfig {
    /// Default configuration for pointer-driven hosts.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            resolve_cursor_shape: true,
            root_z_delta: 0,
        }
    }

    /// Configuration for hosts without a cursor (touch panels, appliances).
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            resolve_cursor_shape: false,
            root_z_delta: 0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

/// The engine: widget arena plus per-frame pipeline state.
///
/// Created once at startup and threaded by reference into every entry
/// point; there are no globals. [`shutdown`](Self::shutdown) ends the
/// lifecycle explicitly.
pub struct App {
    pub(crate) arena: WidgetArena,
    root: WidgetId,
    pub(crate) config: AppConfig,

    // -- Frame/generation state --
    pub(crate) build_count: u64,
    frame_index: u64,
    pub(crate) phase: Option<PhaseKind>,
    pub(crate) needs_rebuild: bool,
    pub(crate) layout_ran: bool,
    pub(crate) events_dispatched: u32,
    pub(crate) input_claimed: bool,

    // -- Derived per-frame structures --
    pub(crate) traversal: Vec<u32>,
    pub(crate) z_values: Vec<u32>,
    pub(crate) hit_candidates: Vec<HitCandidate>,
    pub(crate) hit_cache_valid: bool,
    pub(crate) focused: u32,
    pub(crate) damage: Damage,

    // -- Environment snapshot --
    pub(crate) screen: Size,
    pub(crate) scale: f64,
    pub(crate) cursor: Option<Point>,
    pub(crate) buttons: PointerButtons,
    pub(crate) keys: Vec<KeyInput>,
    pub(crate) locale: String,
    pub(crate) color_mode: ColorMode,
    now_us: u64,
    screen_changed: bool,
    scale_changed: bool,
}

impl core::fmt::Debug for App {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("App")
            .field("root", &self.root)
            .field("build_count", &self.build_count)
            .field("frame_index", &self.frame_index)
            .field("screen", &self.screen)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Creates the engine with `root` at the top of the tree.
    ///
    /// The first [`update`](Self::update) always runs a build and layout
    /// pass.
    #[must_use]
    pub fn new(config: AppConfig, root: Box<dyn Widget>) -> Self {
        let mut arena = WidgetArena::new();
        let root_id = arena.insert(root);
        arena.stamp(root_id.idx, 0);
        arena.set_z_delta(root_id.idx, config.root_z_delta);
        Self {
            arena,
            root: root_id,
            config,
            build_count: 0,
            frame_index: 0,
            phase: None,
            needs_rebuild: true,
            layout_ran: false,
            events_dispatched: 0,
            input_claimed: false,
            traversal: Vec::new(),
            z_values: Vec::new(),
            hit_candidates: Vec::new(),
            hit_cache_valid: false,
            focused: INVALID,
            damage: Damage::None,
            screen: Size::ZERO,
            scale: 1.0,
            cursor: None,
            buttons: PointerButtons::default(),
            keys: Vec::new(),
            locale: String::new(),
            color_mode: ColorMode::Light,
            now_us: 0,
            screen_changed: false,
            scale_changed: false,
        }
    }

    /// Ends the engine lifecycle, dropping every widget.
    pub fn shutdown(mut self) {
        self.clear_focus();
    }

    /// The root widget.
    #[must_use]
    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub(crate) fn root_idx(&self) -> u32 {
        self.root.idx
    }

    /// The current build stamp (increments once per build pass).
    #[must_use]
    pub fn build_count(&self) -> u64 {
        self.build_count
    }

    /// Read access to the widget arena.
    #[must_use]
    pub fn arena(&self) -> &WidgetArena {
        &self.arena
    }

    /// Mutable access to the widget arena.
    ///
    /// Intended for hosts and tooling between frames; inside callbacks,
    /// use the [`Context`] facade (it keeps focus consistent immediately —
    /// direct mutations are only reconciled by the next build pass).
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut WidgetArena {
        &mut self.arena
    }

    /// The distinct resolved z values of the current layout, ascending.
    #[must_use]
    pub fn z_layers(&self) -> &[u32] {
        &self.z_values
    }

    /// The current tree in pre-order, for tooling.
    #[must_use]
    pub fn tree_order(&self) -> Vec<WidgetId> {
        self.traversal
            .iter()
            .map(|&idx| self.arena.id_at(idx))
            .collect()
    }

    // -----------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------

    /// Negotiates the screen size before a frame: the root widget measures
    /// itself against the space the host offers, and the host sizes its
    /// surface accordingly. The default `measure` accepts the offer
    /// unchanged.
    pub fn negotiate_size(&mut self, available: Size) -> Size {
        let root = self.root.idx;
        let mut widget = self.arena.take_widget(root);
        let size = {
            let mut cx = Context {
                app: &mut *self,
                node: root,
            };
            widget.measure(
                &mut cx,
                crate::geometry::Constraints::tight(available.width, available.height),
            )
        };
        self.arena.put_widget(root, widget);
        size
    }

    /// Runs one frame of the pipeline: conditional build/layout passes,
    /// input dispatch, ticking, and damage accounting.
    pub fn update(
        &mut self,
        env: &FrameEnv,
        tracer: &mut Tracer<'_>,
    ) -> Result<UpdateReport, FrameError> {
        self.frame_index += 1;
        self.absorb_env(env);
        tracer.frame_begin(&FrameBeginEvent {
            frame_index: self.frame_index,
            now_us: self.now_us,
            screen: self.screen,
            scale: self.scale,
            cursor: self.cursor,
        });

        self.events_dispatched = 0;
        self.input_claimed = false;
        self.layout_ran = false;
        let mut passes: u8 = 0;

        // 1. Something must hold focus; default to the root.
        if self.focused == INVALID || !self.arena.slot_live(self.focused) {
            self.focused = INVALID;
            let root = self.root;
            let _ = self.set_focused(root);
        }

        // 2. A scale change invalidates every rendered pixel.
        if self.scale_changed {
            self.damage.set_full();
        }

        // 3.-6. Bounded rebuild/dispatch loop.
        for pass in 0..MAX_PASSES_PER_FRAME {
            let rebuild = if pass == 0 { self.needs_rebuild } else { true };
            if rebuild {
                passes += 1;
                self.run_phase(tracer, pass, PhaseKind::Build, |app| app.run_build())?;
                self.run_phase(tracer, pass, PhaseKind::Layout, |app| {
                    app.run_layout();
                    Ok(())
                })?;
            }

            self.run_phase(tracer, pass, PhaseKind::Input, |app| {
                app.dispatch_input(InputCategory::Pointing);
                app.dispatch_input(InputCategory::Button);
                Ok(())
            })?;

            // 5. Fold this pass's changes into the damage region and decide
            // whether the frame has to reconcile once more.
            self.accumulate_damage(tracer);
            let reconcile =
                self.events_dispatched > 0 || self.input_claimed || !self.damage.is_empty();
            if pass > 0 || !reconcile {
                break;
            }
        }

        // 7. Tick runs once, after the final pass's input dispatch.
        self.run_phase(tracer, passes.saturating_sub(1), PhaseKind::Tick, |app| {
            app.run_tick()
        })?;
        self.accumulate_damage(tracer);

        // 8. Structural damage, against the post-tick tree.
        if self.screen_changed {
            self.damage.set_full();
        } else if self.layout_ran {
            self.structural_diff();
        }

        // 9. Snapshot for the next frame's diff.
        self.snapshot_children();

        // 10. Mirror step 5 for the next frame, resolve the affordance.
        self.needs_rebuild =
            self.events_dispatched > 0 || self.input_claimed || !self.damage.is_empty();
        let cursor_shape = self.resolve_cursor_shape();
        self.phase = None;

        #[cfg(feature = "trace-rich")]
        if let Damage::Rect(r) = &self.damage {
            tracer.damage_rect(
                self.frame_index,
                &crate::trace::DamageRect {
                    x0: r.x0,
                    y0: r.y0,
                    x1: r.x1,
                    y1: r.y1,
                },
            );
        }
        tracer.frame_summary(&FrameSummary {
            frame_index: self.frame_index,
            now_us: self.now_us,
            passes,
            widgets: self.traversal.len() as u32,
            events_dispatched: self.events_dispatched,
            input_claimed: self.input_claimed,
            damage_area: self.damage.area(self.screen),
            full_damage: matches!(self.damage, Damage::Full),
        });

        Ok(UpdateReport {
            damage: self.damage.clone(),
            cursor_shape,
            passes,
        })
    }

    fn run_phase(
        &mut self,
        tracer: &mut Tracer<'_>,
        pass: u8,
        phase: PhaseKind,
        f: impl FnOnce(&mut Self) -> Result<(), FrameError>,
    ) -> Result<(), FrameError> {
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            pass,
            phase,
        });
        let result = f(self);
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            pass,
            phase,
        });
        result
    }

    fn absorb_env(&mut self, env: &FrameEnv) {
        let first = self.frame_index <= 1;
        self.screen_changed = !first && self.screen != env.screen;
        self.scale_changed = !first && self.scale != env.scale;
        if self.cursor != env.cursor {
            self.hit_cache_valid = false;
        }
        self.screen = env.screen;
        self.scale = env.scale;
        self.cursor = env.cursor;
        self.buttons = env.buttons;
        self.keys.clear();
        self.keys.extend_from_slice(&env.keys);
        self.locale.clear();
        self.locale.push_str(&env.locale);
        self.color_mode = env.color_mode;
        self.now_us = env.now_us;
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    /// Runs the handler slot for `event` on the widget at `idx` and marks
    /// it as having dispatched an event.
    pub(crate) fn fire_event(&mut self, idx: u32, event: &Event) {
        let mut handlers = self.arena.take_handlers(idx);
        handlers.invoke(event);
        self.arena.put_handlers(idx, handlers);
        self.arena.set_event_dispatched(idx, true);
        self.events_dispatched += 1;
    }

    // -----------------------------------------------------------------
    // Damage
    // -----------------------------------------------------------------

    pub(crate) fn in_current_tree(&self, idx: u32) -> bool {
        self.arena.slot_live(idx) && self.arena.built_at(idx) == self.build_count
    }

    /// Drains all dirty channels, unioning each changed widget's visible
    /// bounds into the damage region.
    fn accumulate_damage(&mut self, tracer: &mut Tracer<'_>) {
        _ = &tracer;
        let redraws = self.arena.drain_local(dirty::REDRAW);
        let geometry = self.arena.drain_local(dirty::GEOMETRY);
        let visibility = self.arena.drain_propagating(dirty::VISIBILITY);
        let z = self.arena.drain_propagating(dirty::Z);
        self.damage_changed(&redraws);
        self.damage_changed(&geometry);
        self.damage_changed(&visibility);
        self.damage_changed(&z);

        // Topology marks carry no geometry of their own; the structural
        // diff produces the repaint damage.
        let _ = self.arena.drain_local(dirty::TOPOLOGY);

        #[cfg(feature = "trace-rich")]
        {
            use crate::trace::{WidgetChange, WidgetField};
            let mut changes = Vec::new();
            let drains = [
                (&redraws, WidgetField::Redraw),
                (&geometry, WidgetField::Bounds),
                (&visibility, WidgetField::Visibility),
                (&z, WidgetField::Z),
            ];
            for (indices, field) in drains {
                for &idx in indices {
                    if self.in_current_tree(idx) {
                        changes.push(WidgetChange {
                            widget_index: idx,
                            field,
                        });
                    }
                }
            }
            if !changes.is_empty() {
                tracer.widget_changes(self.frame_index, &changes);
            }
        }
    }

    fn damage_changed(&mut self, indices: &[u32]) {
        for &idx in indices {
            if !self.in_current_tree(idx) {
                continue;
            }
            let bounds = self.arena.visible_bounds_at(idx);
            self.damage.add_rect(bounds);
        }
    }

    fn child_records(&mut self, idx: u32) -> Vec<ChildRecord> {
        let children: Vec<u32> = self.arena.children_at(idx).to_vec();
        children
            .into_iter()
            .map(|c| ChildRecord {
                id: self.arena.id_at(c),
                visible_bounds: self.arena.visible_bounds_at(c),
                float: self.arena.flags_at(c).float,
                z_delta: self.arena.z_delta_at(c),
                visible: self.arena.visible_at(c),
                pass_through: self.arena.flags_at(c).pass_through,
            })
            .collect()
    }

    /// Compares every widget's previous children snapshot against the
    /// current children. A mismatch damages the widget's own visible
    /// bounds, and explicitly the bounds of children on their own layer
    /// (`float` or nonzero z delta, current *and* previous) — those are
    /// not geometrically nested in the parent, so the parent's bounds
    /// union would miss them.
    fn structural_diff(&mut self) {
        for pos in 0..self.traversal.len() {
            let idx = self.traversal[pos];
            let current = self.child_records(idx);
            if current.as_slice() == self.arena.prev_children(idx) {
                continue;
            }

            let own = self.arena.visible_bounds_at(idx);
            self.damage.add_rect(own);
            for record in &current {
                if record.z_delta > 0 || record.float {
                    self.damage.add_rect(record.visible_bounds);
                }
            }
            let stale: Vec<Rect> = self
                .arena
                .prev_children(idx)
                .iter()
                .filter(|r| r.z_delta > 0 || r.float)
                .map(|r| r.visible_bounds)
                .collect();
            for bounds in stale {
                self.damage.add_rect(bounds);
            }
        }
    }

    fn snapshot_children(&mut self) {
        for pos in 0..self.traversal.len() {
            let idx = self.traversal[pos];
            let records = self.child_records(idx);
            self.arena.set_prev_children(idx, records);
        }
    }

    // -----------------------------------------------------------------
    // Draw
    // -----------------------------------------------------------------

    /// Paints the damaged region in ascending z order, then clears the
    /// damage.
    ///
    /// Widgets with nonzero transparency or a non-default blend mode
    /// render through a lazily-allocated backing surface (covering the
    /// widget and its same-layer descendants) which is composited onto the
    /// target; descendants on other layers composite independently.
    pub fn draw(
        &mut self,
        compositor: &mut dyn Compositor,
        target: &mut dyn Surface,
        tracer: &mut Tracer<'_>,
    ) {
        self.phase = Some(PhaseKind::Draw);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            pass: 0,
            phase: PhaseKind::Draw,
        });

        if let Some(region) = self.damage.clip(self.screen) {
            let root = self.root_idx();
            for pos in 0..self.z_values.len() {
                let z = self.z_values[pos];
                self.draw_layer(root, z, region, compositor, target, Point::ZERO, false);
            }
            self.damage = Damage::None;
        }

        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            pass: 0,
            phase: PhaseKind::Draw,
        });
        self.phase = None;
    }

    fn is_composited(&self, idx: u32) -> bool {
        self.arena.transparency_at(idx) > 0.0
            || self.arena.blend_at(idx) != BlendMode::SourceOver
    }

    fn draw_layer(
        &mut self,
        idx: u32,
        z: u32,
        region: Rect,
        compositor: &mut dyn Compositor,
        target: &mut dyn Surface,
        target_origin: Point,
        composite_root: bool,
    ) {
        if self.arena.flags_at(idx).hidden {
            return;
        }

        if self.arena.z_at(idx) == z {
            let visible = self.arena.visible_bounds_at(idx);
            if !rect_is_empty(rect_intersect(visible, region)) {
                if self.is_composited(idx) && !composite_root {
                    self.draw_composited(idx, z, compositor, target, target_origin);
                    // The same-layer subtree was rendered into the backing.
                    return;
                }
                let bounds = self.arena.screen_bounds_at(idx) - target_origin.to_vec2();
                let mut widget = self.arena.take_widget(idx);
                {
                    let mut cx = Context {
                        app: &mut *self,
                        node: idx,
                    };
                    widget.draw(&mut cx, bounds, target);
                }
                self.arena.put_widget(idx, widget);
            }
        }

        let children: Vec<u32> = self.arena.children_at(idx).to_vec();
        for child in children {
            self.draw_layer(child, z, region, compositor, target, target_origin, false);
        }
    }

    fn draw_composited(
        &mut self,
        idx: u32,
        z: u32,
        compositor: &mut dyn Compositor,
        target: &mut dyn Surface,
        target_origin: Point,
    ) {
        let screen_bounds = self.arena.screen_bounds_at(idx);
        let size = screen_bounds.size();

        // Reuse the backing surface while the requested size is unchanged.
        let mut backing = match self.arena.take_backing(idx) {
            Some(backing) if backing.size == size => backing,
            _ => Backing {
                size,
                surface: compositor.create_surface(size),
            },
        };
        compositor.clear_surface(backing.surface.as_mut());

        self.draw_layer(
            idx,
            z,
            screen_bounds,
            compositor,
            backing.surface.as_mut(),
            screen_bounds.origin(),
            true,
        );

        let at = screen_bounds.origin() - target_origin.to_vec2();
        let alpha = 1.0 - self.arena.transparency_at(idx);
        compositor.composite(
            target,
            backing.surface.as_ref(),
            at,
            alpha,
            self.arena.blend_at(idx),
        );
        self.arena.put_backing(idx, backing);
    }
}
