// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless host for trellis tests and demos.
//!
//! Three pieces, usable separately:
//!
//! - [`InputScript`] — builds a deterministic sequence of
//!   [`FrameEnv`]s (cursor moves, clicks, key presses, resizes) without a
//!   window.
//! - [`RecordingCompositor`] / [`RecordingSurface`] — host test doubles
//!   that satisfy the [`Compositor`]/[`Surface`] contract and record what
//!   the engine asked of them.
//! - [`RepaintStats`] — a rolling tracker over [`UpdateReport`]s that
//!   grades repaint efficiency, for demo HUDs and regression tests.
//!
//! [`drive`] wires them together: it pumps every scripted frame through
//! `update` and `draw` and returns the collected reports.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Point, Size};

use trellis_core::app::App;
use trellis_core::error::FrameError;
use trellis_core::host::{
    BlendMode, Compositor, FrameEnv, KeyInput, Surface, UpdateReport,
};
use trellis_core::trace::Tracer;

/// Builds a deterministic [`FrameEnv`] sequence.
///
/// Every step appends one frame carrying the accumulated pointer/keyboard
/// state; timestamps advance by a fixed interval (default 16,667µs).
#[derive(Debug)]
pub struct InputScript {
    template: FrameEnv,
    interval_us: u64,
    frames: Vec<FrameEnv>,
}

impl InputScript {
    /// Starts a script on a screen of the given size at scale 1.
    #[must_use]
    pub fn new(screen: Size) -> Self {
        Self {
            template: FrameEnv {
                screen,
                scale: 1.0,
                ..FrameEnv::default()
            },
            interval_us: 16_667,
            frames: Vec::new(),
        }
    }

    /// Overrides the per-frame timestamp interval.
    #[must_use]
    pub fn interval_us(mut self, interval_us: u64) -> Self {
        self.interval_us = interval_us;
        self
    }

    fn push(&mut self) {
        let mut env = self.template.clone();
        env.now_us = (self.frames.len() as u64 + 1) * self.interval_us;
        self.frames.push(env);
        self.template.keys.clear();
    }

    /// Appends `count` frames with no state change.
    #[must_use]
    pub fn idle(mut self, count: u32) -> Self {
        for _ in 0..count {
            self.push();
        }
        self
    }

    /// Moves the cursor and appends a frame.
    #[must_use]
    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.template.cursor = Some(Point::new(x, y));
        self.push();
        self
    }

    /// Moves the cursor off screen and appends a frame.
    #[must_use]
    pub fn leave(mut self) -> Self {
        self.template.cursor = None;
        self.push();
        self
    }

    /// Presses the primary pointer button and appends a frame.
    #[must_use]
    pub fn press(mut self) -> Self {
        self.template.buttons.primary = true;
        self.push();
        self
    }

    /// Releases the primary pointer button and appends a frame.
    #[must_use]
    pub fn release(mut self) -> Self {
        self.template.buttons.primary = false;
        self.push();
        self
    }

    /// Appends a frame carrying a key press and release transition.
    #[must_use]
    pub fn key(mut self, code: u32) -> Self {
        self.template.keys.push(KeyInput {
            code,
            pressed: true,
        });
        self.template.keys.push(KeyInput {
            code,
            pressed: false,
        });
        self.push();
        self
    }

    /// Resizes the screen and appends a frame.
    #[must_use]
    pub fn resize(mut self, screen: Size) -> Self {
        self.template.screen = screen;
        self.push();
        self
    }

    /// The built frame sequence.
    #[must_use]
    pub fn frames(self) -> Vec<FrameEnv> {
        self.frames
    }
}

/// A surface test double that remembers its size.
///
/// Test widgets can downcast to it and append to [`notes`](Self::notes) to
/// record their paint calls.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Logical size.
    pub size: Size,
    /// Free-form paint notes pushed by test widgets.
    pub notes: Vec<alloc::string::String>,
}

impl RecordingSurface {
    /// Creates a surface of the given size.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            notes: Vec::new(),
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn core::any::Any {
        self
    }
}

/// One composite call observed by a [`RecordingCompositor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeCall {
    /// Target-space position of the source's top-left corner.
    pub at: Point,
    /// Applied opacity (1 = opaque).
    pub alpha: f32,
    /// Blend mode.
    pub blend: BlendMode,
}

/// A compositor test double: allocates [`RecordingSurface`]s and records
/// every composite call.
#[derive(Debug, Default)]
pub struct RecordingCompositor {
    /// Surfaces allocated so far.
    pub created: u32,
    /// Composite calls in order.
    pub composites: Vec<CompositeCall>,
}

impl RecordingCompositor {
    /// Creates an idle compositor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Compositor for RecordingCompositor {
    fn create_surface(&mut self, size: Size) -> Box<dyn Surface> {
        self.created += 1;
        Box::new(RecordingSurface::new(size))
    }

    fn clear_surface(&mut self, surface: &mut dyn Surface) {
        if let Some(s) = surface.as_any_mut().downcast_mut::<RecordingSurface>() {
            s.notes.clear();
        }
    }

    fn composite(
        &mut self,
        _target: &mut dyn Surface,
        _source: &dyn Surface,
        at: Point,
        alpha: f32,
        blend: BlendMode,
    ) {
        self.composites.push(CompositeCall { at, alpha, blend });
    }
}

/// Letter grade for repaint efficiency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepaintGrade {
    /// Tight damage, rare rebuilds.
    A,
    /// Moderate damage.
    B,
    /// Large damage regions most frames.
    C,
    /// Mostly full-screen repaints.
    D,
}

impl RepaintGrade {
    /// Returns a short label for HUD rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`RepaintStats::observe`].
#[derive(Clone, Copy, Debug)]
pub struct RepaintReport {
    /// Current grade.
    pub grade: RepaintGrade,
    /// Mean damaged fraction of the screen over the window (0–1).
    pub mean_damage_fraction: f64,
    /// Full-screen repaints per 1000 observed frames.
    pub full_repaints_per_1000: f64,
    /// Total frames observed.
    pub total_frames: u64,
    /// Total build/layout passes observed.
    pub total_passes: u64,
}

/// Rolling repaint tracker with fixed-size damage-fraction history.
#[derive(Debug)]
pub struct RepaintStats<const N: usize> {
    fractions: [f64; N],
    cursor: usize,
    total_frames: u64,
    total_passes: u64,
    full_repaints: u64,
}

impl<const N: usize> Default for RepaintStats<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RepaintStats<N> {
    /// Creates a tracker with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fractions: [0.0; N],
            cursor: 0,
            total_frames: 0,
            total_passes: 0,
            full_repaints: 0,
        }
    }

    /// Observes one frame's report and returns updated statistics.
    #[must_use]
    pub fn observe(&mut self, report: &UpdateReport, screen: Size) -> RepaintReport {
        let screen_area = (screen.width * screen.height).max(1.0);
        let fraction = (report.damage.area(screen) / screen_area).clamp(0.0, 1.0);

        self.fractions[self.cursor % N] = fraction;
        self.cursor = (self.cursor + 1) % N;
        self.total_frames = self.total_frames.saturating_add(1);
        self.total_passes = self
            .total_passes
            .saturating_add(u64::from(report.passes));
        if matches!(report.damage, trellis_core::damage::Damage::Full) {
            self.full_repaints = self.full_repaints.saturating_add(1);
        }

        let window = (self.total_frames as usize).min(N).max(1);
        let mean: f64 = self.fractions.iter().take(window).sum::<f64>() / window as f64;
        let full_rate = self.full_repaints as f64 * 1000.0 / self.total_frames as f64;

        let grade = if mean < 0.05 {
            RepaintGrade::A
        } else if mean < 0.25 {
            RepaintGrade::B
        } else if mean < 0.75 {
            RepaintGrade::C
        } else {
            RepaintGrade::D
        };

        RepaintReport {
            grade,
            mean_damage_fraction: mean,
            full_repaints_per_1000: full_rate,
            total_frames: self.total_frames,
            total_passes: self.total_passes,
        }
    }
}

/// Pumps every scripted frame through `update` and `draw` against
/// recording doubles, returning the per-frame reports.
///
/// Draw is skipped for frames with empty damage, exactly as a real host
/// would.
pub fn drive(
    app: &mut App,
    frames: &[FrameEnv],
    compositor: &mut RecordingCompositor,
) -> Result<Vec<UpdateReport>, FrameError> {
    let mut reports = Vec::with_capacity(frames.len());
    for env in frames {
        let report = app.update(env, &mut Tracer::none())?;
        if !report.damage.is_empty() {
            let mut target = RecordingSurface::new(env.screen);
            app.draw(compositor, &mut target, &mut Tracer::none());
        }
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::damage::Damage;
    use trellis_core::host::CursorShape;

    #[test]
    fn script_accumulates_pointer_state() {
        let frames = InputScript::new(Size::new(100.0, 100.0))
            .move_to(10.0, 10.0)
            .press()
            .release()
            .idle(1)
            .frames();

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].cursor, Some(Point::new(10.0, 10.0)));
        assert!(frames[1].buttons.primary);
        assert!(!frames[2].buttons.primary);
        assert_eq!(frames[3].cursor, Some(Point::new(10.0, 10.0)));
        assert!(frames[0].now_us < frames[3].now_us);
    }

    #[test]
    fn key_transitions_last_one_frame() {
        let frames = InputScript::new(Size::new(10.0, 10.0))
            .key(42)
            .idle(1)
            .frames();
        assert_eq!(frames[0].keys.len(), 2);
        assert!(frames[0].keys[0].pressed);
        assert!(!frames[0].keys[1].pressed);
        assert!(frames[1].keys.is_empty());
    }

    #[test]
    fn repaint_stats_grade_by_mean_damage() {
        let screen = Size::new(100.0, 100.0);
        let mut stats = RepaintStats::<8>::new();

        let quiet = UpdateReport {
            damage: Damage::None,
            cursor_shape: CursorShape::Default,
            passes: 0,
        };
        let mut report = stats.observe(&quiet, screen);
        assert_eq!(report.grade, RepaintGrade::A);

        let full = UpdateReport {
            damage: Damage::Full,
            cursor_shape: CursorShape::Default,
            passes: 2,
        };
        for _ in 0..8 {
            report = stats.observe(&full, screen);
        }
        assert_eq!(report.grade, RepaintGrade::D);
        assert!(report.full_repaints_per_1000 > 800.0);
        assert_eq!(report.total_passes, 16);
    }
}
