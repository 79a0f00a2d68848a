// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! frame driver calls at each stage. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! The engine has no clock of its own; the only timestamp in trace events is
//! the host-supplied [`FrameEnv::now_us`](crate::host::FrameEnv::now_us),
//! carried on the frame-level events. Phase events order the pipeline within
//! a frame; sinks that want phase durations timestamp on receipt.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates per-widget change records and
//!   damage-rect events plus the corresponding `TraceSink` methods.

use kurbo::{Point, Size};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the frame pipeline is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Children-list reconstruction and handler registration.
    Build,
    /// Bounds assignment and z collection.
    Layout,
    /// Pointing and button input dispatch.
    Input,
    /// Per-frame widget ticks.
    Tick,
    /// Damage-restricted painting.
    Draw,
}

/// Which property of a widget changed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetField {
    /// Bounds assigned by the layout pass.
    Bounds,
    /// Hidden/disabled/transparency/blend.
    Visibility,
    /// Z delta.
    Z,
    /// An explicit redraw request.
    Redraw,
    /// Children list rewritten.
    Topology,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the host delivers a frame tick to [`App::update`].
///
/// [`App::update`]: crate::app::App::update
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host timestamp in microseconds.
    pub now_us: u64,
    /// Logical screen size.
    pub screen: Size,
    /// Device pixel scale.
    pub scale: f64,
    /// Cursor position, if inside the screen.
    pub cursor: Option<Point>,
}

/// Marks the beginning of a pipeline phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which build/layout pass this phase belongs to (0 or 1).
    pub pass: u8,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a pipeline phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which build/layout pass this phase belongs to (0 or 1).
    pub pass: u8,
    /// Which phase is ending.
    pub phase: PhaseKind,
}

/// Per-frame summary produced at the end of [`App::update`].
///
/// [`App::update`]: crate::app::App::update
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Host timestamp in microseconds.
    pub now_us: u64,
    /// Build/layout passes that ran this frame (0, 1, or 2).
    pub passes: u8,
    /// Widgets in the current tree.
    pub widgets: u32,
    /// Events dispatched during the frame.
    pub events_dispatched: u32,
    /// Whether any input was claimed.
    pub input_claimed: bool,
    /// Damaged area in square pixels (screen area when damage is full).
    pub damage_area: f64,
    /// Whether the whole screen was damaged.
    pub full_damage: bool,
}

/// A per-frame widget change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct WidgetChange {
    /// Raw slot index of the widget that changed.
    pub widget_index: u32,
    /// Which field changed.
    pub field: WidgetField,
}

/// An axis-aligned damage rectangle in screen coordinates.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DamageRect {
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge.
    pub y1: f64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame tick is received.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a pipeline phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pipeline phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called with the per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with per-frame widget changes (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_widget_changes(&mut self, frame_index: u64, changes: &[WidgetChange]) {
        _ = (frame_index, changes);
    }

    /// Called with the frame's damage rectangle (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_damage_rect(&mut self, frame_index: u64, rect: &DamageRect) {
        _ = (frame_index, rect);
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits per-frame widget changes (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn widget_changes(&mut self, frame_index: u64, changes: &[WidgetChange]) {
        if let Some(s) = &mut self.sink {
            s.on_widget_changes(frame_index, changes);
        }
    }

    /// Emits the frame's damage rectangle (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage_rect(&mut self, frame_index: u64, rect: &DamageRect) {
        if let Some(s) = &mut self.sink {
            s.on_damage_rect(frame_index, rect);
        }
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct CountingSink {
        frames: Vec<u64>,
        phases: u32,
    }

    impl TraceSink for CountingSink {
        fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
            self.frames.push(e.frame_index);
        }

        fn on_phase_begin(&mut self, _e: &PhaseBeginEvent) {
            self.phases += 1;
        }
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let mut sink = CountingSink::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame_begin(&FrameBeginEvent {
            frame_index: 3,
            now_us: 0,
            screen: Size::new(10.0, 10.0),
            scale: 1.0,
            cursor: None,
        });
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 3,
            pass: 0,
            phase: PhaseKind::Build,
        });
        drop(tracer);
        assert_eq!(sink.frames, [3]);
        assert_eq!(sink.phases, 1);
    }

    #[test]
    fn none_tracer_is_inert() {
        let mut tracer = Tracer::none();
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            pass: 0,
            phase: PhaseKind::Tick,
        });
    }
}
