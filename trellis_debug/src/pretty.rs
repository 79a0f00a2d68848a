// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).
//! Frame-level events carry the host's microsecond timestamp; phase events
//! are ordered but untimed (the engine has no clock of its own).

use std::io::Write;

use trellis_core::trace::{
    DamageRect, FrameBeginEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    TraceSink, WidgetChange,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Build => "build",
        PhaseKind::Layout => "layout",
        PhaseKind::Input => "input",
        PhaseKind::Tick => "tick",
        PhaseKind::Draw => "draw",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let cursor = match e.cursor {
            Some(p) => format!("({:.1},{:.1})", p.x, p.y),
            None => "-".into(),
        };
        let _ = writeln!(
            self.writer,
            "[frame] index={} now={}µs screen={}x{} scale={} cursor={}",
            e.frame_index, e.now_us, e.screen.width, e.screen.height, e.scale, cursor,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase] frame={} pass={} {} begin",
            e.frame_index,
            e.pass,
            phase_name(e.phase),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase] frame={} pass={} {} end",
            e.frame_index,
            e.pass,
            phase_name(e.phase),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} passes={} widgets={} events={} claimed={} damage={:.0}px²{}",
            s.frame_index,
            s.passes,
            s.widgets,
            s.events_dispatched,
            s.input_claimed,
            s.damage_area,
            if s.full_damage { " (full)" } else { "" },
        );
    }

    fn on_widget_changes(&mut self, frame_index: u64, changes: &[WidgetChange]) {
        for change in changes {
            let _ = writeln!(
                self.writer,
                "[change] frame={frame_index} widget={} field={:?}",
                change.widget_index, change.field,
            );
        }
    }

    fn on_damage_rect(&mut self, frame_index: u64, rect: &DamageRect) {
        let _ = writeln!(
            self.writer,
            "[damage] frame={frame_index} rect=({:.1},{:.1})-({:.1},{:.1})",
            rect.x0, rect.y0, rect.x1, rect.y1,
        );
    }
}
