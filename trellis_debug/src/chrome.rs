// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`ChromeTraceCollector`] implements [`TraceSink`], accumulating events
//! in memory; [`write_json`](ChromeTraceCollector::write_json) writes a
//! complete [Chrome Trace Event Format][spec] JSON array suitable for
//! `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
//!
//! Phase events carry no timestamps of their own (the engine has no
//! clock), so each phase is stamped with its frame's host timestamp —
//! phases nest correctly in the timeline but show zero duration. The
//! per-frame damage area is emitted as a counter track.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use trellis_core::trace::{
    FrameBeginEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// Accumulates trace events and exports them as Chrome trace JSON.
#[derive(Debug, Default)]
pub struct ChromeTraceCollector {
    events: Vec<Value>,
    frame_ts: u64,
}

impl ChromeTraceCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected trace events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Writes the collected events as a JSON array.
    pub fn write_json(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *writer, &self.events).map_err(io::Error::other)?;
        writer.flush()
    }
}

impl TraceSink for ChromeTraceCollector {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.frame_ts = e.now_us;
        self.events.push(json!({
            "ph": "i",
            "name": "FrameBegin",
            "cat": "Frame",
            "ts": e.now_us,
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "frame_index": e.frame_index,
                "screen": format!("{}x{}", e.screen.width, e.screen.height),
                "scale": e.scale,
            }
        }));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.events.push(json!({
            "ph": "B",
            "name": format!("{:?}", e.phase),
            "cat": "Frame",
            "ts": self.frame_ts,
            "pid": 0,
            "tid": u64::from(e.pass),
            "args": {
                "frame_index": e.frame_index,
            }
        }));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.events.push(json!({
            "ph": "E",
            "name": format!("{:?}", e.phase),
            "cat": "Frame",
            "ts": self.frame_ts,
            "pid": 0,
            "tid": u64::from(e.pass),
            "args": {
                "frame_index": e.frame_index,
            }
        }));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.events.push(json!({
            "ph": "C",
            "name": "damage",
            "cat": "Summary",
            "ts": s.now_us,
            "pid": 0,
            "tid": 0,
            "args": {
                "area_px2": s.damage_area,
            }
        }));
        self.events.push(json!({
            "ph": "i",
            "name": "FrameSummary",
            "cat": "Summary",
            "ts": s.now_us,
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": {
                "frame_index": s.frame_index,
                "passes": s.passes,
                "widgets": s.widgets,
                "events_dispatched": s.events_dispatched,
                "input_claimed": s.input_claimed,
                "full_damage": s.full_damage,
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use trellis_core::trace::PhaseKind;

    #[test]
    fn export_produces_a_json_array_of_events() {
        let mut collector = ChromeTraceCollector::new();
        collector.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            now_us: 1000,
            screen: Size::new(100.0, 100.0),
            scale: 1.0,
            cursor: None,
        });
        collector.on_phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            pass: 0,
            phase: PhaseKind::Build,
        });
        collector.on_phase_end(&PhaseEndEvent {
            frame_index: 1,
            pass: 0,
            phase: PhaseKind::Build,
        });
        assert_eq!(collector.len(), 3);

        let mut out: Vec<u8> = Vec::new();
        collector.write_json(&mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Build");
        assert_eq!(parsed[1]["ts"], 1000);
    }
}
