// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, tree dumps, and Chrome trace export for trellis
//! diagnostics.
//!
//! This crate provides development-time tooling on top of
//! [`trellis_core::trace`]:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`tree::dump`] — an indented one-line-per-widget snapshot of the
//!   current tree (flags, bounds, z).
//! - [`chrome::ChromeTraceCollector`] — collects trace events and writes
//!   Chrome Trace Event Format JSON for `chrome://tracing` or Perfetto.

pub mod chrome;
pub mod pretty;
pub mod tree;
