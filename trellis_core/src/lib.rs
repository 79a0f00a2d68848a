// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained widget tree and damage-tracked frame pipeline.
//!
//! `trellis_core` owns a hierarchy of stateful widgets and drives a
//! per-frame **build → layout → input → tick → draw** pipeline, computing
//! minimal screen-damage regions so only changed areas are repainted. It is
//! `no_std` compatible (with `alloc`) and stores all per-widget state in a
//! struct-of-arrays arena with generational index handles.
//!
//! # Architecture
//!
//! The crate is organized around a frame loop that turns host ticks into
//! incremental tree updates:
//!
//! ```text
//!   Host (tick source)
//!       │
//!       ▼
//!   FrameEnv ──► App::update() ──► UpdateReport (damage + cursor shape)
//!                    │
//!       build ─ layout ─ input ─ tick   (build/layout bounded at 2 passes)
//!                    │
//!                    ▼
//!   App::draw(Compositor, Surface) — painting restricted to the damage
//! ```
//!
//! **[`widget`]** — Struct-of-arrays widget arena with generational
//! handles. Behavior lives in [`Widget`](widget::Widget) trait objects;
//! derived visibility/enabled/z/visible-bounds values are memoized with
//! explicit invalidation.
//!
//! **[`dirty`]** — Multi-channel dirty tracking via `understory_dirty`.
//! Property mutations automatically mark the appropriate channel;
//! VISIBILITY and Z propagate to descendants, GEOMETRY and REDRAW are
//! local, TOPOLOGY is structural.
//!
//! **[`linear`]** — The constraint-based linear layout solver: fixed,
//! self-measured, and weight-flexible items along one axis, nestable.
//!
//! **[`input`]** — Z-ordered hit testing and input dispatch: highest layer
//! first, leaves before ancestors, with a cached cursor candidate list.
//!
//! **[`damage`]** — The single-rectangle damage accumulator fed by dirty
//! drains and the structural children diff.
//!
//! **[`app`]** — The frame driver sequencing it all, including focus
//! management and the bounded two-pass reconciliation loop.
//!
//! **[`host`]** — The contract a host runtime satisfies: per-tick
//! [`FrameEnv`](host::FrameEnv) snapshots, opaque
//! [`Surface`](host::Surface)s, and a [`Compositor`](host::Compositor)
//! for backing-surface rendering.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types
//! for pipeline instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-widget
//!   change and damage-rect events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod app;
pub mod context;
pub mod damage;
pub mod dirty;
pub mod error;
pub mod event;
pub mod geometry;
pub mod host;
pub mod input;
pub mod linear;
pub mod trace;
pub mod widget;

mod focus;
mod passes;

#[cfg(test)]
pub(crate) mod testutil;
