// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Trellis uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! tell the frame driver *what kind* of change happened since the last frame
//! without re-walking the tree. Each channel is an independent category of
//! change; all channels are drained once per frame by the damage step.
//!
//! # Propagation semantics
//!
//! - **Propagating** — [`VISIBILITY`] and [`Z`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency
//!   edges from child to parent. Marking a parent dirty automatically marks
//!   all descendants, because effective visibility, enabled state, and
//!   resolved z are inherited properties.
//!
//! - **Local-only** — [`GEOMETRY`] and [`REDRAW`] are marked with the default
//!   policy. Bounds are written per node by the layout pass and redraw
//!   requests name a single widget, so only the explicitly marked slot
//!   appears in the drain output.
//!
//! - **Structural** — [`TOPOLOGY`] is marked when a build pass changes a
//!   widget's children list. It is consumed (and discarded) by the damage
//!   step; structural repaint damage comes from the snapshot diff instead.
//!
//! Note that the dirty channels are *frame-grained*: point queries between
//! drains (`is_visible`, `z`, `visible_bounds`) are served by the lazy
//! memoized caches in the arena, which the same setters invalidate.

use understory_dirty::Channel;

/// Hidden, disabled, transparency, or blend changed — the widget's pixels
/// (and, for the flag changes, its descendants') need repainting.
pub const VISIBILITY: Channel = Channel::new(0);

/// Z delta changed — the resolved z of the widget and its descendants moved
/// to a different paint layer.
pub const Z: Channel = Channel::new(1);

/// Bounds changed during the layout pass — no propagation needed.
pub const GEOMETRY: Channel = Channel::new(2);

/// An explicit redraw request — no propagation needed.
pub const REDRAW: Channel = Channel::new(3);

/// A build pass rewrote a children list.
pub const TOPOLOGY: Channel = Channel::new(4);
