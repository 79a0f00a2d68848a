// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget identity types.

use core::fmt;

/// Sentinel value indicating "no widget" in index fields.
pub const INVALID: u32 = u32::MAX;

/// Build stamp of a widget that has never been attached by a build pass.
pub(crate) const NEVER_BUILT: u64 = u64::MAX;

/// A handle to a widget in a [`WidgetArena`](super::WidgetArena).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a widget is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId {
    /// Slot index into the arena's arrays.
    pub(crate) idx: u32,
    /// Generation counter — must match the arena's generation for this slot.
    pub(crate) generation: u32,
}

impl WidgetId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WidgetId({}@gen{})", self.idx, self.generation)
    }
}
