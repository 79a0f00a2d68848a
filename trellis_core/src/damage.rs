// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage accumulation.
//!
//! Trellis tracks a single accumulating damage region per frame: the union
//! of every dirty rectangle, not a region list. This over-approximates (a
//! change in two opposite corners repaints the whole span between them) but
//! keeps the draw pass a single restricted traversal. [`Damage::Full`]
//! short-circuits the arithmetic for whole-screen invalidation (scale or
//! screen-size changes).
//!
//! Rectangles come from three producers, all drained once per pass by the
//! frame driver:
//!
//! - explicit redraw requests (the [`REDRAW`](crate::dirty::REDRAW) channel),
//! - property changes (the `VISIBILITY`/`Z`/`GEOMETRY` channels),
//! - the structural snapshot diff, which compares every widget's previous
//!   children (identity plus each child's stacking record) against the
//!   current ones.

use kurbo::{Rect, Size};

/// The accumulated repaint region for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Damage {
    /// Nothing changed; the previous frame can be reused.
    #[default]
    None,
    /// The bounding rectangle of everything that changed, in screen
    /// coordinates.
    Rect(Rect),
    /// The entire screen needs repainting.
    Full,
}

impl Damage {
    /// Returns `true` if no region needs repainting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Unions a screen-space rectangle into the region. Empty rectangles
    /// are ignored.
    pub fn add_rect(&mut self, rect: Rect) {
        if rect_is_empty(rect) {
            return;
        }
        match self {
            Self::Full => {}
            Self::None => *self = Self::Rect(rect),
            Self::Rect(acc) => *acc = rect_union(*acc, rect),
        }
    }

    /// Escalates to whole-screen damage.
    pub fn set_full(&mut self) {
        *self = Self::Full;
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match other {
            Self::None => {}
            Self::Rect(r) => self.add_rect(*r),
            Self::Full => self.set_full(),
        }
    }

    /// Resolves the region to a concrete clip rectangle against the screen,
    /// or `None` if nothing needs repainting.
    #[must_use]
    pub fn clip(&self, screen: Size) -> Option<Rect> {
        let screen_rect = Rect::new(0.0, 0.0, screen.width, screen.height);
        match self {
            Self::None => None,
            Self::Full => Some(screen_rect),
            Self::Rect(r) => {
                let clipped = rect_intersect(*r, screen_rect);
                (!rect_is_empty(clipped)).then_some(clipped)
            }
        }
    }

    /// The repainted area in square pixels, with `Full` resolved against the
    /// screen. Used for tracing and statistics.
    #[must_use]
    pub fn area(&self, screen: Size) -> f64 {
        match self.clip(screen) {
            None => 0.0,
            Some(r) => r.area(),
        }
    }
}

/// Returns whether `r` encloses no pixels (zero or inverted extent).
#[inline]
pub(crate) fn rect_is_empty(r: Rect) -> bool {
    r.x1 <= r.x0 || r.y1 <= r.y0
}

/// Intersection clamped to a well-formed rectangle ([`Rect::ZERO`] when the
/// inputs are disjoint).
#[inline]
pub(crate) fn rect_intersect(a: Rect, b: Rect) -> Rect {
    let r = Rect::new(
        a.x0.max(b.x0),
        a.y0.max(b.y0),
        a.x1.min(b.x1),
        a.y1.min(b.y1),
    );
    if rect_is_empty(r) { Rect::ZERO } else { r }
}

/// Union that treats empty rectangles as identity.
#[inline]
pub(crate) fn rect_union(a: Rect, b: Rect) -> Rect {
    if rect_is_empty(a) {
        return b;
    }
    if rect_is_empty(b) {
        return a;
    }
    Rect::new(
        a.x0.min(b.x0),
        a.y0.min(b.y0),
        a.x1.max(b.x1),
        a.y1.max(b.y1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rect_unions_into_a_bounding_rect() {
        let mut d = Damage::None;
        d.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        d.add_rect(Rect::new(90.0, 90.0, 100.0, 100.0));
        assert_eq!(d, Damage::Rect(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn empty_rects_are_ignored() {
        let mut d = Damage::None;
        d.add_rect(Rect::new(5.0, 5.0, 5.0, 20.0));
        assert!(d.is_empty());
    }

    #[test]
    fn full_swallows_everything() {
        let mut d = Damage::Full;
        d.add_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(d, Damage::Full);

        let mut d = Damage::Rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        d.merge(&Damage::Full);
        assert_eq!(d, Damage::Full);
    }

    #[test]
    fn clip_restricts_to_the_screen() {
        let screen = Size::new(100.0, 100.0);
        let d = Damage::Rect(Rect::new(50.0, 50.0, 300.0, 300.0));
        assert_eq!(d.clip(screen), Some(Rect::new(50.0, 50.0, 100.0, 100.0)));

        assert_eq!(Damage::Full.clip(screen), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(Damage::None.clip(screen), None);
    }

    #[test]
    fn offscreen_rect_clips_to_nothing() {
        let screen = Size::new(100.0, 100.0);
        let d = Damage::Rect(Rect::new(200.0, 200.0, 300.0, 300.0));
        assert_eq!(d.clip(screen), None);
    }

    #[test]
    fn intersect_of_disjoint_rects_is_zero() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(rect_intersect(a, b), Rect::ZERO);
    }
}
