// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear layout solver.
//!
//! Distributes space along one axis among an ordered list of items, each a
//! widget or a nested sub-layout paired with a [`SizeSpec`]:
//!
//! 1. Fixed items take their literal extent; default items self-measure
//!    against the known cross extent; flexible items start at zero and pool
//!    their weights.
//! 2. The leftover after fixed/measured extents and gaps (floored at zero)
//!    is split between flexible items proportionally to weight, rounding
//!    each share down to a whole pixel.
//! 3. Rounding remainders are handed out one pixel at a time to flexible
//!    items in reverse order; a sub-pixel residue (possible only with a
//!    fractional container extent) goes to the last flexible item, so the
//!    flexible extents always sum to the leftover exactly.
//! 4. Items are placed at the running prefix sum of extent plus gap, offset
//!    by the padding; every item spans the full cross extent inside the
//!    padding.
//!
//! A nested sub-layout is measured and placed exactly like a leaf widget,
//! recursing with its allocated rectangle, so rows of columns (and deeper)
//! need no special casing.
//!
//! All rectangles are in the laying-out widget's local space: the top-level
//! [`apply`](LinearLayout::apply) call typically passes
//! `bounds.with_origin(Point::ZERO)`, and the recorded child rectangles are
//! parent-relative as the arena expects.

use alloc::vec::Vec;
use kurbo::{Rect, Size};

use crate::context::{ChildLayouter, Context};
use crate::geometry::{Constraints, SizeSpec};
use crate::widget::WidgetId;

/// The primary axis of a [`LinearLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Items flow left to right; the cross axis is vertical.
    Row,
    /// Items flow top to bottom; the cross axis is horizontal.
    Column,
}

/// What a [`LinearItem`] positions.
#[derive(Debug)]
pub enum LinearSlot {
    /// A direct child of the laying-out widget.
    Widget(WidgetId),
    /// A nested sub-layout occupying one slot.
    Layout(LinearLayout),
}

/// One entry of a [`LinearLayout`].
#[derive(Debug)]
pub struct LinearItem {
    /// The widget or sub-layout to position.
    pub slot: LinearSlot,
    /// The size request along the primary axis.
    pub size: SizeSpec,
}

impl LinearItem {
    /// A widget item.
    #[must_use]
    pub fn widget(id: WidgetId, size: SizeSpec) -> Self {
        Self {
            slot: LinearSlot::Widget(id),
            size,
        }
    }

    /// A nested sub-layout item.
    #[must_use]
    pub fn nested(layout: LinearLayout, size: SizeSpec) -> Self {
        Self {
            slot: LinearSlot::Layout(layout),
            size,
        }
    }

    fn measure_size(&self, cx: &mut Context<'_>, constraints: Constraints) -> Size {
        match &self.slot {
            LinearSlot::Widget(id) => cx.measure_widget(*id, constraints),
            LinearSlot::Layout(layout) => layout.measure(cx, constraints),
        }
    }
}

/// A one-axis layout of widgets and nested sub-layouts.
#[derive(Debug)]
pub struct LinearLayout {
    /// The primary axis.
    pub direction: Direction,
    /// Pixels between consecutive items.
    pub gap: f64,
    /// Pixels inset on every side.
    pub padding: f64,
    /// The items, in placement order.
    pub items: Vec<LinearItem>,
}

impl LinearLayout {
    /// Creates an empty layout with no gap or padding.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            gap: 0.0,
            padding: 0.0,
            items: Vec::new(),
        }
    }

    /// Reports the size this layout wants under the given constraints.
    ///
    /// Fixed constraints win on their axis; free axes are the measured
    /// content extent plus gaps and padding (primary) or the maximum item
    /// extent plus padding (cross).
    pub fn measure(&self, cx: &mut Context<'_>, constraints: Constraints) -> Size {
        if let (Some(w), Some(h)) = (constraints.width, constraints.height) {
            return Size::new(w, h);
        }

        let pad2 = self.padding * 2.0;
        let cross_known = self
            .cross_of_constraints(constraints)
            .map(|c| (c - pad2).max(0.0));

        let mut primary_sum = 0.0;
        let mut cross_max: f64 = 0.0;
        for item in &self.items {
            let item_constraints = self.item_constraints(item.size, cross_known);
            let measured = item.measure_size(cx, item_constraints);
            primary_sum += match item.size {
                SizeSpec::Fixed(v) => v.max(0.0),
                SizeSpec::Default => self.primary_of(measured),
                SizeSpec::Flexible(_) => 0.0,
            };
            cross_max = cross_max.max(self.cross_of(measured));
        }
        if self.items.len() > 1 {
            primary_sum += self.gap * (self.items.len() - 1) as f64;
        }

        let primary = primary_sum + pad2;
        let cross = cross_max + pad2;
        let measured = match self.direction {
            Direction::Row => Size::new(primary, cross),
            Direction::Column => Size::new(cross, primary),
        };
        Size::new(
            constraints.width.unwrap_or(measured.width),
            constraints.height.unwrap_or(measured.height),
        )
    }

    /// Resolves item extents for `bounds` and records every widget's
    /// rectangle through `layouter`. `bounds` is in the laying-out widget's
    /// local space.
    pub fn apply(&self, cx: &mut Context<'_>, bounds: Rect, layouter: &mut ChildLayouter) {
        let pad = self.padding;
        let primary_avail = (self.primary_of(bounds.size()) - pad * 2.0).max(0.0);
        let cross_avail = (self.cross_of(bounds.size()) - pad * 2.0).max(0.0);
        let extents = self.resolve(cx, primary_avail, cross_avail);

        let mut offset = 0.0;
        for (item, extent) in self.items.iter().zip(&extents) {
            let rect = match self.direction {
                Direction::Row => Rect::new(
                    bounds.x0 + pad + offset,
                    bounds.y0 + pad,
                    bounds.x0 + pad + offset + extent,
                    bounds.y0 + pad + cross_avail,
                ),
                Direction::Column => Rect::new(
                    bounds.x0 + pad,
                    bounds.y0 + pad + offset,
                    bounds.x0 + pad + cross_avail,
                    bounds.y0 + pad + offset + extent,
                ),
            };
            match &item.slot {
                LinearSlot::Widget(id) => layouter.place(*id, rect),
                LinearSlot::Layout(layout) => layout.apply(cx, rect, layouter),
            }
            offset += extent + self.gap;
        }
    }

    /// Computes per-item extents along the primary axis.
    fn resolve(&self, cx: &mut Context<'_>, primary_avail: f64, cross_avail: f64) -> Vec<f64> {
        let n = self.items.len();
        let mut extents = alloc::vec![0.0; n];
        let mut weight_total: u64 = 0;
        let mut occupied = 0.0;

        for (i, item) in self.items.iter().enumerate() {
            match item.size {
                SizeSpec::Fixed(v) => {
                    extents[i] = v.max(0.0);
                    occupied += extents[i];
                }
                SizeSpec::Default => {
                    let c = self.item_constraints(item.size, Some(cross_avail));
                    extents[i] = self.primary_of(item.measure_size(cx, c)).max(0.0);
                    occupied += extents[i];
                }
                SizeSpec::Flexible(w) => weight_total += u64::from(w),
            }
        }
        if n > 1 {
            occupied += self.gap * (n - 1) as f64;
        }

        let remaining = (primary_avail - occupied).max(0.0);
        if weight_total == 0 {
            return extents;
        }

        let flex_rev: Vec<usize> = (0..n)
            .rev()
            .filter(|&i| matches!(self.items[i].size, SizeSpec::Flexible(w) if w > 0))
            .collect();

        let mut distributed = 0.0;
        for &i in flex_rev.iter().rev() {
            if let SizeSpec::Flexible(w) = self.items[i].size {
                extents[i] = floor_px(remaining * u64::from(w) as f64 / weight_total as f64);
                distributed += extents[i];
            }
        }

        // Rounding remainders: one whole pixel at a time, last item first.
        let mut leftover = remaining - distributed;
        let mut k = 0;
        while leftover >= 1.0 && !flex_rev.is_empty() {
            extents[flex_rev[k % flex_rev.len()]] += 1.0;
            leftover -= 1.0;
            k += 1;
        }
        if leftover > 0.0 && !flex_rev.is_empty() {
            extents[flex_rev[0]] += leftover;
        }

        extents
    }

    fn item_constraints(&self, size: SizeSpec, cross: Option<f64>) -> Constraints {
        let primary = match size {
            SizeSpec::Fixed(v) => Some(v.max(0.0)),
            _ => None,
        };
        match self.direction {
            Direction::Row => Constraints {
                width: primary,
                height: cross,
            },
            Direction::Column => Constraints {
                width: cross,
                height: primary,
            },
        }
    }

    fn primary_of(&self, size: Size) -> f64 {
        match self.direction {
            Direction::Row => size.width,
            Direction::Column => size.height,
        }
    }

    fn cross_of(&self, size: Size) -> f64 {
        match self.direction {
            Direction::Row => size.height,
            Direction::Column => size.width,
        }
    }

    fn cross_of_constraints(&self, constraints: Constraints) -> Option<f64> {
        match self.direction {
            Direction::Row => constraints.height,
            Direction::Column => constraints.width,
        }
    }
}

/// Floor for non-negative pixel values, exact for anything representable.
#[inline]
fn floor_px(x: f64) -> f64 {
    debug_assert!(x >= 0.0, "pixel extents are non-negative");
    (x as u64) as f64
}
