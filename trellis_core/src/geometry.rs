// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Size-request and constraint algebra used by the layout solver.

use kurbo::Size;

/// An optional fixed width and/or fixed height, mutually independent.
///
/// Passed to [`Widget::measure`](crate::widget::Widget::measure): an axis
/// with a fixed value is decided by the caller and the widget must only
/// self-measure the free axes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Constraints {
    /// Fixed width in pixels, if the caller has decided it.
    pub width: Option<f64>,
    /// Fixed height in pixels, if the caller has decided it.
    pub height: Option<f64>,
}

impl Constraints {
    /// No constraint on either axis.
    pub const NONE: Self = Self {
        width: None,
        height: None,
    };

    /// Constrains the width only.
    #[must_use]
    pub const fn fixed_width(width: f64) -> Self {
        Self {
            width: Some(width),
            height: None,
        }
    }

    /// Constrains the height only.
    #[must_use]
    pub const fn fixed_height(height: f64) -> Self {
        Self {
            height: Some(height),
            width: None,
        }
    }

    /// Constrains both axes.
    #[must_use]
    pub const fn tight(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// The size a measure defaulting to the constraints alone would report
    /// (zero on unconstrained axes).
    #[must_use]
    pub fn fallback_size(self) -> Size {
        Size::new(self.width.unwrap_or(0.0), self.height.unwrap_or(0.0))
    }
}

/// A size request for one item along the primary axis of a linear layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SizeSpec {
    /// Ask the item to self-measure against the known cross-axis extent.
    #[default]
    Default,
    /// A literal pixel extent.
    Fixed(f64),
    /// A share of the leftover space, weighted against the other flexible
    /// items. A weight of zero contributes nothing and receives nothing.
    Flexible(u32),
}

impl SizeSpec {
    /// Returns the weight if this request is flexible.
    #[must_use]
    pub const fn weight(self) -> Option<u32> {
        match self {
            Self::Flexible(w) => Some(w),
            _ => None,
        }
    }
}
