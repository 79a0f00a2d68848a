// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-runtime contract.
//!
//! Trellis does not create windows, open input devices, or rasterize. A
//! *host* (a windowing/game loop integration crate) owns those and drives the
//! engine with three calls per tick:
//!
//! 1. Snapshot the platform state into a [`FrameEnv`] — screen size, device
//!    pixel scale, pointer and key state, locale, color mode, and a
//!    monotonic timestamp for tracing.
//! 2. Call [`App::update`](crate::app::App::update) with that environment.
//!    The returned [`UpdateReport`] carries the accumulated damage region
//!    and the cursor shape to apply to the platform cursor.
//! 3. Call [`App::draw`](crate::app::App::draw) with a [`Compositor`] and
//!    the target [`Surface`], clipped by the host to the reported damage.
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_tick(now_us: u64) {
//!     let env = FrameEnv {
//!         screen: window.logical_size(),
//!         scale: window.scale_factor(),
//!         cursor: window.cursor_position(),
//!         ..snapshot()
//!     };
//!     let report = app.update(&env, &mut Tracer::none())?;
//!     if !report.damage.is_empty() {
//!         let mut frame = swapchain.acquire(report.damage.clip(env.screen));
//!         app.draw(&mut compositor, &mut frame, &mut Tracer::none());
//!         swapchain.present(frame);
//!     }
//!     window.set_cursor(report.cursor_shape);
//! }
//! ```
//!
//! # Crate boundaries
//!
//! `trellis_core` owns the widget tree, the frame pipeline, and this
//! contract module. Host crates depend on `trellis_core` and provide the
//! platform glue; widget crates depend on `trellis_core` and implement
//! [`Widget`](crate::widget::Widget). The engine treats [`Surface`] contents
//! as opaque — widgets downcast to the host's concrete surface type to
//! paint.

use core::any::Any;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Size};

use crate::damage::Damage;

/// The per-tick environment snapshot supplied by the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameEnv {
    /// Logical screen size in pixels.
    pub screen: Size,
    /// Device pixel scale (physical pixels per logical pixel).
    pub scale: f64,
    /// Cursor position in logical screen coordinates, if the cursor is
    /// inside the screen.
    pub cursor: Option<Point>,
    /// Pointer buttons currently held.
    pub buttons: PointerButtons,
    /// Key transitions since the previous tick, in occurrence order.
    pub keys: Vec<KeyInput>,
    /// BCP 47 language tag of the active locale (empty if unknown).
    pub locale: String,
    /// The host's color scheme.
    pub color_mode: ColorMode,
    /// Monotonic timestamp in microseconds, used only for tracing.
    pub now_us: u64,
}

/// Pointer button state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PointerButtons {
    /// Primary (usually left) button held.
    pub primary: bool,
    /// Secondary (usually right) button held.
    pub secondary: bool,
    /// Middle button held.
    pub middle: bool,
}

/// A single key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyInput {
    /// Platform-independent key code, as defined by the host.
    pub code: u32,
    /// `true` for press, `false` for release.
    pub pressed: bool,
}

/// Light or dark color scheme, passed through to widgets unmodified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Light scheme.
    #[default]
    Light,
    /// Dark scheme.
    Dark,
}

/// The cursor affordance the host should apply this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CursorShape {
    /// The platform default arrow.
    #[default]
    Default,
    /// Text selection I-beam.
    Text,
    /// Pointing hand.
    Pointer,
    /// Horizontal resize.
    ResizeEw,
    /// Vertical resize.
    ResizeNs,
    /// Move/grab.
    Move,
}

/// Blend mode for compositing a widget's backing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
}

/// An opaque drawable owned by the host.
///
/// The engine only needs the logical size (for backing-surface reuse) and a
/// downcast hook; everything a widget paints goes through the host's
/// concrete type.
pub trait Surface {
    /// Logical size in pixels.
    fn size(&self) -> Size;

    /// Downcast hook for widget painters.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast hook for widget painters.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl core::fmt::Debug for dyn Surface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Surface")
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

/// Allocates backing surfaces and composites them onto a target.
///
/// The engine calls [`create_surface`](Self::create_surface) lazily, the
/// first time a widget needs composited rendering (nonzero transparency or a
/// non-default blend mode) and again whenever the requested size changes;
/// surfaces of unchanged size are reused across frames.
pub trait Compositor {
    /// Allocates a surface of the given logical size.
    fn create_surface(&mut self, size: Size) -> Box<dyn Surface>;

    /// Clears a surface to fully transparent.
    fn clear_surface(&mut self, surface: &mut dyn Surface);

    /// Draws `source` onto `target` with its top-left corner at `at`,
    /// multiplied by `alpha` (1 = opaque), using `blend`.
    fn composite(
        &mut self,
        target: &mut dyn Surface,
        source: &dyn Surface,
        at: Point,
        alpha: f32,
        blend: BlendMode,
    );
}

/// What [`App::update`](crate::app::App::update) hands back to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateReport {
    /// The accumulated damage region for this frame. Empty means the
    /// previous frame's pixels are still valid and draw may be skipped.
    pub damage: Damage,
    /// The cursor affordance of the topmost widget under the cursor.
    pub cursor_shape: CursorShape,
    /// How many build/layout passes ran this frame (0, 1, or 2).
    pub passes: u8,
}
