// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy.
//!
//! Three failure classes exist, each with a distinct mechanism:
//!
//! - **Widget callback failure** — `build` or `tick` returning
//!   [`FrameError`]. Always fatal to the current frame: [`App::update`]
//!   aborts immediately and propagates the error to the host unmodified.
//!   The previous frame's pixels stay on screen; there is no retry.
//! - **Contract violations** — misuse of the engine API by a widget
//!   implementation (adding a stale handle as a child, placing a widget
//!   that is not a direct child, querying focus during the build pass,
//!   a focus-delegation cycle). These panic: they indicate a bug, not a
//!   runtime condition.
//! - **Absent queries** — a widget not under the cursor, an unresolvable
//!   focus target. Never fatal; surfaced as `bool`/[`Option`] results.
//!
//! [`App::update`]: crate::app::App::update

use alloc::string::String;
use thiserror::Error;

use crate::trace::PhaseKind;
use crate::widget::WidgetId;

/// A fatal frame failure reported by a widget callback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameError {
    /// A widget's `build` or `tick` callback failed.
    #[error("widget {widget:?} failed during {phase:?}: {message}")]
    WidgetFailed {
        /// The widget whose callback failed.
        widget: WidgetId,
        /// The phase the callback was running in.
        phase: PhaseKind,
        /// Widget-supplied description of the failure.
        message: String,
    },
}

impl FrameError {
    /// Convenience constructor for widget implementations.
    #[must_use]
    pub fn widget(widget: WidgetId, phase: PhaseKind, message: impl Into<String>) -> Self {
        Self::WidgetFailed {
            widget,
            phase,
            message: message.into(),
        }
    }
}
