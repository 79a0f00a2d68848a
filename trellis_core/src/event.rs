// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed widget events.
//!
//! Events are a closed payload enum rather than name-keyed callbacks: every
//! payload shape the engine can deliver is a [`Event`] variant, and each
//! widget holds at most one handler slot per [`EventKind`]. Handler slots are
//! cleared at the start of every build pass, so widgets re-register from
//! their `build` callback each frame.
//!
//! Dispatching an event runs the handler immediately (the pipeline is
//! single-threaded and callbacks never overlap) and marks the target widget
//! as having dispatched an event, which forces a rebuild so the handler's
//! state changes become visible within the same frame.

use alloc::boxed::Box;
use alloc::string::String;

/// A widget event payload.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// A press gesture completed on the widget.
    Pressed,
    /// A press gesture was released or cancelled.
    Released,
    /// A two-state widget changed state.
    Toggled(bool),
    /// A continuous value changed.
    ValueChanged(f64),
    /// A text value changed.
    Text(String),
    /// The widget became the effective focus target.
    FocusGained,
    /// The widget stopped being the effective focus target.
    FocusLost,
    /// An application-defined event, discriminated by the widget.
    Custom(u32),
}

impl Event {
    /// Returns the registration key for this payload.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Pressed => EventKind::Pressed,
            Self::Released => EventKind::Released,
            Self::Toggled(_) => EventKind::Toggled,
            Self::ValueChanged(_) => EventKind::ValueChanged,
            Self::Text(_) => EventKind::Text,
            Self::FocusGained => EventKind::FocusGained,
            Self::FocusLost => EventKind::FocusLost,
            Self::Custom(tag) => EventKind::Custom(*tag),
        }
    }
}

/// The registration key for a handler slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventKind {
    /// [`Event::Pressed`].
    Pressed,
    /// [`Event::Released`].
    Released,
    /// [`Event::Toggled`].
    Toggled,
    /// [`Event::ValueChanged`].
    ValueChanged,
    /// [`Event::Text`].
    Text,
    /// [`Event::FocusGained`].
    FocusGained,
    /// [`Event::FocusLost`].
    FocusLost,
    /// [`Event::Custom`] with the same tag.
    Custom(u32),
}

/// A registered handler. Handlers receive only the payload; state mutation
/// goes through captured application state, and the forced rebuild makes it
/// visible to the next build pass.
pub type EventHandler = Box<dyn FnMut(&Event)>;

/// The handler slots of one widget. At most one handler per kind; a second
/// registration for the same kind replaces the first.
#[derive(Default)]
pub(crate) struct HandlerSet {
    slots: alloc::vec::Vec<(EventKind, EventHandler)>,
}

impl HandlerSet {
    pub(crate) fn set(&mut self, kind: EventKind, handler: EventHandler) {
        if let Some(slot) = self.slots.iter_mut().find(|(k, _)| *k == kind) {
            slot.1 = handler;
        } else {
            self.slots.push((kind, handler));
        }
    }

    pub(crate) fn invoke(&mut self, event: &Event) -> bool {
        let kind = event.kind();
        if let Some((_, handler)) = self.slots.iter_mut().find(|(k, _)| *k == kind) {
            handler(event);
            true
        } else {
            false
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

impl core::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("len", &self.slots.len())
            .finish_non_exhaustive()
    }
}
