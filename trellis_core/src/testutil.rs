// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closure-driven test widgets and frame-loop helpers shared by the unit
//! tests.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use kurbo::{Point, Rect, Size};

use crate::app::{App, AppConfig};
use crate::context::{ChildAdder, ChildLayouter, Context};
use crate::error::FrameError;
use crate::geometry::Constraints;
use crate::host::{BlendMode, Compositor, FrameEnv, Surface, UpdateReport};
use crate::input::InputResult;
use crate::trace::Tracer;
use crate::widget::Widget;

type BuildHook = Box<dyn FnMut(&mut Context<'_>, &mut ChildAdder)>;
type LayoutHook = Box<dyn FnMut(&mut Context<'_>, Rect, &mut ChildLayouter)>;
type InputHook = Box<dyn FnMut(&mut Context<'_>, Rect) -> InputResult>;
type TickHook = Box<dyn FnMut(&mut Context<'_>, Rect) -> Result<(), FrameError>>;
type DrawHook = Box<dyn FnMut(&mut Context<'_>, Rect, &mut dyn Surface)>;
type MeasureHook = Box<dyn FnMut(&mut Context<'_>, Constraints) -> Size>;

/// A widget whose capabilities are supplied as closures; anything not
/// hooked keeps the trait's no-op default.
#[derive(Default)]
pub(crate) struct HookWidget {
    pub build: Option<BuildHook>,
    pub layout: Option<LayoutHook>,
    pub pointing: Option<InputHook>,
    pub button: Option<InputHook>,
    pub tick: Option<TickHook>,
    pub draw: Option<DrawHook>,
    pub measure: Option<MeasureHook>,
    pub cursor: Option<crate::host::CursorShape>,
}

impl HookWidget {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_build(
        mut self,
        f: impl FnMut(&mut Context<'_>, &mut ChildAdder) + 'static,
    ) -> Self {
        self.build = Some(Box::new(f));
        self
    }

    pub(crate) fn on_layout(
        mut self,
        f: impl FnMut(&mut Context<'_>, Rect, &mut ChildLayouter) + 'static,
    ) -> Self {
        self.layout = Some(Box::new(f));
        self
    }

    pub(crate) fn on_pointing(
        mut self,
        f: impl FnMut(&mut Context<'_>, Rect) -> InputResult + 'static,
    ) -> Self {
        self.pointing = Some(Box::new(f));
        self
    }

    pub(crate) fn on_button(
        mut self,
        f: impl FnMut(&mut Context<'_>, Rect) -> InputResult + 'static,
    ) -> Self {
        self.button = Some(Box::new(f));
        self
    }

    pub(crate) fn on_tick(
        mut self,
        f: impl FnMut(&mut Context<'_>, Rect) -> Result<(), FrameError> + 'static,
    ) -> Self {
        self.tick = Some(Box::new(f));
        self
    }

    pub(crate) fn on_draw(
        mut self,
        f: impl FnMut(&mut Context<'_>, Rect, &mut dyn Surface) + 'static,
    ) -> Self {
        self.draw = Some(Box::new(f));
        self
    }

    pub(crate) fn on_measure(
        mut self,
        f: impl FnMut(&mut Context<'_>, Constraints) -> Size + 'static,
    ) -> Self {
        self.measure = Some(Box::new(f));
        self
    }

    pub(crate) fn with_cursor_shape(mut self, shape: crate::host::CursorShape) -> Self {
        self.cursor = Some(shape);
        self
    }
}

impl Widget for HookWidget {
    fn build(&mut self, cx: &mut Context<'_>, children: &mut ChildAdder) -> Result<(), FrameError> {
        if let Some(f) = &mut self.build {
            f(cx, children);
        }
        Ok(())
    }

    fn layout(&mut self, cx: &mut Context<'_>, bounds: Rect, children: &mut ChildLayouter) {
        if let Some(f) = &mut self.layout {
            f(cx, bounds, children);
        }
    }

    fn handle_pointing_input(&mut self, cx: &mut Context<'_>, bounds: Rect) -> InputResult {
        match &mut self.pointing {
            Some(f) => f(cx, bounds),
            None => InputResult::None,
        }
    }

    fn handle_button_input(&mut self, cx: &mut Context<'_>, bounds: Rect) -> InputResult {
        match &mut self.button {
            Some(f) => f(cx, bounds),
            None => InputResult::None,
        }
    }

    fn tick(&mut self, cx: &mut Context<'_>, bounds: Rect) -> Result<(), FrameError> {
        match &mut self.tick {
            Some(f) => f(cx, bounds),
            None => Ok(()),
        }
    }

    fn draw(&mut self, cx: &mut Context<'_>, bounds: Rect, surface: &mut dyn Surface) {
        if let Some(f) = &mut self.draw {
            f(cx, bounds, surface);
        }
    }

    fn measure(&mut self, cx: &mut Context<'_>, constraints: Constraints) -> Size {
        match &mut self.measure {
            Some(f) => f(cx, constraints),
            None => constraints.fallback_size(),
        }
    }

    fn cursor_shape(
        &self,
        _cx: &mut Context<'_>,
        _bounds: Rect,
    ) -> Option<crate::host::CursorShape> {
        self.cursor
    }
}

/// Shared, clonable event log for ordering assertions.
pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn note(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

pub(crate) fn taken(log: &Log) -> Vec<String> {
    core::mem::take(&mut *log.borrow_mut())
}

/// A 100x100 screen at scale 1 with no cursor.
pub(crate) fn env() -> FrameEnv {
    FrameEnv {
        screen: Size::new(100.0, 100.0),
        scale: 1.0,
        ..FrameEnv::default()
    }
}

pub(crate) fn env_with_cursor(x: f64, y: f64) -> FrameEnv {
    FrameEnv {
        cursor: Some(Point::new(x, y)),
        ..env()
    }
}

/// Runs one frame the way a host would — update, then draw into test
/// doubles (which clears the damage) — panicking on frame errors.
pub(crate) fn pump(app: &mut App, env: &FrameEnv) -> UpdateReport {
    let report = app
        .update(env, &mut Tracer::none())
        .expect("frame must not fail");
    let mut compositor = TestCompositor::default();
    let mut target = TestSurface::new(env.screen);
    app.draw(&mut compositor, &mut target, &mut Tracer::none());
    report
}

/// Pumps empty frames until the pipeline settles (no rebuild pending).
pub(crate) fn settle(app: &mut App, env: &FrameEnv) {
    for _ in 0..4 {
        if pump(app, env).passes == 0 {
            return;
        }
    }
    panic!("pipeline failed to settle in four frames");
}

/// An app with a hook root, pumped zero times.
pub(crate) fn app_with_root(root: HookWidget) -> App {
    App::new(AppConfig::desktop(), Box::new(root))
}

/// Replaces the root's behavior object. Tests use this when the root's
/// hooks need handles that only exist once the app (and its arena) does.
pub(crate) fn set_root_widget(app: &mut App, widget: HookWidget) {
    let root = app.root();
    let _ = app.arena_mut().take_widget(root.index());
    app.arena_mut().put_widget(root.index(), Box::new(widget));
}

/// Surface test double: remembers its size and draw notes pushed by test
/// widgets through [`Surface::as_any_mut`].
#[derive(Debug, Default)]
pub(crate) struct TestSurface {
    pub size: Size,
    pub notes: Vec<String>,
}

impl TestSurface {
    pub(crate) fn new(size: Size) -> Self {
        Self {
            size,
            notes: Vec::new(),
        }
    }
}

impl Surface for TestSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn core::any::Any {
        self
    }
}

/// Compositor test double: allocates [`TestSurface`]s and records every
/// composite call.
#[derive(Debug, Default)]
pub(crate) struct TestCompositor {
    pub created: u32,
    pub composites: Vec<(Point, f32, BlendMode)>,
}

impl Compositor for TestCompositor {
    fn create_surface(&mut self, size: Size) -> Box<dyn Surface> {
        self.created += 1;
        Box::new(TestSurface::new(size))
    }

    fn clear_surface(&mut self, surface: &mut dyn Surface) {
        if let Some(s) = surface.as_any_mut().downcast_mut::<TestSurface>() {
            s.notes.clear();
        }
    }

    fn composite(
        &mut self,
        _target: &mut dyn Surface,
        _source: &dyn Surface,
        at: Point,
        alpha: f32,
        blend: BlendMode,
    ) {
        self.composites.push((at, alpha, blend));
    }
}
