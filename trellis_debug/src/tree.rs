// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget tree dumps.
//!
//! [`dump`] writes one indented line per widget of the current tree —
//! handle, resolved z, bounds, visible bounds, and set flags — which is
//! usually the fastest way to see why a widget is not where (or not as
//! visible as) expected.

use std::io::{self, Write};

use trellis_core::app::App;
use trellis_core::widget::WidgetId;

/// Writes an indented snapshot of the current tree to `writer`.
///
/// Takes `&mut App` because the derived per-widget values (z, visible
/// bounds) are memoized on first query.
pub fn dump(app: &mut App, writer: &mut dyn Write) -> io::Result<()> {
    for id in app.tree_order() {
        let depth = depth_of(app, id);
        let z = app.arena_mut().z(id);
        let bounds = app.arena().bounds(id);
        let visible_bounds = app.arena_mut().visible_bounds(id);
        let flags = flag_string(app, id);
        writeln!(
            writer,
            "{:indent$}{id:?} z={z} bounds=({:.0},{:.0} {:.0}x{:.0}) visible=({:.0},{:.0} {:.0}x{:.0}){flags}",
            "",
            bounds.x0,
            bounds.y0,
            bounds.width(),
            bounds.height(),
            visible_bounds.x0,
            visible_bounds.y0,
            visible_bounds.width(),
            visible_bounds.height(),
            indent = depth * 2,
        )?;
    }
    Ok(())
}

fn depth_of(app: &App, id: WidgetId) -> usize {
    let mut depth = 0;
    let mut cur = id;
    while let Some(parent) = app.arena().parent(cur) {
        depth += 1;
        cur = parent;
    }
    depth
}

fn flag_string(app: &App, id: WidgetId) -> String {
    let flags = app.arena().flags(id);
    let mut set = Vec::new();
    if flags.hidden {
        set.push("hidden");
    }
    if flags.disabled {
        set.push("disabled");
    }
    if flags.pass_through {
        set.push("pass-through");
    }
    if flags.container {
        set.push("container");
    }
    if flags.float {
        set.push("float");
    }
    if set.is_empty() {
        String::new()
    } else {
        format!(" [{}]", set.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::app::AppConfig;
    use trellis_core::context::{ChildAdder, Context};
    use trellis_core::error::FrameError;
    use trellis_core::host::FrameEnv;
    use trellis_core::trace::Tracer;
    use trellis_core::widget::Widget;

    struct Pair {
        child: Option<WidgetId>,
    }

    impl Widget for Pair {
        fn build(
            &mut self,
            cx: &mut Context<'_>,
            children: &mut ChildAdder,
        ) -> Result<(), FrameError> {
            let child = *self.child.get_or_insert_with(|| cx.insert(Box::new(Leaf)));
            children.add(child);
            cx.set_float(child, true);
            Ok(())
        }
    }

    struct Leaf;
    impl Widget for Leaf {}

    #[test]
    fn dump_indents_children_and_prints_flags() {
        let mut app = App::new(AppConfig::desktop(), Box::new(Pair { child: None }));
        let env = FrameEnv {
            screen: kurbo::Size::new(100.0, 100.0),
            scale: 1.0,
            ..FrameEnv::default()
        };
        app.update(&env, &mut Tracer::none()).unwrap();

        let mut out: Vec<u8> = Vec::new();
        dump(&mut app, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("WidgetId(0@gen0)"));
        assert!(lines[1].starts_with("  "), "children are indented");
        assert!(lines[1].ends_with("[float]"));
    }
}
