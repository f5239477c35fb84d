//! Demonstration scene painted by the `drawstack` binary.
//!
//! Exercises nested saves, a clip captured under a transform, a container
//! mapping, and a restore that skips over an inner save point.

use crate::draw::{
    Backend, Brush, Color, DrawingSurface, Pen, SurfaceError, color::*,
};
use crate::fonts::Font;
use crate::util::{Point, Rect};
use log::debug;

/// What painting the scene did to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneReport {
    /// States discarded by the skip-level restore
    pub skipped_discarded: usize,
    /// Whether a text run was drawn
    pub drew_text: bool,
}

/// Paints the sample scene onto `surface` and finishes it.
pub fn paint_sample<B: Backend>(
    surface: &mut DrawingSurface<B>,
    background: Color,
    font: Option<Font>,
) -> Result<SceneReport, SurfaceError> {
    let size = surface.backend().size();
    let page = Rect::new(0.0, 0.0, size.width, size.height);
    let unit = size.width.min(size.height) / 8.0;

    surface.set_brush(Brush::Solid(background));
    surface.fill_rectangle(page)?;

    // Framed panel in the upper-left quadrant.
    let panel = surface.save();
    surface.translate_transform(unit, unit);
    surface.set_pen(Pen::new(BLUE, unit / 8.0));
    surface.draw_rectangle(Rect::new(0.0, 0.0, unit * 3.0, unit * 2.0))?;

    // Clip to the panel, rotate, and fill a shape that would overflow it.
    let rotated = surface.save();
    surface.intersect_clip(Rect::new(0.0, 0.0, unit * 3.0, unit * 2.0));
    surface.rotate_transform(15.0);
    surface.set_brush(Brush::Solid(ORANGE.with_alpha(0.8)));
    surface.fill_ellipse(Rect::new(unit, 0.0, unit * 3.0, unit * 2.0))?;
    surface.set_pen(Pen::new(RED, unit / 10.0).with_dash(vec![unit / 4.0, unit / 8.0], 0.0));
    surface.draw_lines(&[
        Point::new(0.0, 0.0),
        Point::new(unit * 2.0, unit),
        Point::new(unit * 4.0, 0.0),
    ])?;

    // Restoring the outer panel also discards the rotated save.
    let skipped_discarded = surface.restore(&panel)?;
    debug!(
        "Scene restore discarded {} state(s); rotated save still valid: {}",
        skipped_discarded,
        rotated.is_valid()
    );

    // Lower-right: a 10x10 design space mapped into a square container.
    let container = surface.begin_container(
        Rect::new(size.width - unit * 3.0, size.height - unit * 3.0, unit * 2.0, unit * 2.0),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    )?;
    surface.set_brush(Brush::Solid(GREEN));
    surface.fill_rectangle(Rect::new(0.0, 0.0, 10.0, 10.0))?;
    surface.set_pen(Pen::new(BLACK, 0.5));
    surface.draw_line(Point::new(0.0, 0.0), Point::new(10.0, 10.0))?;
    surface.draw_line(Point::new(0.0, 10.0), Point::new(10.0, 0.0))?;
    surface.end_container(&container)?;

    let drew_text = match font {
        Some(font) => {
            let label = surface.save();
            let baseline = size.height - unit;
            surface.set_font(Some(font));
            surface.set_brush(Brush::Solid(BLACK));
            surface.draw_string("drawstack", Point::new(unit, baseline))?;
            surface.restore(&label)?;
            true
        }
        None => false,
    };

    surface.finish()?;
    Ok(SceneReport {
        skipped_discarded,
        drew_text,
    })
}
