//! Cairo backend for raster (image) and vector (SVG, PDF) surfaces.

use super::{Backend, BackendError, BackendKind};
use crate::draw::path::{Path, PathElement};
use crate::draw::stack::StateHooks;
use crate::draw::state::{Antialias, GraphicsState, LineCap, LineJoin, Pen, StateAttributes};
use crate::fonts::Font;
use crate::util::{Point, Size};
use log::{debug, trace, warn};
use std::io::Write;

enum Target {
    Image(cairo::ImageSurface),
    Svg(cairo::SvgSurface),
    Pdf(cairo::PdfSurface),
}

/// Drives a `cairo::Context` over an owned surface.
///
/// Logical saves map one-to-one onto `cairo_save`/`cairo_restore`. Paint calls
/// additionally bracket themselves in a save/restore pair so attributes applied
/// for one call never leak into the next.
pub struct CairoBackend {
    ctx: cairo::Context,
    target: Target,
    size: Size,
    finished: bool,
}

impl CairoBackend {
    /// Creates an ARGB32 image surface of `width` x `height` pixels.
    pub fn image(width: i32, height: i32) -> Result<Self, BackendError> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;
        let ctx = cairo::Context::new(&surface)?;
        Ok(Self::with_target(
            ctx,
            Target::Image(surface),
            Size::new(width as f64, height as f64),
        ))
    }

    /// Creates an SVG document at `path`, sized in points.
    pub fn svg(path: impl AsRef<std::path::Path>, width: f64, height: f64) -> Result<Self, BackendError> {
        let surface = cairo::SvgSurface::new(width, height, Some(path.as_ref()))?;
        let ctx = cairo::Context::new(&surface)?;
        Ok(Self::with_target(ctx, Target::Svg(surface), Size::new(width, height)))
    }

    /// Creates a single-page PDF at `path`, sized in points.
    pub fn pdf(path: impl AsRef<std::path::Path>, width: f64, height: f64) -> Result<Self, BackendError> {
        let surface = cairo::PdfSurface::new(width, height, path.as_ref())?;
        let ctx = cairo::Context::new(&surface)?;
        Ok(Self::with_target(ctx, Target::Pdf(surface), Size::new(width, height)))
    }

    fn with_target(ctx: cairo::Context, target: Target, size: Size) -> Self {
        Self {
            ctx,
            target,
            size,
            finished: false,
        }
    }

    /// The underlying context, for callers that need a raw Cairo call.
    pub fn context(&self) -> &cairo::Context {
        &self.ctx
    }

    /// Encodes the image surface as PNG.
    pub fn write_png<W: Write>(&self, out: &mut W) -> Result<(), BackendError> {
        match &self.target {
            Target::Image(surface) => {
                surface.flush();
                surface
                    .write_to_png(out)
                    .map_err(|err| BackendError::Png(err.to_string()))
            }
            _ => Err(BackendError::Unsupported {
                kind: self.kind(),
                operation: "PNG export",
            }),
        }
    }

    /// Releases the context and returns the image surface, if this is one.
    pub fn into_image_surface(self) -> Option<cairo::ImageSurface> {
        let Self { ctx, target, .. } = self;
        drop(ctx);
        match target {
            Target::Image(surface) => {
                surface.flush();
                Some(surface)
            }
            _ => None,
        }
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.finished {
            Err(BackendError::Finished)
        } else {
            Ok(())
        }
    }

    /// Runs `paint` inside a save/restore bracket with `attrs` applied.
    ///
    /// A non-invertible matrix would leave the context in a sticky
    /// `INVALID_MATRIX` error, so degenerate states skip the paint instead.
    fn paint_with<F>(&self, attrs: &StateAttributes, paint: F) -> Result<(), BackendError>
    where
        F: FnOnce(&cairo::Context) -> Result<(), cairo::Error>,
    {
        self.ensure_open()?;
        if attrs.is_degenerate() {
            trace!("Skipping paint under a non-invertible transform");
            return Ok(());
        }
        self.ctx.save()?;
        let result = self.apply(attrs).and_then(|()| paint(&self.ctx));
        self.ctx.restore()?;
        result.map_err(BackendError::from)
    }

    fn apply(&self, attrs: &StateAttributes) -> Result<(), cairo::Error> {
        for clip in &attrs.clip {
            let r = clip.rect.normalized();
            self.ctx.set_matrix(clip.transform.into());
            self.ctx.rectangle(r.x, r.y, r.width, r.height);
            self.ctx.clip();
        }
        self.ctx.set_matrix(attrs.transform.into());
        self.ctx.set_antialias(match attrs.antialias {
            Antialias::Default => cairo::Antialias::Default,
            Antialias::None => cairo::Antialias::None,
            Antialias::Gray => cairo::Antialias::Gray,
            Antialias::Subpixel => cairo::Antialias::Subpixel,
        });
        self.ctx.status()
    }

    fn apply_pen(&self, pen: &Pen) {
        let c = pen.color;
        self.ctx.set_source_rgba(c.r, c.g, c.b, c.a);
        self.ctx.set_line_width(pen.width);
        self.ctx.set_line_cap(match pen.line_cap {
            LineCap::Butt => cairo::LineCap::Butt,
            LineCap::Round => cairo::LineCap::Round,
            LineCap::Square => cairo::LineCap::Square,
        });
        self.ctx.set_line_join(match pen.line_join {
            LineJoin::Miter => cairo::LineJoin::Miter,
            LineJoin::Round => cairo::LineJoin::Round,
            LineJoin::Bevel => cairo::LineJoin::Bevel,
        });
        self.ctx.set_miter_limit(pen.miter_limit);
        self.ctx.set_dash(&pen.dash, pen.dash_offset);
    }

    fn trace(&self, path: &Path) {
        self.ctx.new_path();
        for element in path.elements() {
            match *element {
                PathElement::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathElement::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathElement::CurveTo(c1, c2, end) => {
                    self.ctx.curve_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y)
                }
                PathElement::Close => self.ctx.close_path(),
            }
        }
    }
}

impl StateHooks for CairoBackend {
    fn pushed(&mut self, state: &GraphicsState) {
        if let Err(err) = self.ctx.save() {
            warn!("cairo save for level {} failed: {}", state.level(), err);
        }
    }

    fn popped(&mut self, state: &GraphicsState) {
        if let Err(err) = self.ctx.restore() {
            warn!("cairo restore for level {} failed: {}", state.level(), err);
        }
    }
}

impl Backend for CairoBackend {
    fn kind(&self) -> BackendKind {
        match self.target {
            Target::Image(_) => BackendKind::Image,
            Target::Svg(_) => BackendKind::Svg,
            Target::Pdf(_) => BackendKind::Pdf,
        }
    }

    fn size(&self) -> Size {
        self.size
    }

    fn stroke_path(&mut self, path: &Path, attrs: &StateAttributes) -> Result<(), BackendError> {
        self.paint_with(attrs, |ctx| {
            self.apply_pen(&attrs.pen);
            self.trace(path);
            ctx.stroke()
        })
    }

    fn fill_path(&mut self, path: &Path, attrs: &StateAttributes) -> Result<(), BackendError> {
        self.paint_with(attrs, |ctx| {
            let c = attrs.brush.color();
            ctx.set_source_rgba(c.r, c.g, c.b, c.a);
            self.trace(path);
            ctx.fill()
        })
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &Font,
        attrs: &StateAttributes,
    ) -> Result<(), BackendError> {
        self.paint_with(attrs, |ctx| {
            let layout = pangocairo::functions::create_layout(ctx);
            // One Pango point per user-space unit.
            pangocairo::functions::context_set_resolution(&layout.context(), 72.0);
            layout.context_changed();

            let description = pango::FontDescription::from_string(&font.to_pango_string());
            layout.set_font_description(Some(&description));
            layout.set_text(text);

            let baseline = layout.baseline() as f64 / pango::SCALE as f64;
            let c = attrs.brush.color();
            ctx.set_source_rgba(c.r, c.g, c.b, c.a);
            ctx.move_to(origin.x, origin.y - baseline);
            pangocairo::functions::show_layout(ctx, &layout);
            ctx.status()
        })
    }

    fn finish(&mut self) -> Result<(), BackendError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        match &self.target {
            Target::Image(surface) => surface.flush(),
            Target::Svg(surface) => surface.finish(),
            Target::Pdf(surface) => surface.finish(),
        }
        debug!("Finished {:?} surface", self.kind());
        self.ctx.status().map_err(BackendError::from)
    }
}
