//! PDF page-content backend.
//!
//! Logical saves become `q`/`Q` pairs. Attributes are realized lazily: a
//! mirror stack records what the content stream already has in effect at
//! each nesting level (transform, colors, line style, clip count), and paint
//! calls only emit the operators whose value differs. Popping a level with
//! `Q` reverts the PDF graphics state, so the mirror pops with it.

use super::{Backend, BackendError, BackendKind};
use crate::draw::color::Color;
use crate::draw::matrix::Matrix;
use crate::draw::path::Path;
use crate::draw::stack::StateHooks;
use crate::draw::state::{GraphicsState, LineCap, LineJoin, Pen, StateAttributes};
use crate::fonts::Font;
use crate::pdf::{ContentStream, FontResource, PdfPage};
use crate::util::{Point, Size};
use log::{debug, trace, warn};

/// What the content stream has in effect at one `q` level.
#[derive(Debug, Clone, Default)]
struct Realized {
    ctm: Matrix,
    stroke: Option<Color>,
    fill: Option<Color>,
    width: Option<f64>,
    cap: Option<LineCap>,
    join: Option<LineJoin>,
    miter: Option<f64>,
    dash: Option<(Vec<f64>, f64)>,
    clips: usize,
}

pub struct DocumentBackend {
    size: Size,
    page_flip: Matrix,
    content: ContentStream,
    realized: Vec<Realized>,
    fonts: Vec<FontResource>,
    compress: bool,
    finished: bool,
}

impl DocumentBackend {
    /// A page of `size` points with default precision and no compression.
    pub fn new(size: Size) -> Self {
        Self::with_options(size, crate::pdf::DEFAULT_PRECISION, false)
    }

    pub fn with_options(size: Size, precision: usize, compress: bool) -> Self {
        let mut content = ContentStream::new(precision);
        // PDF user space is y-up; callers draw y-down from the top-left corner.
        let flip = Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, size.height);
        content.concat(&flip);

        Self {
            size,
            page_flip: flip,
            content,
            realized: vec![Realized {
                ctm: flip,
                ..Realized::default()
            }],
            fonts: Vec::new(),
            compress,
            finished: false,
        }
    }

    /// Operators written so far.
    pub fn content(&self) -> &ContentStream {
        &self.content
    }

    pub fn fonts(&self) -> &[FontResource] {
        &self.fonts
    }

    /// Number of `q` levels currently open in the content stream.
    pub fn open_levels(&self) -> usize {
        self.realized.len() - 1
    }

    /// Finishes the page and hands back its content and resources.
    pub fn into_page(mut self) -> Result<PdfPage, BackendError> {
        self.finish()?;
        let content = self.content.finish(self.compress)?;
        Ok(PdfPage {
            size: self.size,
            content,
            compressed: self.compress,
            fonts: self.fonts,
        })
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.finished {
            Err(BackendError::Finished)
        } else {
            Ok(())
        }
    }

    fn top(&mut self) -> &mut Realized {
        let last = self.realized.len() - 1;
        &mut self.realized[last]
    }

    /// Brings the content stream's CTM to `transform` followed by the page flip.
    fn realize_transform(&mut self, transform: &Matrix, what: &'static str) -> Result<(), BackendError> {
        let target = transform.then(&self.page_flip);
        let current = self.top().ctm;
        if target.approx_eq(&current, 1e-9) {
            return Ok(());
        }
        let undo = current
            .invert()
            .ok_or(BackendError::SingularTransform(what))?;
        let delta = target.then(&undo);
        self.content.concat(&delta);
        self.top().ctm = target;
        Ok(())
    }

    fn realize_clip(&mut self, attrs: &StateAttributes) -> Result<(), BackendError> {
        let realized = self.top().clips;
        if realized > attrs.clip.len() {
            warn!(
                "content stream holds {} clip(s) but state has {}; extra clips stay in effect",
                realized,
                attrs.clip.len()
            );
            return Ok(());
        }
        for clip in &attrs.clip[realized..] {
            self.realize_transform(&clip.transform, "clip")?;
            self.content.rect(clip.rect.normalized());
            self.content.clip();
        }
        self.top().clips = attrs.clip.len();
        Ok(())
    }

    fn realize_fill(&mut self, color: Color) {
        if self.top().fill != Some(color) {
            self.content.fill_color(color);
            self.top().fill = Some(color);
        }
    }

    fn realize_pen(&mut self, pen: &Pen) {
        if self.top().stroke != Some(pen.color) {
            self.content.stroke_color(pen.color);
            self.top().stroke = Some(pen.color);
        }
        if self.top().width != Some(pen.width) {
            self.content.line_width(pen.width);
            self.top().width = Some(pen.width);
        }
        if self.top().cap != Some(pen.line_cap) {
            self.content.line_cap(match pen.line_cap {
                LineCap::Butt => 0,
                LineCap::Round => 1,
                LineCap::Square => 2,
            });
            self.top().cap = Some(pen.line_cap);
        }
        if self.top().join != Some(pen.line_join) {
            self.content.line_join(match pen.line_join {
                LineJoin::Miter => 0,
                LineJoin::Round => 1,
                LineJoin::Bevel => 2,
            });
            self.top().join = Some(pen.line_join);
        }
        if self.top().miter != Some(pen.miter_limit) {
            self.content.miter_limit(pen.miter_limit);
            self.top().miter = Some(pen.miter_limit);
        }
        let dash = (pen.dash.clone(), pen.dash_offset);
        if self.top().dash.as_ref() != Some(&dash) {
            self.content.dash(&dash.0, dash.1);
            self.top().dash = Some(dash);
        }
    }

    /// Resource key for `font`, registering it on first use.
    fn font_key(&mut self, font: &Font) -> String {
        let base_font = base_font_name(font);
        if let Some(existing) = self.fonts.iter().find(|f| f.base_font == base_font) {
            return existing.key.clone();
        }
        let key = format!("F{}", self.fonts.len() + 1);
        debug!("Registered font resource /{} for {}", key, base_font);
        self.fonts.push(FontResource {
            key: key.clone(),
            base_font,
        });
        key
    }
}

fn base_font_name(font: &Font) -> String {
    let family = font.family.canonical_name();
    match (font.style.bold, font.style.italic) {
        (false, false) => family.to_string(),
        (true, false) => format!("{family}-Bold"),
        (false, true) => format!("{family}-Italic"),
        (true, true) => format!("{family}-BoldItalic"),
    }
}

/// Paints under a collapsed transform cover no area and are dropped before
/// anything is realized, so the content stream never holds a singular CTM.
fn skip_degenerate(attrs: &StateAttributes, what: &str) -> bool {
    let degenerate = attrs.is_degenerate();
    if degenerate {
        trace!("Skipping {} under a non-invertible transform", what);
    }
    degenerate
}

impl StateHooks for DocumentBackend {
    fn pushed(&mut self, state: &GraphicsState) {
        if self.finished {
            warn!("q for level {} after the page was finished, ignoring", state.level());
            return;
        }
        let top = self.top().clone();
        self.realized.push(top);
        self.content.save();
        trace!("q for level {}", state.level());
    }

    fn popped(&mut self, state: &GraphicsState) {
        if self.finished {
            warn!("Q for level {} after the page was finished, ignoring", state.level());
            return;
        }
        if self.realized.len() <= 1 {
            warn!("Q for level {} without a matching q", state.level());
            return;
        }
        self.realized.pop();
        self.content.restore();
        trace!("Q for level {}", state.level());
    }
}

impl Backend for DocumentBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Document
    }

    fn size(&self) -> Size {
        self.size
    }

    fn stroke_path(&mut self, path: &Path, attrs: &StateAttributes) -> Result<(), BackendError> {
        self.ensure_open()?;
        if path.is_empty() || skip_degenerate(attrs, "stroke") {
            return Ok(());
        }
        self.realize_clip(attrs)?;
        self.realize_transform(&attrs.transform, "stroke")?;
        self.realize_pen(&attrs.pen);
        self.content.path(path);
        self.content.stroke();
        Ok(())
    }

    fn fill_path(&mut self, path: &Path, attrs: &StateAttributes) -> Result<(), BackendError> {
        self.ensure_open()?;
        if path.is_empty() || skip_degenerate(attrs, "fill") {
            return Ok(());
        }
        self.realize_clip(attrs)?;
        self.realize_transform(&attrs.transform, "fill")?;
        self.realize_fill(attrs.brush.color());
        self.content.path(path);
        self.content.fill();
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &Font,
        attrs: &StateAttributes,
    ) -> Result<(), BackendError> {
        self.ensure_open()?;
        if skip_degenerate(attrs, "text") {
            return Ok(());
        }
        self.realize_clip(attrs)?;
        self.realize_transform(&attrs.transform, "text")?;
        self.realize_fill(attrs.brush.color());

        let key = self.font_key(font);
        self.content.begin_text();
        self.content.font(&key, font.size);
        // Undo the page flip for glyphs so text stays upright.
        self.content
            .text_matrix(&Matrix::new(1.0, 0.0, 0.0, -1.0, origin.x, origin.y));
        self.content.show_text(text);
        self.content.end_text();
        Ok(())
    }

    fn finish(&mut self) -> Result<(), BackendError> {
        if self.finished {
            return Ok(());
        }
        let open = self.open_levels();
        if open > 0 {
            warn!("Closing {} unbalanced q level(s) at end of page", open);
        }
        for _ in 0..open {
            self.realized.pop();
            self.content.restore();
        }
        self.finished = true;
        debug!(
            "Finished document page {}x{} with {} font(s)",
            self.size.width,
            self.size.height,
            self.fonts.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED};
    use crate::draw::state::{Brush, ClipRect};
    use crate::fonts::{FamilyPayload, FontFamily, FontStyle};
    use crate::util::Rect;
    use std::sync::Arc;

    fn square() -> Path {
        let mut path = Path::new();
        path.rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        path
    }

    fn red_fill() -> StateAttributes {
        StateAttributes {
            brush: Brush::Solid(RED),
            ..StateAttributes::default()
        }
    }

    #[test]
    fn page_starts_with_flip() {
        let backend = DocumentBackend::new(Size::new(100.0, 50.0));
        assert_eq!(backend.content().as_text(), "1 0 0 -1 0 50 cm\n");
    }

    #[test]
    fn unchanged_fill_color_is_emitted_once() {
        let mut backend = DocumentBackend::new(Size::new(100.0, 100.0));
        let attrs = red_fill();
        backend.fill_path(&square(), &attrs).unwrap();
        backend.fill_path(&square(), &attrs).unwrap();
        assert_eq!(backend.content().as_text().matches(" rg\n").count(), 1);
    }

    #[test]
    fn pop_forgets_realized_attributes() {
        let mut backend = DocumentBackend::new(Size::new(100.0, 100.0));
        let state = GraphicsState::base(StateAttributes::default());
        let attrs = red_fill();

        backend.pushed(&state);
        backend.fill_path(&square(), &attrs).unwrap();
        backend.popped(&state);
        backend.fill_path(&square(), &attrs).unwrap();

        let text = backend.content().as_text();
        assert_eq!(text.matches(" rg\n").count(), 2);
        assert_eq!(text.matches("q\n").count(), 1);
        assert_eq!(text.matches("Q\n").count(), 1);
    }

    #[test]
    fn transform_is_emitted_as_delta() {
        let mut backend = DocumentBackend::new(Size::new(100.0, 100.0));
        let mut attrs = red_fill();
        attrs.transform = Matrix::translation(5.0, 7.0);
        backend.fill_path(&square(), &attrs).unwrap();

        attrs.transform = Matrix::translation(5.0, 7.0).then(&Matrix::translation(1.0, 1.0));
        backend.fill_path(&square(), &attrs).unwrap();

        let text = backend.content().as_text();
        assert!(text.contains("1 0 0 1 5 7 cm\n"));
        assert!(text.contains("1 0 0 1 1 1 cm\n"));
    }

    #[test]
    fn clips_are_realized_once_per_level() {
        let mut backend = DocumentBackend::new(Size::new(100.0, 100.0));
        let mut attrs = red_fill();
        attrs.clip.push(ClipRect {
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            transform: Matrix::IDENTITY,
        });
        backend.fill_path(&square(), &attrs).unwrap();
        backend.fill_path(&square(), &attrs).unwrap();
        assert_eq!(backend.content().as_text().matches("W n\n").count(), 1);
    }

    #[test]
    fn collapsed_transform_paints_nothing_and_later_paints_work() {
        let mut backend = DocumentBackend::new(Size::new(100.0, 100.0));
        let mut attrs = red_fill();
        attrs.transform = Matrix::scaling(0.0, 0.0);
        backend.fill_path(&square(), &attrs).unwrap();
        assert_eq!(backend.content().as_text(), "1 0 0 -1 0 100 cm\n");

        attrs.transform = Matrix::IDENTITY;
        backend.fill_path(&square(), &attrs).unwrap();
        let text = backend.content().as_text();
        assert!(!text.contains("0 0 0 0 0 0 cm"));
        assert_eq!(text.matches(" rg\n").count(), 1);
        assert_eq!(text.matches("f\n").count(), 1);
    }

    #[test]
    fn collapsed_clip_transform_skips_paint() {
        let mut backend = DocumentBackend::new(Size::new(100.0, 100.0));
        let mut attrs = red_fill();
        attrs.clip.push(ClipRect {
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            transform: Matrix::scaling(0.0, 1.0),
        });
        backend.fill_path(&square(), &attrs).unwrap();
        assert!(!backend.content().as_text().contains("W n"));

        attrs.clip.clear();
        backend.fill_path(&square(), &attrs).unwrap();
        assert_eq!(backend.content().as_text().matches("f\n").count(), 1);
    }

    #[test]
    fn hooks_after_finish_write_nothing() {
        let mut backend = DocumentBackend::new(Size::new(10.0, 10.0));
        let state = GraphicsState::base(StateAttributes::default());
        backend.finish().unwrap();
        backend.pushed(&state);
        backend.popped(&state);

        let page = backend.into_page().unwrap();
        let text = String::from_utf8(page.content).unwrap();
        assert_eq!(text, "1 0 0 -1 0 10 cm\n");
    }

    #[test]
    fn text_registers_font_resource() {
        let family = Arc::new(FontFamily::new("Sans", FamilyPayload::bare("DejaVu Sans")));
        let bold = FontStyle {
            bold: true,
            italic: false,
        };
        let font = Font::new(family, 12.0, bold);
        let mut backend = DocumentBackend::new(Size::new(100.0, 100.0));
        let attrs = StateAttributes {
            brush: Brush::Solid(BLUE),
            ..StateAttributes::default()
        };

        backend.draw_text("Hi", Point::new(10.0, 20.0), &font, &attrs).unwrap();
        backend.draw_text("again", Point::new(10.0, 40.0), &font, &attrs).unwrap();

        assert_eq!(backend.fonts().len(), 1);
        assert_eq!(backend.fonts()[0].base_font, "DejaVu Sans-Bold");
        let text = backend.content().as_text();
        assert!(text.contains("BT\n/F1 12 Tf\n1 0 0 -1 10 20 Tm\n(Hi) Tj\nET\n"));
    }

    #[test]
    fn finish_balances_open_levels() {
        let mut backend = DocumentBackend::new(Size::new(10.0, 10.0));
        let state = GraphicsState::base(StateAttributes::default());
        backend.pushed(&state);
        backend.pushed(&state);

        let page = backend.into_page().unwrap();
        let text = String::from_utf8(page.content).unwrap();
        assert_eq!(text.matches("Q\n").count(), 2);
    }
}
