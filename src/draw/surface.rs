//! The client-facing drawing surface.
//!
//! A [`DrawingSurface`] owns one [`GraphicsStateStack`] and one [`Backend`].
//! Attribute setters mutate the stack's current state; paint calls hand that
//! state to the backend. The backend doubles as the stack's [`StateHooks`], so
//! every logical save and restore reaches the native surface in the same order.

use super::backend::{Backend, BackendError};
use super::color::Color;
use super::matrix::Matrix;
use super::path::Path;
use super::stack::{GraphicsStateStack, StateError};
use super::state::{Antialias, Brush, ClipRect, GraphicsState, Pen, SavePoint, StateAttributes};
use crate::fonts::Font;
use crate::util::{Point, Rect};
use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("no font selected for text drawing")]
    NoFont,

    #[error("container source rectangle has zero area")]
    EmptyContainer,
}

pub struct DrawingSurface<B: Backend> {
    stack: GraphicsStateStack,
    backend: B,
}

impl<B: Backend> DrawingSurface<B> {
    /// Wraps `backend` with a fresh stack whose base state holds defaults.
    pub fn new(backend: B) -> Self {
        Self::with_attributes(backend, StateAttributes::default())
    }

    pub fn with_attributes(backend: B, attrs: StateAttributes) -> Self {
        let stack = GraphicsStateStack::new(attrs);
        debug!("Created {:?} surface on {}", backend.kind(), stack.id());
        Self { stack, backend }
    }

    // ------------------------------------------------------------------------
    // Save / restore
    // ------------------------------------------------------------------------

    /// Saves a copy of the current state and returns its token.
    pub fn save(&mut self) -> SavePoint {
        self.stack.push(&mut self.backend)
    }

    /// Restores to the state current before `token` was saved, discarding any
    /// inner saves still open. Returns how many states were discarded.
    pub fn restore(&mut self, token: &SavePoint) -> Result<usize, SurfaceError> {
        Ok(self.stack.restore(token, &mut self.backend)?)
    }

    pub fn current(&self) -> &GraphicsState {
        self.stack.current()
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        self.stack.current_mut()
    }

    fn attrs_mut(&mut self) -> &mut StateAttributes {
        &mut self.stack.current_mut().attrs
    }

    /// Number of saves not yet restored.
    pub fn save_depth(&self) -> usize {
        self.stack.count()
    }

    /// Saves, then maps `src` onto `dst` so content drawn in `src` coordinates
    /// lands in `dst`. Close with [`DrawingSurface::end_container`].
    pub fn begin_container(&mut self, dst: Rect, src: Rect) -> Result<SavePoint, SurfaceError> {
        if src.is_empty() {
            return Err(SurfaceError::EmptyContainer);
        }
        let mapping = Matrix::translation(-src.x, -src.y)
            .then(&Matrix::scaling(dst.width / src.width, dst.height / src.height))
            .then(&Matrix::translation(dst.x, dst.y));
        let token = self.save();
        self.multiply_transform(&mapping);
        Ok(token)
    }

    pub fn end_container(&mut self, token: &SavePoint) -> Result<usize, SurfaceError> {
        self.restore(token)
    }

    // ------------------------------------------------------------------------
    // Attribute mutators
    // ------------------------------------------------------------------------

    /// Prepends `m` to the current transform, so it applies to user coordinates
    /// before everything already in effect.
    pub fn multiply_transform(&mut self, m: &Matrix) {
        let attrs = self.attrs_mut();
        attrs.transform = m.then(&attrs.transform);
    }

    pub fn set_transform(&mut self, m: Matrix) {
        self.attrs_mut().transform = m;
    }

    pub fn reset_transform(&mut self) {
        self.set_transform(Matrix::IDENTITY);
    }

    pub fn translate_transform(&mut self, dx: f64, dy: f64) {
        self.multiply_transform(&Matrix::translation(dx, dy));
    }

    pub fn scale_transform(&mut self, sx: f64, sy: f64) {
        self.multiply_transform(&Matrix::scaling(sx, sy));
    }

    pub fn rotate_transform(&mut self, degrees: f64) {
        self.multiply_transform(&Matrix::rotation(degrees));
    }

    /// Intersects the clip with `rect`, interpreted under the current transform.
    pub fn intersect_clip(&mut self, rect: Rect) {
        let attrs = self.attrs_mut();
        let transform = attrs.transform;
        attrs.clip.push(ClipRect {
            rect: rect.normalized(),
            transform,
        });
    }

    pub fn set_pen(&mut self, pen: Pen) {
        self.attrs_mut().pen = pen;
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.attrs_mut().brush = brush;
    }

    /// Shorthand for a solid brush and a pen of the same color.
    pub fn set_color(&mut self, color: Color) {
        let attrs = self.attrs_mut();
        attrs.brush = Brush::Solid(color);
        attrs.pen.color = color;
    }

    pub fn set_font(&mut self, font: Option<Font>) {
        self.attrs_mut().font = font;
    }

    pub fn set_antialias(&mut self, mode: Antialias) {
        self.attrs_mut().antialias = mode;
    }

    // ------------------------------------------------------------------------
    // Painting
    // ------------------------------------------------------------------------

    pub fn draw_path(&mut self, path: &Path) -> Result<(), SurfaceError> {
        self.backend
            .stroke_path(path, &self.stack.current().attrs)
            .map_err(SurfaceError::from)
    }

    pub fn fill_path(&mut self, path: &Path) -> Result<(), SurfaceError> {
        self.backend
            .fill_path(path, &self.stack.current().attrs)
            .map_err(SurfaceError::from)
    }

    pub fn draw_line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError> {
        self.draw_path(&Path::polyline(&[from, to]))
    }

    /// Strokes a connected polyline through `points`.
    pub fn draw_lines(&mut self, points: &[Point]) -> Result<(), SurfaceError> {
        if points.len() < 2 {
            return Ok(());
        }
        self.draw_path(&Path::polyline(points))
    }

    pub fn draw_rectangle(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        let mut path = Path::new();
        path.rect(rect);
        self.draw_path(&path)
    }

    pub fn fill_rectangle(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        let mut path = Path::new();
        path.rect(rect);
        self.fill_path(&path)
    }

    /// Strokes the ellipse inscribed in `bounds`.
    pub fn draw_ellipse(&mut self, bounds: Rect) -> Result<(), SurfaceError> {
        let mut path = Path::new();
        path.ellipse(bounds);
        self.draw_path(&path)
    }

    pub fn fill_ellipse(&mut self, bounds: Rect) -> Result<(), SurfaceError> {
        let mut path = Path::new();
        path.ellipse(bounds);
        self.fill_path(&path)
    }

    /// Draws `text` with the current font, baseline starting at `origin`.
    ///
    /// # Errors
    /// [`SurfaceError::NoFont`] when no font has been selected.
    pub fn draw_string(&mut self, text: &str, origin: Point) -> Result<(), SurfaceError> {
        let attrs = &self.stack.current().attrs;
        let font = attrs.font.as_ref().ok_or(SurfaceError::NoFont)?;
        self.backend
            .draw_text(text, origin, font, attrs)
            .map_err(SurfaceError::from)
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Restores any saves still open, then finishes the backend.
    pub fn finish(&mut self) -> Result<(), SurfaceError> {
        let unwound = self.stack.restore_all(&mut self.backend);
        if unwound > 0 {
            info!("Closed {} unrestored save(s) while finishing", unwound);
        }
        self.backend.finish()?;
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::backend::{BackendKind, DocumentBackend};
    use crate::draw::color::{BLUE, GREEN, RED};
    use crate::fonts::{FamilyPayload, FontFamily, FontStyle};
    use crate::util::Size;
    use std::sync::Arc;

    fn document() -> DrawingSurface<DocumentBackend> {
        DrawingSurface::new(DocumentBackend::new(Size::new(200.0, 100.0)))
    }

    #[test]
    fn saves_mirror_into_q_levels() {
        let mut surface = document();
        let outer = surface.save();
        surface.save();
        surface.save();
        assert_eq!(surface.backend().open_levels(), 3);

        assert_eq!(surface.restore(&outer).unwrap(), 3);
        assert_eq!(surface.backend().open_levels(), 0);
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn skip_level_restore_reverts_color() {
        let mut surface = document();
        surface.set_color(BLUE);
        let t1 = surface.save();
        surface.set_color(RED);
        let t2 = surface.save();
        surface.set_color(GREEN);

        surface.restore(&t1).unwrap();
        assert_eq!(surface.current().attrs.brush, Brush::Solid(BLUE));
        assert!(!t2.is_valid());
        assert!(matches!(
            surface.restore(&t2),
            Err(SurfaceError::State(StateError::AlreadyRestored { .. }))
        ));
    }

    #[test]
    fn foreign_token_leaves_surface_untouched() {
        let mut ours = document();
        let mut theirs = document();
        ours.save();
        let foreign = theirs.save();

        assert!(matches!(
            ours.restore(&foreign),
            Err(SurfaceError::State(StateError::NotOnStack { .. }))
        ));
        assert_eq!(ours.save_depth(), 1);
        assert_eq!(ours.backend().open_levels(), 1);
    }

    #[test]
    fn transforms_prepend() {
        let mut surface = document();
        surface.translate_transform(10.0, 0.0);
        surface.scale_transform(2.0, 2.0);

        let p = surface
            .current()
            .attrs
            .transform
            .transform_point(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(12.0, 2.0));
    }

    #[test]
    fn container_maps_source_onto_destination() {
        let mut surface = document();
        let token = surface
            .begin_container(
                Rect::new(100.0, 50.0, 20.0, 20.0),
                Rect::new(0.0, 0.0, 10.0, 10.0),
            )
            .unwrap();

        let m = surface.current().attrs.transform;
        assert_eq!(m.transform_point(Point::new(10.0, 10.0)), Point::new(120.0, 70.0));

        assert_eq!(surface.end_container(&token).unwrap(), 1);
        assert!(surface.current().attrs.transform.is_identity());
    }

    #[test]
    fn empty_container_source_is_rejected() {
        let mut surface = document();
        let result = surface.begin_container(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 0.0, 10.0),
        );
        assert!(matches!(result, Err(SurfaceError::EmptyContainer)));
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn clip_captures_current_transform() {
        let mut surface = document();
        surface.translate_transform(5.0, 5.0);
        surface.intersect_clip(Rect::new(0.0, 0.0, -10.0, 10.0));

        let clip = surface.current().attrs.clip[0];
        assert_eq!(clip.rect, Rect::new(-10.0, 0.0, 10.0, 10.0));
        assert_eq!(clip.transform, Matrix::translation(5.0, 5.0));
    }

    #[test]
    fn draw_string_without_font_fails() {
        let mut surface = document();
        assert!(matches!(
            surface.draw_string("hello", Point::new(0.0, 10.0)),
            Err(SurfaceError::NoFont)
        ));
    }

    #[test]
    fn draw_string_with_font_writes_text() {
        let mut surface = document();
        let family = Arc::new(FontFamily::new("serif", FamilyPayload::bare("Serif")));
        surface.set_font(Some(Font::new(family, 14.0, FontStyle::REGULAR)));
        surface.draw_string("hello", Point::new(0.0, 10.0)).unwrap();
        assert!(surface.backend().content().as_text().contains("(hello) Tj"));
    }

    #[test]
    fn finish_unwinds_open_saves() {
        let mut surface = document();
        let token = surface.save();
        surface.fill_rectangle(Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        surface.finish().unwrap();

        assert!(!token.is_valid());
        assert_eq!(surface.backend().kind(), BackendKind::Document);
        assert_eq!(surface.backend().open_levels(), 0);
        assert!(matches!(
            surface.fill_rectangle(Rect::new(0.0, 0.0, 5.0, 5.0)),
            Err(SurfaceError::Backend(BackendError::Finished))
        ));
    }
}
