//! Path construction for stroke and fill calls.
//!
//! Paths are built incrementally with move, line, curve and close operations,
//! the same primitives both Cairo and PDF content streams understand.

use crate::util::{Point, Rect};

/// Control-point distance for approximating a quarter circle with one cubic
/// Bézier segment.
const KAPPA: f64 = 0.552_284_749_831;

/// A path element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement {
    /// Move to a new point (starts a new subpath)
    MoveTo(Point),
    /// Line to a point
    LineTo(Point),
    /// Cubic Bézier curve (control 1, control 2, end)
    CurveTo(Point, Point, Point),
    /// Close the current subpath
    Close,
}

/// A sequence of subpaths in user space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    elements: Vec<PathElement>,
    current: Option<Point>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let point = Point::new(x, y);
        self.elements.push(PathElement::MoveTo(point));
        self.current = Some(point);
        self
    }

    /// Adds a line segment; without a current point this starts a subpath instead.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        if self.current.is_none() {
            return self.move_to(x, y);
        }
        let point = Point::new(x, y);
        self.elements.push(PathElement::LineTo(point));
        self.current = Some(point);
        self
    }

    pub fn curve_to(
        &mut self,
        c1: (f64, f64),
        c2: (f64, f64),
        end: (f64, f64),
    ) -> &mut Self {
        if self.current.is_none() {
            self.move_to(c1.0, c1.1);
        }
        let end_point = Point::new(end.0, end.1);
        self.elements.push(PathElement::CurveTo(
            Point::new(c1.0, c1.1),
            Point::new(c2.0, c2.1),
            end_point,
        ));
        self.current = Some(end_point);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        if self.current.is_some() {
            self.elements.push(PathElement::Close);
        }
        self
    }

    /// Appends a closed rectangle subpath.
    pub fn rect(&mut self, rect: Rect) -> &mut Self {
        let r = rect.normalized();
        self.move_to(r.x, r.y)
            .line_to(r.x + r.width, r.y)
            .line_to(r.x + r.width, r.y + r.height)
            .line_to(r.x, r.y + r.height)
            .close()
    }

    /// Appends a closed ellipse inscribed in `rect`, built from four Bézier arcs.
    pub fn ellipse(&mut self, rect: Rect) -> &mut Self {
        let r = rect.normalized();
        let center = r.center();
        let rx = r.width / 2.0;
        let ry = r.height / 2.0;
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;
        let (cx, cy) = (center.x, center.y);

        self.move_to(cx + rx, cy);
        self.curve_to((cx + rx, cy + ky), (cx + kx, cy + ry), (cx, cy + ry));
        self.curve_to((cx - kx, cy + ry), (cx - rx, cy + ky), (cx - rx, cy));
        self.curve_to((cx - rx, cy - ky), (cx - kx, cy - ry), (cx, cy - ry));
        self.curve_to((cx + kx, cy - ry), (cx + rx, cy - ky), (cx + rx, cy));
        self.close()
    }

    /// Builds an open polyline through `points`.
    pub fn polyline(points: &[Point]) -> Self {
        let mut path = Path::new();
        for point in points {
            path.line_to(point.x, point.y);
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_without_current_point_starts_subpath() {
        let mut path = Path::new();
        path.line_to(3.0, 4.0).line_to(5.0, 6.0);
        assert_eq!(
            path.elements(),
            &[
                PathElement::MoveTo(Point::new(3.0, 4.0)),
                PathElement::LineTo(Point::new(5.0, 6.0)),
            ]
        );
    }

    #[test]
    fn rect_is_closed_and_normalized() {
        let mut path = Path::new();
        path.rect(Rect::new(10.0, 10.0, -10.0, 5.0));
        assert_eq!(path.elements().len(), 5);
        assert_eq!(path.elements()[0], PathElement::MoveTo(Point::new(0.0, 10.0)));
        assert_eq!(path.elements()[4], PathElement::Close);
    }

    #[test]
    fn ellipse_uses_four_curves() {
        let mut path = Path::new();
        path.ellipse(Rect::new(0.0, 0.0, 20.0, 10.0));
        let curves = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathElement::CurveTo(..)))
            .count();
        assert_eq!(curves, 4);
        assert_eq!(path.elements()[0], PathElement::MoveTo(Point::new(20.0, 5.0)));
    }

    #[test]
    fn close_on_empty_path_is_ignored() {
        let mut path = Path::new();
        path.close();
        assert!(path.is_empty());
    }
}
