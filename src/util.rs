//! Geometry helpers and number formatting shared by the surface and backends.
//!
//! This module provides:
//! - [`Point`], [`Size`] and [`Rect`] value types in user-space units
//! - Number formatting for PDF content streams

// ============================================================================
// Geometry
// ============================================================================

/// A point in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the same rectangle with non-negative width and height.
    ///
    /// Callers may pass rectangles dragged "backwards"; the origin moves so the
    /// covered area stays identical.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width >= 0.0 {
            (self.x, self.width)
        } else {
            (self.x + self.width, -self.width)
        };
        let (y, height) = if self.height >= 0.0 {
            (self.y, self.height)
        } else {
            (self.y + self.height, -self.height)
        };
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// ============================================================================
// Number Formatting
// ============================================================================

/// Formats a number with at most `precision` fractional digits.
///
/// Trailing zeros and a dangling decimal point are removed, and negative zero
/// prints as `0`, which keeps content streams compact and deterministic.
///
/// # Examples
/// ```
/// use drawstack::util::format_number;
/// assert_eq!(format_number(1.0, 3), "1");
/// assert_eq!(format_number(0.12345, 3), "0.123");
/// assert_eq!(format_number(-0.0001, 3), "0");
/// ```
pub fn format_number(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut text = format!("{:.*}", precision, value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_flips_negative_extent() {
        let rect = Rect::new(10.0, 10.0, -4.0, -6.0).normalized();
        assert_eq!(rect, Rect::new(6.0, 4.0, 4.0, 6.0));
    }

    #[test]
    fn format_number_trims_trailing_zeros() {
        assert_eq!(format_number(2.500, 3), "2.5");
        assert_eq!(format_number(-12.0, 2), "-12");
        assert_eq!(format_number(595.2756, 2), "595.28");
    }

    #[test]
    fn format_number_handles_non_finite() {
        assert_eq!(format_number(f64::NAN, 3), "0");
        assert_eq!(format_number(f64::INFINITY, 3), "0");
    }
}
