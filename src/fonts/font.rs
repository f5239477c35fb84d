//! Font selection carried by a graphics state.

use super::family::FontFamily;
use std::sync::Arc;

/// Bold/italic selection within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };
}

/// A sized, styled reference to an interned [`FontFamily`].
///
/// Cloning shares the family, so copies of a graphics state never duplicate
/// family data.
#[derive(Debug, Clone)]
pub struct Font {
    pub family: Arc<FontFamily>,
    /// Em size in user-space units
    pub size: f64,
    pub style: FontStyle,
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.family, &other.family)
            && self.size == other.size
            && self.style == other.style
    }
}

impl Font {
    pub fn new(family: Arc<FontFamily>, size: f64, style: FontStyle) -> Self {
        Self {
            family,
            size,
            style,
        }
    }

    /// Converts this font to a Pango font description string.
    ///
    /// Format: "Family[ Italic][ Bold] Size", where size is given in Pango
    /// points and the caller sets the context resolution so one point equals
    /// one user-space unit.
    pub fn to_pango_string(&self) -> String {
        let mut parts = vec![self.family.canonical_name().to_string()];
        if self.style.italic {
            parts.push("Italic".to_string());
        }
        if self.style.bold {
            parts.push("Bold".to_string());
        }
        parts.push(format!("{}", self.size.max(0.0)));
        parts.join(" ")
    }
}
